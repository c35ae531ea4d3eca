//! Client store: `/api/clients`, plus lookup by CPF.

use optica_core::{AppointmentSubject, Client, ClientInput};
use std::ops::Deref;
use std::sync::Arc;

use super::EntityStore;
use crate::config::WritePolicy;
use crate::gateway::Resource;
use crate::notify::Notifier;
use crate::transport::Transport;

pub struct Clients;

impl Resource for Clients {
    const PATH: &'static str = "/api/clients";
    const NOUN: &'static str = "client";
    const PLURAL: &'static str = "clients";
    type Entity = Client;
    type Create = ClientInput;

    fn id(entity: &Client) -> &str {
        &entity.id
    }
}

/// Clients, newest first. Updates are full replaces with a [`ClientInput`].
pub struct ClientStore {
    inner: EntityStore<Clients>,
}

impl ClientStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        policy: WritePolicy,
    ) -> Self {
        ClientStore {
            inner: EntityStore::new(transport, notifier, policy),
        }
    }

    /// Finds a client by CPF, ignoring `.` and `-` on both sides.
    pub fn get_by_cpf(&self, cpf: &str) -> Option<Client> {
        self.inner.find(|c| c.matches_cpf(cpf))
    }

    /// Name to show for an appointment's subject.
    ///
    /// Linked clients are looked up here; `None` when the client is gone.
    pub fn display_name(&self, subject: &AppointmentSubject) -> Option<String> {
        match subject {
            AppointmentSubject::LinkedClient(id) => {
                self.inner.get(id).map(|c| c.full_name().to_string())
            }
            AppointmentSubject::WalkInContact { name, .. } => Some(name.clone()),
        }
    }

    /// Case-insensitive substring search on the name, or digit search on
    /// the phone.
    pub fn search(&self, query: &str) -> Vec<Client> {
        let wanted = query.trim().to_lowercase();
        if wanted.is_empty() {
            return self.inner.snapshot();
        }
        let digits: String = wanted.chars().filter(char::is_ascii_digit).collect();

        self.inner.with_items(|items| {
            items
                .iter()
                .filter(|c| {
                    c.full_name().to_lowercase().contains(&wanted)
                        || (!digits.is_empty()
                            && c.phone()
                                .chars()
                                .filter(char::is_ascii_digit)
                                .collect::<String>()
                                .contains(&digits))
                })
                .cloned()
                .collect()
        })
    }
}

impl Deref for ClientStore {
    type Target = EntityStore<Clients>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::fixtures::Harness;
    use crate::transport::Method;
    use serde_json::json;

    async fn store(h: &Harness) -> ClientStore {
        h.transport.reply(
            200,
            json!([
                { "_id": "c1", "fullName": "Ana Lima", "phone": "(11) 98888-1111", "cpf": "123.456.789-00" },
                { "_id": "c2", "fullName": "Bruno Costa", "phone": "11 97777-2222", "cpf": "98765432100" },
                { "_id": "c3", "fullName": "Carla Dias", "phone": "3333-4444" }
            ]),
        );
        let store = ClientStore::new(h.transport(), h.notifier(), WritePolicy::default());
        store.load_initial().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_get_by_cpf_ignores_punctuation() {
        let h = Harness::new();
        let store = store(&h).await;

        assert_eq!(store.get_by_cpf("12345678900").unwrap().id, "c1");
        assert_eq!(store.get_by_cpf("987.654.321-00").unwrap().id, "c2");
        assert!(store.get_by_cpf("111.111.111-11").is_none());
        assert!(store.get_by_cpf("").is_none());
    }

    #[tokio::test]
    async fn test_display_name_for_subjects() {
        let h = Harness::new();
        let store = store(&h).await;

        let linked = AppointmentSubject::LinkedClient("c2".into());
        let gone = AppointmentSubject::LinkedClient("c9".into());
        let walk_in = AppointmentSubject::WalkInContact {
            name: "Davi".into(),
            phone: "1".into(),
        };

        assert_eq!(store.display_name(&linked).as_deref(), Some("Bruno Costa"));
        assert_eq!(store.display_name(&gone), None);
        assert_eq!(store.display_name(&walk_in).as_deref(), Some("Davi"));
    }

    #[tokio::test]
    async fn test_search_by_name_or_phone() {
        let h = Harness::new();
        let store = store(&h).await;

        let by_name: Vec<String> = store.search("costa").into_iter().map(|c| c.id).collect();
        assert_eq!(by_name, vec!["c2"]);

        let by_phone: Vec<String> = store.search("98888").into_iter().map(|c| c.id).collect();
        assert_eq!(by_phone, vec!["c1"]);

        assert_eq!(store.search("  ").len(), 3);
    }

    #[tokio::test]
    async fn test_update_sends_full_replace() {
        let h = Harness::new();
        let store = store(&h).await;
        h.transport.reply(
            200,
            json!({ "_id": "c3", "fullName": "Carla Dias", "phone": "3333-4444", "email": "carla@example.com" }),
        );

        let input = ClientInput::new("Carla Dias", "3333-4444").with_email("carla@example.com");
        let updated = store.update("c3", &input).await.unwrap();

        assert_eq!(updated.data.email.as_deref(), Some("carla@example.com"));
        let request = h.transport.requests().pop().unwrap();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.path, "/api/clients/c3");
        assert_eq!(request.body.unwrap()["email"], "carla@example.com");
    }
}
