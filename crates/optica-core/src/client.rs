//! # Client
//!
//! The shop's customer record: contact data plus the last optical
//! prescription.
//!
//! ## Prescription Layout
//! ```text
//! ┌──────────────┬───────────┬─────────────┬────────┐
//! │              │  Sphere   │  Cylinder   │  Axis  │
//! ├──────────────┼───────────┼─────────────┼────────┤
//! │ Right (OD)   │ esferico  │ cilindrico  │ eixo   │
//! │ Left  (OE)   │ esferico  │ cilindrico  │ eixo   │
//! └──────────────┴───────────┴─────────────┴────────┘
//!   + addition power (adicao), + prescription expiry
//! ```
//!
//! Prescription values are kept as the strings the shop typed ("-1.25",
//! "+0.50", "180") since the server stores them verbatim.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::normalize_cpf;

/// Lens values for one eye.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EyePrescription {
    pub sphere: Option<String>,
    pub cylinder: Option<String>,
    pub axis: Option<String>,
}

impl EyePrescription {
    /// True when no lens value was recorded for this eye.
    pub fn is_empty(&self) -> bool {
        self.sphere.is_none() && self.cylinder.is_none() && self.axis.is_none()
    }
}

/// Client fields as the server sees them, minus the identifier.
///
/// This is both the create payload and the full-replace update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub full_name: String,
    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "esfericoDireito")]
    pub right_sphere: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "cilindricoDireito")]
    pub right_cylinder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "eixoDireito")]
    pub right_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "esfericoEsquerdo")]
    pub left_sphere: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "cilindricoEsquerdo")]
    pub left_cylinder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "eixoEsquerdo")]
    pub left_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "adicao")]
    pub addition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "vencimentoReceita")]
    pub prescription_expiry: Option<String>,
}

impl ClientInput {
    /// Starts a payload with the two required fields.
    pub fn new(full_name: impl Into<String>, phone: impl Into<String>) -> Self {
        ClientInput {
            full_name: full_name.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    /// Sets the national tax id (any punctuation is kept as typed).
    pub fn with_cpf(mut self, cpf: impl Into<String>) -> Self {
        self.cpf = Some(cpf.into());
        self
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Right eye (OD) values.
    pub fn right_eye(&self) -> EyePrescription {
        EyePrescription {
            sphere: self.right_sphere.clone(),
            cylinder: self.right_cylinder.clone(),
            axis: self.right_axis.clone(),
        }
    }

    /// Left eye (OE) values.
    pub fn left_eye(&self) -> EyePrescription {
        EyePrescription {
            sphere: self.left_sphere.clone(),
            cylinder: self.left_cylinder.clone(),
            axis: self.left_axis.clone(),
        }
    }

    /// Replaces the prescription for both eyes.
    pub fn with_prescription(mut self, right: EyePrescription, left: EyePrescription) -> Self {
        self.right_sphere = right.sphere;
        self.right_cylinder = right.cylinder;
        self.right_axis = right.axis;
        self.left_sphere = left.sphere;
        self.left_cylinder = left.cylinder;
        self.left_axis = left.axis;
        self
    }
}

/// A persisted client, identified by the server-assigned `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub data: ClientInput,
}

impl Client {
    /// Display name.
    pub fn full_name(&self) -> &str {
        &self.data.full_name
    }

    /// Contact phone.
    pub fn phone(&self) -> &str {
        &self.data.phone
    }

    /// CPF with punctuation stripped, if one is on file.
    pub fn normalized_cpf(&self) -> Option<String> {
        self.data.cpf.as_deref().map(normalize_cpf)
    }

    /// True when the stored CPF matches `cpf`, ignoring punctuation on
    /// either side.
    pub fn matches_cpf(&self, cpf: &str) -> bool {
        let wanted = normalize_cpf(cpf);
        !wanted.is_empty() && self.normalized_cpf().as_deref() == Some(wanted.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_wire_names() {
        let json = r#"{
            "_id": "c1",
            "fullName": "Maria Silva",
            "phone": "11 99999-0000",
            "cpf": "123.456.789-00",
            "esfericoDireito": "-1.25",
            "eixoEsquerdo": "180",
            "vencimentoReceita": "2027-01-01"
        }"#;
        let client: Client = serde_json::from_str(json).unwrap();

        assert_eq!(client.id, "c1");
        assert_eq!(client.full_name(), "Maria Silva");
        assert_eq!(client.data.right_sphere.as_deref(), Some("-1.25"));
        assert_eq!(client.data.left_eye().axis.as_deref(), Some("180"));
        assert!(client.data.email.is_none());
    }

    #[test]
    fn test_input_omits_absent_optionals() {
        let input = ClientInput::new("João", "1234-5678");
        let value = serde_json::to_value(&input).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), 2);
        assert_eq!(obj["fullName"], "João");
        assert!(!obj.contains_key("_id"));
    }

    #[test]
    fn test_matches_cpf_ignores_punctuation() {
        let client = Client {
            id: "c1".into(),
            data: ClientInput::new("Ana", "1").with_cpf("123.456.789-00"),
        };
        assert!(client.matches_cpf("12345678900"));
        assert!(client.matches_cpf("123.456.789-00"));
        assert!(!client.matches_cpf("98765432100"));
        assert!(!client.matches_cpf(""));
    }

    #[test]
    fn test_prescription_helpers() {
        let right = EyePrescription {
            sphere: Some("+0.50".into()),
            cylinder: None,
            axis: None,
        };
        let input = ClientInput::new("Ana", "1").with_prescription(right.clone(), EyePrescription::default());

        assert_eq!(input.right_eye(), right);
        assert!(input.left_eye().is_empty());
    }
}
