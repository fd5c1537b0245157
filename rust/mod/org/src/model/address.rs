use orgsvc_core::ServiceError;
use serde::{Deserialize, Serialize};

/// A postal address. Every field is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl Address {
    pub(crate) fn normalize(&mut self) {
        for field in [
            &mut self.street,
            &mut self.city,
            &mut self.state,
            &mut self.zip,
            &mut self.country,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
    }

    /// `at` names the address in messages, e.g. `addresses[1]`.
    pub(crate) fn validate(&self, at: &str) -> Result<(), ServiceError> {
        let fields = [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ServiceError::Validation(format!(
                    "{}.{} is required",
                    at, name
                )));
            }
        }
        Ok(())
    }
}
