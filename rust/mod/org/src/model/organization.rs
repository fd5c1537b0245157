use orgsvc_core::ServiceError;
use serde::{Deserialize, Serialize};

use super::Address;

/// Organization as stored.
///
/// `id`, `rev`, `createdAt` and `updatedAt` are owned by the store; a patch
/// cannot change them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<Address>,
    /// Version token, bumped on every persisted change.
    #[serde(default)]
    pub rev: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Organization {
    /// Trim every string field in place.
    pub fn normalize(&mut self) {
        let trimmed = self.name.trim();
        if trimmed.len() != self.name.len() {
            self.name = trimmed.to_string();
        }
        self.addresses.iter_mut().for_each(Address::normalize);
    }

    pub fn validate_fields(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }
        for (i, address) in self.addresses.iter().enumerate() {
            address.validate(&format!("addresses[{}]", i))?;
        }
        Ok(())
    }
}

/// Body of `POST /organization`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrganization {
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl From<CreateOrganization> for Organization {
    fn from(input: CreateOrganization) -> Self {
        Self {
            id: String::new(),
            name: input.name,
            addresses: input.addresses,
            rev: 0,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}
