//! KvStore implementation for Organization.

use orgsvc_core::{new_id, now_rfc3339, ServiceError};
use orgsvc_store::KvStore;

use crate::model::Organization;

impl KvStore for Organization {
    const RESOURCE: &'static str = "organization";

    fn kv_prefix() -> &'static str {
        "org:organization:"
    }

    fn key_value(&self) -> String {
        self.id.clone()
    }

    fn before_create(&mut self) {
        if self.id.is_empty() {
            self.id = new_id();
        }
        let now = now_rfc3339();
        if self.created_at.is_empty() {
            self.created_at = now.clone();
        }
        self.updated_at = now;
        self.normalize();
    }

    fn before_update(&mut self) {
        self.updated_at = now_rfc3339();
    }

    fn after_patch(&mut self, prior: &Self) -> Result<(), ServiceError> {
        self.created_at = prior.created_at.clone();
        self.updated_at = prior.updated_at.clone();
        self.rev = prior.rev;
        self.normalize();
        Ok(())
    }

    fn validate(&self) -> Result<(), ServiceError> {
        self.validate_fields()
    }

    fn rev(&self) -> u64 {
        self.rev
    }

    fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }
}
