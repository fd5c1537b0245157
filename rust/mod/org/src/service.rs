use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use orgsvc_core::{Identity, ListParams, ListResult, ServiceError};
use orgsvc_kv::KVStore;
use orgsvc_store::{invalid_patch, KvOps, WriteMode};

use crate::model::{CreateOrganization, Organization};

/// Organization operations. Every call names the authenticated caller.
pub struct OrgService {
    orgs: KvOps<Organization>,
}

impl OrgService {
    pub fn new(kv: Arc<dyn KVStore>, mode: WriteMode) -> Self {
        Self {
            orgs: KvOps::new(kv).with_mode(mode),
        }
    }

    pub fn create(
        &self,
        who: &Identity,
        input: CreateOrganization,
    ) -> Result<Organization, ServiceError> {
        let org = self.orgs.save_new(Organization::from(input))?;
        info!(actor = %who.email, id = %org.id, name = %org.name, "organization created");
        Ok(org)
    }

    pub fn list(
        &self,
        who: &Identity,
        params: &ListParams,
    ) -> Result<ListResult<Organization>, ServiceError> {
        let result = self.orgs.list_paginated(params)?;
        info!(actor = %who.email, count = result.items.len(), total = result.total, "organizations listed");
        Ok(result)
    }

    pub fn get(&self, who: &Identity, id: &str) -> Result<Organization, ServiceError> {
        let org = self.orgs.get_or_err(id)?;
        info!(actor = %who.email, id = %org.id, name = %org.name, "organization retrieved");
        Ok(org)
    }

    /// Validate a raw patch sequence, then apply it to the stored organization.
    ///
    /// A malformed sequence is rejected before the organization is loaded.
    /// `expected_rev` comes from `If-Match`.
    pub fn patch(
        &self,
        who: &Identity,
        id: &str,
        raw: &Value,
        expected_rev: Option<u64>,
    ) -> Result<Organization, ServiceError> {
        let patch = orgsvc_patch::validate(raw).map_err(invalid_patch)?;
        let org = self.orgs.apply_patch(id, &patch, expected_rev)?;
        info!(
            actor = %who.email,
            id = %org.id,
            ops = patch.len(),
            rev = org.rev,
            "organization patched"
        );
        Ok(org)
    }

    /// Delete an organization, returning what was stored.
    pub fn delete(&self, who: &Identity, id: &str) -> Result<Organization, ServiceError> {
        let org = self.orgs.delete(id)?;
        info!(actor = %who.email, id = %org.id, name = %org.name, "organization deleted");
        Ok(org)
    }

    pub fn count(&self) -> Result<usize, ServiceError> {
        self.orgs.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgsvc_kv::RedbStore;
    use serde_json::json;

    use crate::model::Address;

    fn make_service() -> (OrgService, Arc<dyn KVStore>) {
        let kv: Arc<dyn KVStore> = Arc::new(RedbStore::open_in_memory().unwrap());
        (OrgService::new(kv.clone(), WriteMode::Optimistic), kv)
    }

    fn who() -> Identity {
        Identity::new("u1", "admin@example.com")
    }

    fn address(city: &str) -> Address {
        Address {
            street: "1 Main St".into(),
            city: city.into(),
            state: "CA".into(),
            zip: "94301".into(),
            country: "USA".into(),
        }
    }

    fn create(svc: &OrgService, name: &str, cities: &[&str]) -> Organization {
        svc.create(
            &who(),
            CreateOrganization {
                name: name.into(),
                addresses: cities.iter().map(|c| address(c)).collect(),
            },
        )
        .unwrap()
    }

    fn stored_bytes(kv: &Arc<dyn KVStore>, id: &str) -> Vec<u8> {
        kv.get(&format!("org:organization:{}", id)).unwrap().unwrap()
    }

    #[test]
    fn create_assigns_identity_and_trims() {
        let (svc, _kv) = make_service();
        let org = create(&svc, "  TechFlow Solutions ", &["Palo Alto"]);
        assert_eq!(org.id.len(), 32);
        assert_eq!(org.name, "TechFlow Solutions");
        assert_eq!(org.rev, 1);
        assert!(!org.created_at.is_empty());
        assert_eq!(org.created_at, org.updated_at);
        assert_eq!(svc.get(&who(), &org.id).unwrap(), org);
    }

    #[test]
    fn create_requires_complete_fields() {
        let (svc, _kv) = make_service();
        let err = svc
            .create(
                &who(),
                CreateOrganization {
                    name: "".into(),
                    addresses: vec![],
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.count().unwrap(), 0);
    }

    #[test]
    fn list_and_delete() {
        let (svc, _kv) = make_service();
        let a = create(&svc, "A", &[]);
        create(&svc, "B", &[]);
        let listed = svc.list(&who(), &ListParams::default()).unwrap();
        assert_eq!(listed.total, 2);

        let deleted = svc.delete(&who(), &a.id).unwrap();
        assert_eq!(deleted, a);
        assert!(matches!(svc.get(&who(), &a.id), Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(&who(), &a.id), Err(ServiceError::NotFound(_))));
        assert_eq!(svc.count().unwrap(), 1);
    }

    #[test]
    fn test_only_patch_leaves_bytes_unchanged() {
        let (svc, kv) = make_service();
        let org = create(&svc, "Original Name", &["Palo Alto", "Austin"]);
        let before = stored_bytes(&kv, &org.id);

        let same = svc
            .patch(
                &who(),
                &org.id,
                &json!([{"op": "test", "path": "/name", "value": "Original Name"}]),
                None,
            )
            .unwrap();
        assert_eq!(same, org);
        assert_eq!(stored_bytes(&kv, &org.id), before);
    }

    #[test]
    fn append_then_remove_round_trips() {
        let (svc, _kv) = make_service();
        let org = create(&svc, "TechFlow", &["Palo Alto", "Austin"]);
        let extra = serde_json::to_value(address("Boston")).unwrap();

        let grown = svc
            .patch(
                &who(),
                &org.id,
                &json!([{"op": "add", "path": "/addresses/-", "value": extra}]),
                None,
            )
            .unwrap();
        assert_eq!(grown.addresses.len(), 3);
        assert_eq!(grown.addresses[2].city, "Boston");

        let back = svc
            .patch(
                &who(),
                &org.id,
                &json!([{"op": "remove", "path": "/addresses/2"}]),
                None,
            )
            .unwrap();
        assert_eq!(back.addresses, org.addresses);
        assert_eq!(back.rev, 3);
    }

    #[test]
    fn failing_operation_aborts_whole_sequence() {
        let (svc, kv) = make_service();
        let org = create(&svc, "Original Name", &["Palo Alto", "Austin"]);
        let before = stored_bytes(&kv, &org.id);

        let err = svc
            .patch(
                &who(),
                &org.id,
                &json!([
                    {"op": "replace", "path": "/name", "value": "X"},
                    {"op": "replace", "path": "/addresses/5", "value": {}}
                ]),
                None,
            )
            .unwrap_err();
        match err {
            ServiceError::Patch { code, index, .. } => {
                assert_eq!(code, "INDEX_OUT_OF_BOUNDS");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stored_bytes(&kv, &org.id), before);
        assert_eq!(svc.get(&who(), &org.id).unwrap().name, "Original Name");
    }

    #[test]
    fn test_guards_replace() {
        let (svc, _kv) = make_service();
        let org = create(&svc, "Original Name", &[]);
        let guarded = json!([
            {"op": "test", "path": "/name", "value": "Original Name"},
            {"op": "replace", "path": "/name", "value": "Updated Name"}
        ]);

        let updated = svc.patch(&who(), &org.id, &guarded, None).unwrap();
        assert_eq!(updated.name, "Updated Name");
        assert_eq!(updated.rev, 2);

        // The stored name changed, so the same guard now fails.
        let err = svc.patch(&who(), &org.id, &guarded, None).unwrap_err();
        assert_eq!(err.error_code(), "ASSERTION_FAILED");
        assert_eq!(svc.get(&who(), &org.id).unwrap(), updated);
    }

    #[test]
    fn move_swaps_addresses() {
        let (svc, _kv) = make_service();
        let org = create(&svc, "TechFlow", &["Palo Alto", "Austin"]);
        let moved = svc
            .patch(
                &who(),
                &org.id,
                &json!([{"op": "move", "from": "/addresses/1", "path": "/addresses/0"}]),
                None,
            )
            .unwrap();
        let cities: Vec<&str> = moved.addresses.iter().map(|a| a.city.as_str()).collect();
        assert_eq!(cities, vec!["Austin", "Palo Alto"]);
    }

    #[test]
    fn unknown_op_rejected_before_load() {
        let (svc, _kv) = make_service();
        // The id does not exist; validation still fires first.
        let err = svc
            .patch(
                &who(),
                "missing",
                &json!([{"op": "delete-field", "path": "/name"}]),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPatch { index: Some(0), .. }));

        let err = svc
            .patch(
                &who(),
                "missing",
                &json!([{"op": "remove", "path": "/name"}]),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn patch_must_leave_valid_document() {
        let (svc, _kv) = make_service();
        let org = create(&svc, "TechFlow", &["Palo Alto"]);

        for bad in [
            json!([{"op": "remove", "path": "/name"}]),
            json!([{"op": "replace", "path": "/name", "value": "   "}]),
            json!([{"op": "remove", "path": "/addresses/0/zip"}]),
            json!([{"op": "add", "path": "/addresses/-", "value": {"street": "x"}}]),
            json!([{"op": "add", "path": "/website", "value": "techflow.io"}]),
            json!([{"op": "replace", "path": "/id", "value": "other"}]),
        ] {
            let err = svc.patch(&who(), &org.id, &bad, None).unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{bad}: {err:?}");
        }
        assert_eq!(svc.get(&who(), &org.id).unwrap(), org);
    }

    #[test]
    fn store_owned_fields_are_rederived() {
        let (svc, _kv) = make_service();
        let org = create(&svc, "TechFlow", &[]);
        let updated = svc
            .patch(
                &who(),
                &org.id,
                &json!([
                    {"op": "replace", "path": "/createdAt", "value": "1999-01-01T00:00:00Z"},
                    {"op": "replace", "path": "/rev", "value": 40},
                    {"op": "replace", "path": "/name", "value": "TechFlow Inc"}
                ]),
                None,
            )
            .unwrap();
        assert_eq!(updated.created_at, org.created_at);
        assert_eq!(updated.rev, 2);
    }

    #[test]
    fn if_match_rev_is_enforced() {
        let (svc, _kv) = make_service();
        let org = create(&svc, "TechFlow", &[]);
        let rename = json!([{"op": "replace", "path": "/name", "value": "Renamed"}]);

        let err = svc.patch(&who(), &org.id, &rename, Some(2)).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_CONFLICT");
        let updated = svc.patch(&who(), &org.id, &rename, Some(1)).unwrap();
        assert_eq!(updated.rev, 2);
    }
}
