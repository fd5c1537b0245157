//! Organization module: named organizations with postal addresses,
//! updated through patch sequences.

pub mod api;
pub mod model;
pub mod service;
pub mod store_impls;

use std::sync::Arc;

use axum::Router;
use orgsvc_core::Module;

use service::OrgService;

/// Organization module.
pub struct OrgModule {
    service: Arc<OrgService>,
}

impl OrgModule {
    pub fn new(service: OrgService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &Arc<OrgService> {
        &self.service
    }
}

impl Module for OrgModule {
    fn name(&self) -> &str {
        "org"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
