//! Auth module: local accounts and bearer tokens.
//!
//! # Resources
//!
//! - **User**: email + argon2id password hash, keyed by lowercase email
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(kv, AuthConfig::new(secret, 86400));
//! let router = module.routes(); // /auth/register, /auth/login
//! let gate: Arc<dyn Authenticator> = module.service().clone();
//! ```

pub mod api;
pub mod jwt;
pub mod model;
pub mod service;
pub mod store_impls;

use std::sync::Arc;

use axum::Router;

use orgsvc_core::Module;
use orgsvc_kv::KVStore;

use crate::service::{AuthConfig, AuthService};

/// Auth module implementing the Module trait.
///
/// Holds the AuthService and provides the register/login routes.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    pub fn new(kv: Arc<dyn KVStore>, config: AuthConfig) -> Self {
        Self {
            service: Arc::new(AuthService::new(kv, config)),
        }
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
