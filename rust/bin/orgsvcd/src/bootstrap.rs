//! Bootstrap: first-start checks and demo data.
//!
//! When orgsvcd starts:
//! 1. Verify the config has a JWT secret and a data dir; refuse to start otherwise.
//! 2. With `--seed`, insert demo users and organizations into an empty store.

use auth::model::Credentials;
use auth::service::AuthService;
use org::model::{Address, CreateOrganization};
use org::service::OrgService;
use orgsvc_core::Identity;
use tracing::info;

use crate::config::ServerConfig;

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.trim().is_empty() {
        anyhow::bail!(
            "JWT secret is empty in configuration.\n\
             Set [jwt] secret or ORGSVC_JWT_SECRET."
        );
    }
    if config.jwt.expire_secs <= 0 {
        anyhow::bail!("JWT expire_secs must be positive.");
    }
    if config.storage.data_dir.trim().is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

const DEMO_USERS: [(&str, &str); 2] = [
    ("admin@example.com", "password123"),
    ("user@test.io", "securePassword789"),
];

fn address(street: &str, city: &str, state: &str, zip: &str, country: &str) -> Address {
    Address {
        street: street.into(),
        city: city.into(),
        state: state.into(),
        zip: zip.into(),
        country: country.into(),
    }
}

fn demo_organizations() -> Vec<CreateOrganization> {
    vec![
        CreateOrganization {
            name: "TechFlow Solutions".into(),
            addresses: vec![
                address("101 Innovation Blvd", "Palo Alto", "CA", "94301", "USA"),
                address("42 Cloud Dr", "Austin", "TX", "73301", "USA"),
            ],
        },
        CreateOrganization {
            name: "GreenLeaf Organic".into(),
            addresses: vec![address("55 Garden Way", "Portland", "OR", "97201", "USA")],
        },
        CreateOrganization {
            name: "Global Finance Corp".into(),
            addresses: vec![
                address("88 Wall St", "New York", "NY", "10005", "USA"),
                address("12 Canary Wharf", "London", "Greater London", "E14 5AB", "UK"),
            ],
        },
    ]
}

/// Insert demo data. Each resource is seeded only if none exist yet.
pub fn seed(auth: &AuthService, orgs: &OrgService) -> anyhow::Result<()> {
    if auth.user_count()? == 0 {
        for (email, password) in DEMO_USERS {
            auth.register(Credentials {
                email: email.into(),
                password: password.into(),
            })?;
        }
        info!("Seeded {} users", DEMO_USERS.len());
    } else {
        info!("Users already present, skipping user seed");
    }

    if orgs.count()? == 0 {
        let seeder = Identity::new("seed", "seed@localhost");
        let demo = demo_organizations();
        let n = demo.len();
        for input in demo {
            orgs.create(&seeder, input)?;
        }
        info!("Seeded {} organizations", n);
    } else {
        info!("Organizations already present, skipping organization seed");
    }
    Ok(())
}
