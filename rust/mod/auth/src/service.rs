use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{info, warn};

use orgsvc_core::{bearer_token, Authenticator, Identity, ServiceError};
use orgsvc_kv::KVStore;
use orgsvc_store::KvOps;

use crate::jwt::{JwtService, TokenRejection};
use crate::model::{Credentials, User, UserInfo};
use crate::store_impls::{hash_password, verify_password};

const MIN_PASSWORD_LEN: usize = 6;

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 24h).
    pub access_token_ttl: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, access_token_ttl: i64) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl,
        }
    }
}

/// A freshly issued access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
    pub user: UserInfo,
}

/// The Auth service: account storage plus token issuance.
pub struct AuthService {
    users: KvOps<User>,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(kv: Arc<dyn KVStore>, config: AuthConfig) -> Self {
        Self {
            users: KvOps::new(kv),
            jwt: JwtService::new(&config.jwt_secret, config.access_token_ttl),
        }
    }

    /// Create an account. The email is lowercased and must be unused.
    pub fn register(&self, input: Credentials) -> Result<UserInfo, ServiceError> {
        let email = input.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ServiceError::Validation(
                "email must be a valid email address".into(),
            ));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::Validation(format!(
                "password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }

        let password_hash = hash_password(&input.password)
            .map_err(|e| ServiceError::Internal(format!("hash password: {}", e)))?;
        let user = User {
            id: String::new(),
            email,
            password_hash,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let user = self.users.save_new(user).map_err(|e| match e {
            ServiceError::Conflict(_) => ServiceError::Conflict("email already exists".into()),
            other => other,
        })?;

        info!(email = %user.email, "new user registered");
        Ok(UserInfo::from(&user))
    }

    /// Check credentials and issue an access token.
    pub fn login(&self, input: Credentials) -> Result<IssuedToken, ServiceError> {
        let email = input.email.trim().to_lowercase();
        let user = self
            .users
            .get(&email)?
            .filter(|u| verify_password(&input.password, &u.password_hash))
            .ok_or_else(|| {
                warn!(email = %email, "login rejected");
                ServiceError::Unauthorized("invalid email or password".into())
            })?;

        let token = self
            .jwt
            .issue(&user.id, &user.email)
            .map_err(ServiceError::Internal)?;

        info!(email = %user.email, "user logged in");
        Ok(IssuedToken {
            token,
            expires_in: self.jwt.expire_secs(),
            user: UserInfo::from(&user),
        })
    }

    /// Resolve a bearer token to the caller it was issued to.
    pub fn verify_token(&self, token: &str) -> Result<Identity, ServiceError> {
        match self.jwt.verify(token) {
            Ok(claims) => Ok(Identity::new(claims.sub, claims.email)),
            Err(TokenRejection::Expired) => {
                Err(ServiceError::Unauthorized("token has expired".into()))
            }
            Err(TokenRejection::Invalid(_)) => {
                Err(ServiceError::Unauthorized("invalid token".into()))
            }
        }
    }

    /// Number of registered accounts.
    pub fn user_count(&self) -> Result<usize, ServiceError> {
        self.users.count()
    }
}

impl Authenticator for AuthService {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, ServiceError> {
        let token = bearer_token(headers).ok_or_else(|| {
            ServiceError::Unauthorized("no token provided, expected a Bearer token".into())
        })?;
        self.verify_token(token)
    }
}

/// `local@domain.tld`, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use orgsvc_kv::RedbStore;

    fn make_service(ttl: i64) -> AuthService {
        let kv: Arc<dyn KVStore> = Arc::new(RedbStore::open_in_memory().unwrap());
        AuthService::new(kv, AuthConfig::new("test-secret", ttl))
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.com"));
        assert!(!is_valid_email("plain"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.co"));
    }

    #[test]
    fn register_then_login() {
        let svc = make_service(3600);
        let user = svc.register(creds("Admin@Example.com", "password123")).unwrap();
        assert_eq!(user.email, "admin@example.com");

        let issued = svc.login(creds("admin@example.com", "password123")).unwrap();
        assert_eq!(issued.user, user);
        assert_eq!(issued.expires_in, 3600);

        let identity = svc.verify_token(&issued.token).unwrap();
        assert_eq!(identity.subject, user.id);
        assert_eq!(identity.email, "admin@example.com");
    }

    #[test]
    fn register_validation() {
        let svc = make_service(3600);
        let err = svc.register(creds("not-an-email", "password123")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = svc.register(creds("a@b.co", "12345")).unwrap_err();
        assert!(err.to_string().contains("at least 6"));
        assert_eq!(svc.user_count().unwrap(), 0);
    }

    #[test]
    fn duplicate_email_conflicts() {
        let svc = make_service(3600);
        svc.register(creds("a@b.co", "password123")).unwrap();
        let err = svc.register(creds("A@B.CO", "different1")).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(err.to_string(), "email already exists");
    }

    #[test]
    fn bad_credentials_are_indistinguishable() {
        let svc = make_service(3600);
        svc.register(creds("a@b.co", "password123")).unwrap();
        let wrong_password = svc.login(creds("a@b.co", "password124")).unwrap_err();
        let unknown = svc.login(creds("z@b.co", "password123")).unwrap_err();
        assert_eq!(wrong_password.to_string(), "invalid email or password");
        assert_eq!(unknown.to_string(), wrong_password.to_string());
        assert!(matches!(unknown, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn expired_and_forged_tokens() {
        let svc = make_service(-120);
        svc.register(creds("a@b.co", "password123")).unwrap();
        let issued = svc.login(creds("a@b.co", "password123")).unwrap();
        assert_eq!(
            svc.verify_token(&issued.token).unwrap_err().to_string(),
            "token has expired"
        );
        assert_eq!(
            svc.verify_token("abc.def.ghi").unwrap_err().to_string(),
            "invalid token"
        );
    }

    #[test]
    fn authenticator_reads_bearer_header() {
        let svc = make_service(3600);
        svc.register(creds("a@b.co", "password123")).unwrap();
        let issued = svc.login(creds("a@b.co", "password123")).unwrap();

        let err = svc.authenticate(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "no token provided, expected a Bearer token");

        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", issued.token)).unwrap(),
        );
        assert_eq!(svc.authenticate(&headers).unwrap().email, "a@b.co");
    }
}
