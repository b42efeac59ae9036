use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::{NewUser, Role, User, UserRepository};
use crate::services::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("access token is expired")]
    Expired,
    #[error("access token validation error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub panchayat_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// HS256 signing and verification of access tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding,
        )?)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature {
                    Err(AuthError::Expired)
                } else {
                    Err(AuthError::Jwt(e))
                }
            }
        }
    }
}

/// bcrypt is deliberately slow, so it runs off the async executor.
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await??;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(ok)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, keys: JwtKeys) -> Self {
        Self { user_repo, keys }
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ServiceError> {
        let invalid = || ServiceError::Unauthorized("Incorrect username or password".to_string());

        let user = self
            .user_repo
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| {
                debug!("Login for unknown user");
                invalid()
            })?;

        if !verify_password(request.password.clone(), user.hashed_password.clone()).await? {
            warn!("Login with wrong password");
            return Err(invalid());
        }

        let access_token = self.keys.issue(&user.username)?;
        info!("Issued access token");
        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Self-registration always creates a regular `user` account.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ServiceError> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(ServiceError::Invalid("Username must not be empty".to_string()));
        }
        if request.password.is_empty() {
            return Err(ServiceError::Invalid("Password must not be empty".to_string()));
        }
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(ServiceError::Invalid("Username already registered".to_string()));
        }
        if let Some(email) = &email {
            if self.user_repo.find_by_email(email).await?.is_some() {
                return Err(ServiceError::Invalid("Email already registered".to_string()));
            }
        }

        let hashed_password = hash_password(request.password.clone()).await?;
        let new_user = NewUser {
            username: username.to_string(),
            email,
            hashed_password,
            role: Role::User,
            panchayat_id: request.panchayat_id,
        };

        self.user_repo
            .insert(&new_user)
            .await
            .map_err(|e| ServiceError::from_write(e, "Username or email already registered"))
    }

    /// Resolves a bearer token to its user.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        let claims = self.keys.validate(token).map_err(|e| {
            debug!("Rejected access token: {}", e);
            ServiceError::Unauthorized("Could not validate credentials".to_string())
        })?;

        self.user_repo
            .find_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                warn!("Token subject {} no longer exists", claims.sub);
                ServiceError::Unauthorized("Could not validate credentials".to_string())
            })
    }
}
