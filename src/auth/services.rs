use std::sync::Arc;

use lazy_static::lazy_static;
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, SignupRequest},
        password::{CredentialHasher, DUMMY_HASH},
        repo_types::{ProfilePatch, Session, User, DEFAULT_AVAILABILITY},
    },
    error::{AppError, AppResult, AuthFailure},
    store::{SessionStore, StoreError, UserStore},
};

pub const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_LEN: usize = 48;
const TOKEN_ATTEMPTS: usize = 3;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn new_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Accounts and bearer sessions. Holds no state of its own; everything goes
/// through the injected stores.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: Arc<dyn CredentialHasher>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: Arc<dyn CredentialHasher>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            session_ttl,
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub async fn sign_up(&self, req: SignupRequest) -> AppResult<User> {
        let (Some(full_name), Some(email), Some(password)) = (
            non_empty(req.full_name),
            non_empty(req.email),
            req.password.filter(|p| !p.is_empty()),
        ) else {
            warn!("signup missing required fields");
            return Err(AppError::validation(
                "Please provide name, email and password",
            ));
        };

        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(AppError::validation("Please provide a valid email address"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            warn!("password too short");
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        let password_hash = self.hasher.hash(&password)?;
        let user = User {
            id: Uuid::new_v4(),
            full_name: full_name.trim().to_string(),
            email,
            password_hash,
            skills: req.skills.unwrap_or_default(),
            bio: req.bio.unwrap_or_default(),
            availability: non_empty(req.availability)
                .unwrap_or_else(|| DEFAULT_AVAILABILITY.to_string()),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        };

        // No read-then-write pre-check: the store's uniqueness is authoritative.
        let user = self.users.insert(user).await.map_err(|e| {
            if let StoreError::Conflict(_) = &e {
                warn!("email already registered");
            }
            AppError::from(e)
        })?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    pub async fn log_in(&self, req: LoginRequest) -> AppResult<LoginOutcome> {
        let (Some(email), Some(password)) = (
            non_empty(req.email),
            req.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::validation("Please provide both email and password"));
        };
        let email = email.trim().to_lowercase();

        // Unknown email and wrong password are reported identically and both
        // pay for one verify.
        let found = self.users.find_by_email(&email).await?;
        let verified = match &found {
            Some(u) => self.hasher.verify(&password, &u.password_hash)?,
            None => {
                let _ = self.hasher.verify(&password, DUMMY_HASH);
                false
            }
        };
        let user = match found {
            Some(u) if verified => u,
            Some(u) => {
                warn!(user_id = %u.id, "login invalid password");
                return Err(AppError::Auth(AuthFailure::BadCredentials));
            }
            None => {
                warn!(email = %email, "login unknown email");
                return Err(AppError::Auth(AuthFailure::BadCredentials));
            }
        };

        let now = OffsetDateTime::now_utc();
        let expires_at = now
            .checked_add(self.session_ttl)
            .ok_or_else(|| anyhow::anyhow!("session ttl out of range"))?;
        let token = self.open_session(user.id, now, expires_at).await?;

        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok(LoginOutcome {
            user,
            token,
            expires_at,
        })
    }

    async fn open_session(
        &self,
        user_id: Uuid,
        created_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> AppResult<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let session = Session {
                token: new_token(),
                user_id,
                created_at,
                expires_at,
            };
            let token = session.token.clone();
            match self.sessions.insert(session).await {
                Ok(()) => return Ok(token),
                Err(StoreError::Conflict(_)) if attempt < TOKEN_ATTEMPTS => {
                    debug!(attempt, "session token collision; regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Resolve a bearer token to its user. Expired sessions are deleted here.
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<User> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Auth(AuthFailure::Missing))?;

        let session = self
            .sessions
            .get(token)
            .await?
            .ok_or(AppError::Auth(AuthFailure::Invalid))?;

        if session.is_expired_at(OffsetDateTime::now_utc()) {
            self.sessions.delete(token).await?;
            debug!(user_id = %session.user_id, "expired session removed");
            return Err(AppError::Auth(AuthFailure::Expired));
        }

        self.users
            .find_by_id(session.user_id)
            .await?
            .ok_or(AppError::Auth(AuthFailure::UserNotFound))
    }

    /// Idempotent: an absent or expired token is not an error.
    pub async fn log_out(&self, token: &str) -> AppResult<()> {
        let removed = self.sessions.delete(token).await?;
        debug!(removed, "logout");
        Ok(())
    }

    pub async fn update_profile(&self, user: &User, mut patch: ProfilePatch) -> AppResult<User> {
        if let Some(name) = patch.full_name.take() {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("Full name cannot be empty"));
            }
            patch.full_name = Some(name.to_string());
        }
        let updated = self
            .users
            .update_profile(user.id, &patch, OffsetDateTime::now_utc())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        info!(user_id = %updated.id, "profile updated");
        Ok(updated)
    }
}
