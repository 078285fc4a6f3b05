//! Persistence seams.
//!
//! Services talk to these traits only. `MemoryStore` and `PgStore` are
//! interchangeable behind them, and `FallbackStore` composes the two so that
//! an unreachable database degrades to memory in one place.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{ProfilePatch, Session, User};
use crate::teammates::repo_types::{NewTeammate, Teammate, TeammateFilter};

pub mod fallback;
pub mod memory;
pub mod postgres;

pub use fallback::FallbackStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique key (email, session token) is already taken.
    #[error("{0}")]
    Conflict(String),
    /// The backend could not be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict` if the (lower-cased) email
    /// exists; this is the only uniqueness check that counts.
    async fn insert(&self, user: User) -> StoreResult<User>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Apply `patch` atomically. `None` when the id is unknown.
    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fails with `Conflict` if the token is already in use.
    async fn insert(&self, session: Session) -> StoreResult<()>;
    async fn get(&self, token: &str) -> StoreResult<Option<Session>>;
    /// Returns whether a session was removed.
    async fn delete(&self, token: &str) -> StoreResult<bool>;
    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Session>>;
}

#[async_trait]
pub trait TeammateStore: Send + Sync {
    /// Filter first, then page. Returns the page and the filtered total.
    async fn query(
        &self,
        filter: &TeammateFilter,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<Teammate>, u64)>;
    async fn count(&self) -> StoreResult<u64>;
    async fn insert_many(&self, teammates: Vec<NewTeammate>) -> StoreResult<()>;
}
