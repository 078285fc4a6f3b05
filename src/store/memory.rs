use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SessionStore, StoreError, StoreResult, TeammateStore, UserStore};
use crate::auth::repo_types::{ProfilePatch, Session, User};
use crate::teammates::repo_types::{NewTeammate, Teammate, TeammateFilter};

#[derive(Default)]
struct Users {
    by_id: HashMap<Uuid, User>,
    // lower-cased email -> id
    by_email: HashMap<String, Uuid>,
}

/// Process-local store. Every mutation holds the write lock, so updates to a
/// single record are serialized.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Users>,
    sessions: RwLock<HashMap<String, Session>>,
    teammates: RwLock<Vec<Teammate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, mut user: User) -> StoreResult<User> {
        user.email = user.email.to_lowercase();
        let mut users = self.users.write().await;
        if users.by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(
                "User with this email already exists".into(),
            ));
        }
        users.by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .by_email
            .get(&email.to_lowercase())
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.by_id.get_mut(&id).map(|user| {
            patch.apply_to(user, now);
            user.clone()
        }))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, session: Session) -> StoreResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.token) {
            return Err(StoreError::Conflict("session token already in use".into()));
        }
        sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn get(&self, token: &str) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete(&self, token: &str) -> StoreResult<bool> {
        Ok(self.sessions.write().await.remove(token).is_some())
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Session>> {
        let mut out: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.created_at);
        Ok(out)
    }
}

#[async_trait]
impl TeammateStore for MemoryStore {
    async fn query(
        &self,
        filter: &TeammateFilter,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<Teammate>, u64)> {
        let matcher = filter
            .matcher()
            .map_err(|e| StoreError::Backend(anyhow::Error::new(e)))?;
        let teammates = self.teammates.read().await;
        let mut matched: Vec<&Teammate> = teammates.iter().filter(|t| matcher.matches(t)).collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matched.len() as u64;
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        let page = matched.into_iter().skip(skip).take(take).cloned().collect();
        Ok((page, total))
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.teammates.read().await.len() as u64)
    }

    async fn insert_many(&self, new: Vec<NewTeammate>) -> StoreResult<()> {
        let mut teammates = self.teammates.write().await;
        teammates.extend(new.into_iter().map(NewTeammate::into_teammate));
        Ok(())
    }
}
