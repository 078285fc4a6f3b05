use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use super::{SessionStore, StoreError, StoreResult, TeammateStore, UserStore};
use crate::auth::repo_types::{ProfilePatch, Session, User};
use crate::teammates::repo_types::{NewTeammate, Teammate, TeammateFilter};

/// Sends every call to `primary`; if it reports [`StoreError::Unavailable`]
/// the same call is made once against `secondary`. Any other outcome from the
/// primary, including `Conflict`, is returned as is.
pub struct FallbackStore<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackStore<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

fn degraded(op: &'static str, reason: &str) {
    warn!(op, reason, "primary store unavailable; using fallback store");
}

#[async_trait]
impl<P: UserStore, S: UserStore> UserStore for FallbackStore<P, S> {
    async fn insert(&self, user: User) -> StoreResult<User> {
        match self.primary.insert(user.clone()).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("users.insert", &reason);
                self.secondary.insert(user).await
            }
            other => other,
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        match self.primary.find_by_email(email).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("users.find_by_email", &reason);
                self.secondary.find_by_email(email).await
            }
            other => other,
        }
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        match self.primary.find_by_id(id).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("users.find_by_id", &reason);
                self.secondary.find_by_id(id).await
            }
            other => other,
        }
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>> {
        match self.primary.update_profile(id, patch, now).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("users.update_profile", &reason);
                self.secondary.update_profile(id, patch, now).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl<P: SessionStore, S: SessionStore> SessionStore for FallbackStore<P, S> {
    async fn insert(&self, session: Session) -> StoreResult<()> {
        match self.primary.insert(session.clone()).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("sessions.insert", &reason);
                self.secondary.insert(session).await
            }
            other => other,
        }
    }

    async fn get(&self, token: &str) -> StoreResult<Option<Session>> {
        match self.primary.get(token).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("sessions.get", &reason);
                self.secondary.get(token).await
            }
            other => other,
        }
    }

    async fn delete(&self, token: &str) -> StoreResult<bool> {
        match self.primary.delete(token).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("sessions.delete", &reason);
                self.secondary.delete(token).await
            }
            other => other,
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Session>> {
        match self.primary.list_for_user(user_id).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("sessions.list_for_user", &reason);
                self.secondary.list_for_user(user_id).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl<P: TeammateStore, S: TeammateStore> TeammateStore for FallbackStore<P, S> {
    async fn query(
        &self,
        filter: &TeammateFilter,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<Teammate>, u64)> {
        match self.primary.query(filter, offset, limit).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("teammates.query", &reason);
                self.secondary.query(filter, offset, limit).await
            }
            other => other,
        }
    }

    async fn count(&self) -> StoreResult<u64> {
        match self.primary.count().await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("teammates.count", &reason);
                self.secondary.count().await
            }
            other => other,
        }
    }

    async fn insert_many(&self, teammates: Vec<NewTeammate>) -> StoreResult<()> {
        match self.primary.insert_many(teammates.clone()).await {
            Err(StoreError::Unavailable(reason)) => {
                degraded("teammates.insert_many", &reason);
                self.secondary.insert_many(teammates).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    /// Primary that is always unreachable.
    struct DownStore;

    #[async_trait]
    impl UserStore for DownStore {
        async fn insert(&self, _u: User) -> StoreResult<User> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn find_by_email(&self, _e: &str) -> StoreResult<Option<User>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn find_by_id(&self, _id: Uuid) -> StoreResult<Option<User>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn update_profile(
            &self,
            _id: Uuid,
            _p: &ProfilePatch,
            _n: OffsetDateTime,
        ) -> StoreResult<Option<User>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[async_trait]
    impl SessionStore for DownStore {
        async fn insert(&self, _s: Session) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn get(&self, _t: &str) -> StoreResult<Option<Session>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn delete(&self, _t: &str) -> StoreResult<bool> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn list_for_user(&self, _id: Uuid) -> StoreResult<Vec<Session>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[async_trait]
    impl TeammateStore for DownStore {
        async fn query(
            &self,
            _f: &TeammateFilter,
            _o: u64,
            _l: u64,
        ) -> StoreResult<(Vec<Teammate>, u64)> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn count(&self) -> StoreResult<u64> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn insert_many(&self, _t: Vec<NewTeammate>) -> StoreResult<()> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    /// Primary that is reachable but broken.
    struct BrokenStore;

    #[async_trait]
    impl TeammateStore for BrokenStore {
        async fn query(
            &self,
            _f: &TeammateFilter,
            _o: u64,
            _l: u64,
        ) -> StoreResult<(Vec<Teammate>, u64)> {
            Err(StoreError::Backend(anyhow::anyhow!("syntax error")))
        }
        async fn count(&self) -> StoreResult<u64> {
            Err(StoreError::Backend(anyhow::anyhow!("syntax error")))
        }
        async fn insert_many(&self, _t: Vec<NewTeammate>) -> StoreResult<()> {
            Err(StoreError::Backend(anyhow::anyhow!("syntax error")))
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Fallback".into(),
            email: "f@x.com".into(),
            password_hash: "h".into(),
            skills: vec![],
            bio: String::new(),
            availability: "Now".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn unavailable_primary_falls_through_to_secondary() {
        let store = FallbackStore::new(DownStore, MemoryStore::new());
        let created = UserStore::insert(&store, user()).await.unwrap();
        let found = store.find_by_email("F@X.COM").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn other_primary_errors_are_not_masked() {
        let store = FallbackStore::new(BrokenStore, MemoryStore::new());
        let err = store.count().await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn conflict_from_primary_is_authoritative() {
        let primary = MemoryStore::new();
        UserStore::insert(&primary, user()).await.unwrap();
        let store = FallbackStore::new(primary, MemoryStore::new());
        let err = UserStore::insert(&store, user()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn sessions_fall_through_when_primary_is_down() {
        let store = FallbackStore::new(DownStore, MemoryStore::new());
        let now = OffsetDateTime::now_utc();
        SessionStore::insert(
            &store,
            Session {
                token: "tok".into(),
                user_id: Uuid::new_v4(),
                created_at: now,
                expires_at: now + time::Duration::hours(1),
            },
        )
        .await
        .unwrap();

        let found = store.get("tok").await.unwrap().unwrap();
        assert_eq!(found.token, "tok");
        assert!(store.delete("tok").await.unwrap());
        assert!(store.get("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn teammates_fall_through_when_primary_is_down() {
        let store = FallbackStore::new(DownStore, MemoryStore::new());
        store
            .insert_many(crate::seed::sample_teammates())
            .await
            .unwrap();

        let filter = TeammateFilter::new(Some("react".into()), None);
        let (items, total) = store.query(&filter, 0, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].name, "Bob Smith");
        assert_eq!(TeammateStore::count(&store).await.unwrap(), 5);
    }
}
