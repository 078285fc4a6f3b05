use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{SessionStore, StoreError, StoreResult, TeammateStore, UserStore};
use crate::auth::repo_types::{ProfilePatch, Session, User};
use crate::teammates::repo_types::{NewTeammate, Teammate, TeammateFilter};

const USER_COLUMNS: &str =
    "id, full_name, email, password_hash, skills, bio, availability, created_at, updated_at";

/// Postgres-backed store. Per-row atomicity comes from the database.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Map a sqlx error onto the store taxonomy. Connection-level failures are
/// `Unavailable` so a fallback store can take over.
fn classify(e: sqlx::Error, conflict: &str) -> StoreError {
    let unique = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
    if unique {
        return StoreError::Conflict(conflict.to_string());
    }
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e.to_string()),
        other => StoreError::Backend(anyhow::Error::new(other)),
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    classify(e, "duplicate key")
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, skills, bio, availability, created_at)
            VALUES ($1, $2, lower($3), $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.skills)
            .bind(&user.bio)
            .bind(&user.availability)
            .bind(user.created_at)
            .fetch_one(&self.db)
            .await
            .map_err(|e| classify(e, "User with this email already exists"))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = lower($1)");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(backend)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(backend)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        now: OffsetDateTime,
    ) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users SET
                full_name    = COALESCE($2, full_name),
                bio          = COALESCE($3, bio),
                skills       = COALESCE($4, skills),
                availability = COALESCE($5, availability),
                updated_at   = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(patch.full_name.clone())
            .bind(patch.bio.clone())
            .bind(patch.skills.clone())
            .bind(patch.availability.clone())
            .bind(now)
            .fetch_optional(&self.db)
            .await
            .map_err(backend)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert(&self, session: Session) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.db)
        .await
        .map_err(|e| classify(e, "session token already in use"))?;
        Ok(())
    }

    async fn get(&self, token: &str) -> StoreResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            r#"SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .map_err(backend)
    }

    async fn delete(&self, token: &str) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.db)
            .await
            .map_err(backend)?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT token, user_id, created_at, expires_at
              FROM sessions
             WHERE user_id = $1
             ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(backend)
    }
}

#[async_trait]
impl TeammateStore for PgStore {
    async fn query(
        &self,
        filter: &TeammateFilter,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<Teammate>, u64)> {
        // Patterns are regex-escaped, so `~*` is a literal case-insensitive
        // substring match.
        const WHERE: &str = r#"
            WHERE ($1::text IS NULL OR EXISTS (SELECT 1 FROM unnest(skills) AS s WHERE s ~* $1))
              AND ($2::text IS NULL OR availability ~* $2)
        "#;
        let skill = filter.skill_pattern();
        let availability = filter.availability_pattern();

        let items = sqlx::query_as::<_, Teammate>(&format!(
            "SELECT id, name, skills, availability, bio, avatar FROM teammates {WHERE} \
             ORDER BY name ASC, id ASC OFFSET $3 LIMIT $4"
        ))
        .bind(skill.clone())
        .bind(availability.clone())
        .bind(to_i64(offset))
        .bind(to_i64(limit))
        .fetch_all(&self.db)
        .await
        .map_err(backend)?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM teammates {WHERE}"))
            .bind(skill)
            .bind(availability)
            .fetch_one(&self.db)
            .await
            .map_err(backend)?;

        Ok((items, total.max(0) as u64))
    }

    async fn count(&self) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teammates")
            .fetch_one(&self.db)
            .await
            .map_err(backend)?;
        Ok(total.max(0) as u64)
    }

    async fn insert_many(&self, teammates: Vec<NewTeammate>) -> StoreResult<()> {
        let mut tx = self.db.begin().await.map_err(backend)?;
        for t in teammates.into_iter().map(NewTeammate::into_teammate) {
            sqlx::query(
                r#"
                INSERT INTO teammates (id, name, skills, availability, bio, avatar)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(t.id)
            .bind(&t.name)
            .bind(&t.skills)
            .bind(&t.availability)
            .bind(&t.bio)
            .bind(&t.avatar)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }
        tx.commit().await.map_err(backend)?;
        Ok(())
    }
}
