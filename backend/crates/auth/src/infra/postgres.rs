//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use platform::password::PasswordDigest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{role::Role, session::Session, user::User, user_group::UserGroup};
use crate::domain::repository::{
    RoleRepository, SessionRepository, UserGroupRepository, UserRepository,
};
use crate::domain::value_object::{
    auth_source_id::AuthSourceId, context_id::ContextId, role_id::RoleId, session_id::SessionId,
    user_group_id::UserGroupId, user_id::UserId, user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the schema in `database/migrations`
    pub async fn migrate(&self) -> AuthResult<()> {
        sqlx::migrate!("../../../database/migrations")
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }

    /// Delete sessions whose absolute expiry has passed
    ///
    /// Expiry is already enforced on read; this only reclaims storage.
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM user_sessions WHERE expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }

    /// Create a context-scoped group
    pub async fn create_user_group(&self, group: &UserGroup) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_groups (group_id, context_id, role_id, name)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(group.group_id.as_uuid())
        .bind(to_db_u64(group.context_id.get(), "context_id")?)
        .bind(i64::from(group.role_id.get()))
        .bind(&group.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn add_membership(&self, group_id: &UserGroupId, user_id: &UserId) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_group_memberships (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(group_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_membership(
        &self,
        group_id: &UserGroupId,
        user_id: &UserId,
    ) -> AuthResult<()> {
        sqlx::query("DELETE FROM user_group_memberships WHERE group_id = $1 AND user_id = $2")
            .bind(group_id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

const USER_COLUMNS: &str = r#"
    user_id,
    user_name,
    password_digest,
    auth_source_id,
    email,
    disabled,
    disabled_reason,
    last_login_at,
    created_at,
    updated_at
"#;

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                user_name,
                user_name_canonical,
                password_digest,
                auth_source_id,
                email,
                disabled,
                disabled_reason,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.user_name.canonical())
        .bind(user.password_digest.as_str())
        .bind(auth_source_to_db(user.auth_source_id)?)
        .bind(&user.email)
        .bind(user.disabled)
        .bind(&user.disabled_reason)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_violation_as_conflict)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_user_name(
        &self,
        user_name: &str,
        include_disabled: bool,
    ) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE user_name_canonical = $1 AND ($2 OR NOT disabled)"
        ))
        .bind(user_name.trim().to_lowercase())
        .bind(include_disabled)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_user_name(&self, user_name: &str) -> AuthResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_name_canonical = $1)",
        )
        .bind(user_name.trim().to_lowercase())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &str) -> AuthResult<bool> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(false);
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                user_name = $2,
                user_name_canonical = $3,
                password_digest = $4,
                auth_source_id = $5,
                email = $6,
                disabled = $7,
                disabled_reason = $8,
                last_login_at = $9,
                updated_at = $10
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.user_name.canonical())
        .bind(user.password_digest.as_str())
        .bind(auth_source_to_db(user.auth_source_id)?)
        .bind(&user.email)
        .bind(user.disabled)
        .bind(&user.disabled_reason)
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_violation_as_conflict)?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        insert_session(&self.pool, session).await
    }

    async fn find_by_id(&self, session_id: &SessionId) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                variables,
                remember,
                expires_at,
                created_at,
                last_activity_at
            FROM user_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_session()).transpose()
    }

    async fn regenerate_id(&self, session: &mut Session) -> AuthResult<()> {
        let new_id = SessionId::generate();

        let mut tx = self.pool.begin().await?;

        let moved = sqlx::query("UPDATE user_sessions SET session_id = $1 WHERE session_id = $2")
            .bind(new_id.as_str())
            .bind(session.session_id.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let old_id = std::mem::replace(&mut session.session_id, new_id);
        if moved == 0 {
            insert_session(&mut *tx, session).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            old_session_id = %old_id,
            new_session_id = %session.session_id,
            persisted = moved > 0,
            "Regenerated session id"
        );

        Ok(())
    }

    async fn update(&self, session: &Session) -> AuthResult<()> {
        let variables = serde_json::to_value(&session.variables)?;

        let updated = sqlx::query(
            r#"
            UPDATE user_sessions SET
                user_id = $2,
                variables = $3,
                remember = $4,
                expires_at = $5,
                last_activity_at = $6
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id.as_str())
        .bind(session.user_id.map(|id| id.into_uuid()))
        .bind(variables)
        .bind(session.remember)
        .bind(session.expires_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::SessionInvalid);
        }

        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> AuthResult<()> {
        sqlx::query("DELETE FROM user_sessions WHERE session_id = $1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

async fn insert_session<'e, E>(executor: E, session: &Session) -> AuthResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let variables = serde_json::to_value(&session.variables)?;

    sqlx::query(
        r#"
        INSERT INTO user_sessions (
            session_id,
            user_id,
            variables,
            remember,
            expires_at,
            created_at,
            last_activity_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(session.session_id.as_str())
    .bind(session.user_id.map(|id| id.into_uuid()))
    .bind(variables)
    .bind(session.remember)
    .bind(session.expires_at)
    .bind(session.created_at)
    .bind(session.last_activity_at)
    .execute(executor)
    .await?;

    Ok(())
}

// ============================================================================
// Role Repository Implementation
// ============================================================================

impl RoleRepository for PgAuthRepository {
    async fn user_has_role(
        &self,
        context_id: ContextId,
        user_id: &UserId,
        role_id: RoleId,
    ) -> AuthResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_roles
                WHERE context_id = $1 AND user_id = $2 AND role_id = $3
            )
            "#,
        )
        .bind(to_db_u64(context_id.get(), "context_id")?)
        .bind(user_id.as_uuid())
        .bind(i64::from(role_id.get()))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT context_id, user_id, role_id FROM user_roles WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }

    async fn grant(&self, role: &Role) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (context_id, user_id, role_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(to_db_u64(role.context_id.get(), "context_id")?)
        .bind(role.user_id.as_uuid())
        .bind(i64::from(role.role_id.get()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke(&self, role: &Role) -> AuthResult<()> {
        sqlx::query(
            "DELETE FROM user_roles WHERE context_id = $1 AND user_id = $2 AND role_id = $3",
        )
        .bind(to_db_u64(role.context_id.get(), "context_id")?)
        .bind(role.user_id.as_uuid())
        .bind(i64::from(role.role_id.get()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// User Group Repository Implementation
// ============================================================================

impl UserGroupRepository for PgAuthRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Vec<UserGroup>> {
        let rows = sqlx::query_as::<_, UserGroupRow>(
            r#"
            SELECT g.group_id, g.context_id, g.role_id, g.name
            FROM user_groups g
            JOIN user_group_memberships m ON m.group_id = g.group_id
            WHERE m.user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserGroupRow::into_group).collect()
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    user_name: String,
    password_digest: String,
    auth_source_id: Option<i64>,
    email: String,
    disabled: bool,
    disabled_reason: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let auth_source_id = self
            .auth_source_id
            .map(|id| from_db_u64(id, "auth_source_id").map(AuthSourceId::new))
            .transpose()?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            user_name: UserName::from_stored(self.user_name),
            password_digest: PasswordDigest::from_stored(self.password_digest),
            auth_source_id,
            email: self.email,
            disabled: self.disabled,
            disabled_reason: self.disabled_reason,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    user_id: Option<Uuid>,
    variables: serde_json::Value,
    remember: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> AuthResult<Session> {
        Ok(Session {
            session_id: SessionId::new(self.session_id),
            user_id: self.user_id.map(UserId::from_uuid),
            variables: serde_json::from_value(self.variables)?,
            remember: self.remember,
            expires_at: self.expires_at,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    context_id: i64,
    user_id: Uuid,
    role_id: i64,
}

impl RoleRow {
    fn into_role(self) -> AuthResult<Role> {
        Ok(Role::new(
            ContextId::new(from_db_u64(self.context_id, "context_id")?),
            UserId::from_uuid(self.user_id),
            role_from_db(self.role_id)?,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct UserGroupRow {
    group_id: Uuid,
    context_id: i64,
    role_id: i64,
    name: String,
}

impl UserGroupRow {
    fn into_group(self) -> AuthResult<UserGroup> {
        Ok(UserGroup {
            group_id: UserGroupId::from_uuid(self.group_id),
            context_id: ContextId::new(from_db_u64(self.context_id, "context_id")?),
            role_id: role_from_db(self.role_id)?,
            name: self.name,
        })
    }
}

// ============================================================================
// Column Conversions
// ============================================================================

fn to_db_u64(value: u64, column: &str) -> AuthResult<i64> {
    i64::try_from(value).map_err(|_| AuthError::Internal(format!("{column} out of range: {value}")))
}

fn from_db_u64(value: i64, column: &str) -> AuthResult<u64> {
    u64::try_from(value).map_err(|_| AuthError::Internal(format!("Invalid {column}: {value}")))
}

fn auth_source_to_db(auth_source_id: Option<AuthSourceId>) -> AuthResult<Option<i64>> {
    auth_source_id
        .map(|id| to_db_u64(id.get(), "auth_source_id"))
        .transpose()
}

fn role_from_db(value: i64) -> AuthResult<RoleId> {
    u32::try_from(value)
        .map(RoleId::new)
        .map_err(|_| AuthError::Internal(format!("Invalid role_id: {value}")))
}

/// Unique-key violations on users are a user-facing conflict, not a store fault
fn unique_violation_as_conflict(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            let what = match db.constraint() {
                Some(c) if c.contains("email") => "email",
                _ => "user name",
            };
            AuthError::Conflict(what.to_string())
        }
        _ => AuthError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_conversions() {
        assert_eq!(to_db_u64(7, "context_id").unwrap(), 7);
        assert!(to_db_u64(u64::MAX, "context_id").is_err());
        assert!(from_db_u64(-1, "context_id").is_err());
        assert_eq!(role_from_db(0x10).unwrap(), RoleId::MANAGER);
        assert!(role_from_db(-5).is_err());
        assert_eq!(auth_source_to_db(None).unwrap(), None);
        assert_eq!(
            auth_source_to_db(Some(AuthSourceId::new(3))).unwrap(),
            Some(3)
        );
    }

    #[test]
    fn test_non_unique_errors_pass_through() {
        let err = unique_violation_as_conflict(sqlx::Error::RowNotFound);
        assert!(matches!(err, AuthError::Database(sqlx::Error::RowNotFound)));
    }
}
