use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::auth::{
  entities::UserAccount,
  errors::RepositoryError,
  ports::UserDirectory,
  value_objects::{Email, Role},
};

/// PostgreSQL implementation of the UserDirectory trait
pub struct PostgresUserDirectory {
  pool: PgPool,
}

impl PostgresUserDirectory {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Database row structure for users table
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
  id: Uuid,
  email: String,
  password_hash: String,
  full_name: String,
  role: String,
  verified: bool,
  enabled: bool,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
  type Error = RepositoryError;

  fn try_from(row: UserRow) -> Result<Self, Self::Error> {
    let role: Role = row
      .role
      .parse()
      .map_err(|e| RepositoryError::CorruptRecord(format!("users.role for {}: {}", row.id, e)))?;

    Ok(UserAccount::from_db(
      row.id,
      row.email,
      row.password_hash,
      row.full_name,
      role,
      row.verified,
      row.enabled,
      row.created_at,
      row.updated_at,
    ))
  }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
  async fn find_by_email(&self, email: &Email) -> Result<Option<UserAccount>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
      r#"
            SELECT id, email, password_hash, full_name, role, verified, enabled,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
    )
    .bind(email.as_str())
    .fetch_optional(&self.pool)
    .await?;

    row.map(UserAccount::try_from).transpose()
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
      r#"
            SELECT id, email, password_hash, full_name, role, verified, enabled,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(UserAccount::try_from).transpose()
  }

  async fn exists_by_email(&self, email: &Email) -> Result<bool, RepositoryError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
      .bind(email.as_str())
      .fetch_one(&self.pool)
      .await?;

    Ok(exists)
  }

  async fn save(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
      r#"
            INSERT INTO users (
                id, email, password_hash, full_name, role, verified, enabled,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                full_name = EXCLUDED.full_name,
                role = EXCLUDED.role,
                verified = EXCLUDED.verified,
                enabled = EXCLUDED.enabled,
                updated_at = NOW()
            RETURNING id, email, password_hash, full_name, role, verified, enabled,
                      created_at, updated_at
            "#,
    )
    .bind(account.id)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(&account.full_name)
    .bind(account.role.as_str())
    .bind(account.verified)
    .bind(account.enabled)
    .bind(account.created_at)
    .bind(account.updated_at)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn mark_verified(&self, id: Uuid) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
      r#"
            UPDATE users
            SET verified = TRUE, updated_at = NOW()
            WHERE id = $1 AND verified = FALSE
            "#,
    )
    .bind(id)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 1 {
      return Ok(true);
    }

    // Distinguish "already verified" from "no such account"
    match self.find_by_id(id).await? {
      Some(_) => Ok(false),
      None => Err(RepositoryError::NotFound),
    }
  }
}
