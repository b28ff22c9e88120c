use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::auth::{
  entities::ActivationToken, errors::RepositoryError, ports::ActivationTokenRepository,
};

/// PostgreSQL implementation of the ActivationTokenRepository trait
pub struct PostgresActivationTokenRepository {
  pool: PgPool,
}

impl PostgresActivationTokenRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[derive(Debug, sqlx::FromRow)]
struct ActivationTokenRow {
  id: Uuid,
  token_value: String,
  user_id: Uuid,
  created_at: DateTime<Utc>,
  expires_at: DateTime<Utc>,
  consumed: bool,
}

impl From<ActivationTokenRow> for ActivationToken {
  fn from(row: ActivationTokenRow) -> Self {
    ActivationToken {
      id: row.id,
      token_value: row.token_value,
      user_id: row.user_id,
      created_at: row.created_at,
      expires_at: row.expires_at,
      consumed: row.consumed,
    }
  }
}

#[async_trait]
impl ActivationTokenRepository for PostgresActivationTokenRepository {
  async fn issue(&self, token: ActivationToken) -> Result<ActivationToken, RepositoryError> {
    let mut tx = self.pool.begin().await?;

    let superseded = sqlx::query(
      r#"
            UPDATE activation_tokens
            SET consumed = TRUE
            WHERE user_id = $1 AND consumed = FALSE
            "#,
    )
    .bind(token.user_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let row = sqlx::query_as::<_, ActivationTokenRow>(
      r#"
            INSERT INTO activation_tokens (id, token_value, user_id, created_at, expires_at, consumed)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, token_value, user_id, created_at, expires_at, consumed
            "#,
    )
    .bind(token.id)
    .bind(&token.token_value)
    .bind(token.user_id)
    .bind(token.created_at)
    .bind(token.expires_at)
    .bind(token.consumed)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    if superseded > 0 {
      tracing::debug!(user_id = %token.user_id, superseded, "Superseded activation tokens");
    }

    Ok(row.into())
  }

  async fn find_by_value(&self, value: &str) -> Result<Option<ActivationToken>, RepositoryError> {
    let row = sqlx::query_as::<_, ActivationTokenRow>(
      r#"
            SELECT id, token_value, user_id, created_at, expires_at, consumed
            FROM activation_tokens
            WHERE token_value = $1
            "#,
    )
    .bind(value)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(Into::into))
  }

  async fn mark_consumed(&self, id: Uuid) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
      r#"
            UPDATE activation_tokens
            SET consumed = TRUE
            WHERE id = $1 AND consumed = FALSE
            "#,
    )
    .bind(id)
    .execute(&self.pool)
    .await?;

    Ok(result.rows_affected() == 1)
  }
}
