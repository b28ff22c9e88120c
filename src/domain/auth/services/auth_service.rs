use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::activation_service::ActivationTokenService;
use super::token_service::{IssuedToken, RefreshOutcome, TokenService};
use crate::domain::auth::entities::{Principal, UserAccount};
use crate::domain::auth::errors::{AuthError, RepositoryError};
use crate::domain::auth::ports::{Mailer, PasswordHasher, UserDirectory};
use crate::domain::auth::value_objects::{Email, Password, PasswordHash};

pub const ACTIVATION_MAIL_SUBJECT: &str = "Activate Your TaskFlow Account";

/// Verified against when the email is unknown, so both login failures cost one hash check
const DUMMY_PASSWORD: &str = "taskflow-timing-equalizer";

/// Account policies applied by `AuthService`
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
  /// Refuse login for accounts that have not followed their activation link
  pub require_verified_email: bool,
  /// Link prefix; the activation token is appended as the `token` query parameter
  pub activation_base_url: String,
}

impl Default for AuthServiceConfig {
  fn default() -> Self {
    Self {
      require_verified_email: false,
      activation_base_url: "http://localhost:8080/auth/activate".to_string(),
    }
  }
}

/// Tokens handed out on successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
  pub principal: Principal,
  pub access_token: IssuedToken,
  pub refresh_token: IssuedToken,
}

/// Authentication service composing the token and activation flows
pub struct AuthService {
  directory: Arc<dyn UserDirectory>,
  password_hasher: Arc<dyn PasswordHasher>,
  mailer: Arc<dyn Mailer>,
  token_service: Arc<TokenService>,
  activation_service: Arc<ActivationTokenService>,
  config: AuthServiceConfig,
  dummy_hash: OnceCell<PasswordHash>,
}

impl AuthService {
  /// Creates a new instance of AuthService
  pub fn new(
    directory: Arc<dyn UserDirectory>,
    password_hasher: Arc<dyn PasswordHasher>,
    mailer: Arc<dyn Mailer>,
    token_service: Arc<TokenService>,
    activation_service: Arc<ActivationTokenService>,
    config: AuthServiceConfig,
  ) -> Self {
    Self {
      directory,
      password_hasher,
      mailer,
      token_service,
      activation_service,
      config,
      dummy_hash: OnceCell::new(),
    }
  }

  pub fn token_service(&self) -> &Arc<TokenService> {
    &self.token_service
  }

  /// Registers a new, unverified account and mails its activation link
  ///
  /// # Errors
  /// Returns `AuthError::EmailAlreadyExists` if the email is already registered
  pub async fn register(
    &self,
    email: Email,
    password: Password,
    full_name: String,
  ) -> Result<UserAccount, AuthError> {
    if self.directory.exists_by_email(&email).await? {
      return Err(AuthError::EmailAlreadyExists);
    }

    let password_hash = self.password_hasher.hash(&password).await?;
    let account = UserAccount::new(email.into_inner(), password_hash.into_inner(), full_name);

    // The existence check above can race with a concurrent registration
    let account = match self.directory.save(account).await {
      Ok(account) => account,
      Err(RepositoryError::DuplicateKey(_)) => return Err(AuthError::EmailAlreadyExists),
      Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %account.id, "Registered account");

    self.send_activation(&account).await?;

    Ok(account)
  }

  /// Verifies credentials and issues an access/refresh token pair
  ///
  /// # Errors
  /// `InvalidCredentials` for an unknown email or a wrong password,
  /// `AccountDisabled`, or `AccountNotActivated` when verified email is required
  pub async fn login(&self, email: Email, password: Password) -> Result<LoginOutcome, AuthError> {
    let Some(account) = self.directory.find_by_email(&email).await? else {
      self.verify_dummy(&password).await;
      return Err(AuthError::InvalidCredentials);
    };

    let password_hash = PasswordHash::from_hash(&account.password_hash)?;
    if !self.password_hasher.verify(&password, &password_hash).await? {
      tracing::debug!(user_id = %account.id, "Password mismatch");
      return Err(AuthError::InvalidCredentials);
    }

    if !account.enabled {
      return Err(AuthError::AccountDisabled);
    }

    if self.config.require_verified_email && !account.verified {
      return Err(AuthError::AccountNotActivated);
    }

    let access_token = self.token_service.issue_access_token(&account.email)?;
    let refresh_token = self.token_service.issue_refresh_token(&account.email)?;

    tracing::info!(user_id = %account.id, "User logged in");

    Ok(LoginOutcome {
      principal: account.principal(),
      access_token,
      refresh_token,
    })
  }

  /// Exchanges a refresh token for a new access token
  pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, AuthError> {
    Ok(self.token_service.refresh(refresh_token).await?)
  }

  /// Revokes the presented token
  pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
    Ok(self.token_service.revoke(token).await?)
  }

  /// Consumes an activation token and marks its account verified
  pub async fn activate(&self, token_value: &str) -> Result<Principal, AuthError> {
    let user_id = self.activation_service.consume(token_value).await?;

    match self.directory.mark_verified(user_id).await {
      Ok(true) => tracing::info!(user_id = %user_id, "Account activated"),
      Ok(false) => tracing::debug!(user_id = %user_id, "Account was already verified"),
      Err(RepositoryError::NotFound) => return Err(AuthError::UserNotFound),
      Err(e) => {
        // The link is spent but the account is still unverified; resend issues a new one
        tracing::warn!(
          user_id = %user_id,
          "Activation token consumed but marking the account verified failed: {}",
          e
        );
        return Err(e.into());
      }
    }

    self.current_user(user_id).await
  }

  /// Re-issues and mails an activation link.
  ///
  /// Unknown, disabled and already verified accounts are skipped silently so
  /// the caller cannot tell them apart.
  pub async fn resend_activation(&self, email: Email) -> Result<(), AuthError> {
    let Some(account) = self.directory.find_by_email(&email).await? else {
      tracing::debug!("Activation resend requested for unknown email");
      return Ok(());
    };

    if account.verified || !account.enabled {
      tracing::debug!(user_id = %account.id, "Activation resend skipped");
      return Ok(());
    }

    self.send_activation(&account).await
  }

  /// Loads the current snapshot of an account
  pub async fn current_user(&self, user_id: Uuid) -> Result<Principal, AuthError> {
    let account = self
      .directory
      .find_by_id(user_id)
      .await?
      .ok_or(AuthError::UserNotFound)?;

    Ok(account.principal())
  }

  async fn verify_dummy(&self, password: &Password) {
    let dummy = self
      .dummy_hash
      .get_or_try_init(|| async {
        self
          .password_hasher
          .hash(&Password::presented(DUMMY_PASSWORD))
          .await
      })
      .await;

    match dummy {
      Ok(hash) => {
        let _ = self.password_hasher.verify(password, hash).await;
      }
      Err(e) => tracing::warn!("Failed to prepare dummy password hash: {}", e),
    }
  }

  async fn send_activation(&self, account: &UserAccount) -> Result<(), AuthError> {
    let token = self.activation_service.issue(account.id).await?;
    let link = format!("{}?token={}", self.config.activation_base_url, token);
    let body = activation_mail_body(&account.full_name, &link);

    // Mail is best effort; the account can request another link
    if let Err(e) = self
      .mailer
      .send(&account.email, ACTIVATION_MAIL_SUBJECT, &body)
      .await
    {
      tracing::warn!(user_id = %account.id, "Failed to send activation email: {}", e);
    }

    Ok(())
  }
}

fn activation_mail_body(full_name: &str, link: &str) -> String {
  format!(
    "Hello {},\n\nPlease activate your TaskFlow account by following this link:\n\n{}\n\nIf you did not create an account you can ignore this email.\n",
    full_name, link
  )
}
