//! Authentication use cases
//!
//! Each use case turns raw command input into domain values and delegates to
//! the domain services.

mod activate_account;
mod get_current_user;
mod login_user;
mod logout_user;
mod refresh_token;
mod register_user;
mod resend_activation;

#[cfg(test)]
mod test_support;

pub use activate_account::{ActivateAccountCommand, ActivateAccountResponse, ActivateAccountUseCase};
pub use get_current_user::{GetCurrentUserResponse, GetCurrentUserUseCase};
pub use login_user::{LoginUserCommand, LoginUserResponse, LoginUserUseCase};
pub use logout_user::LogoutUserUseCase;
pub use refresh_token::{RefreshTokenCommand, RefreshTokenResponse, RefreshTokenUseCase};
pub use register_user::{RegisterUserCommand, RegisterUserResponse, RegisterUserUseCase};
pub use resend_activation::{ResendActivationCommand, ResendActivationUseCase};
