pub mod activation_token_repository;
pub mod user_directory;

#[cfg(test)]
mod test_support;

pub use activation_token_repository::PostgresActivationTokenRepository;
pub use user_directory::PostgresUserDirectory;
