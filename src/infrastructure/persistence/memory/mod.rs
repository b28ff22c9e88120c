mod activation_token_repository;
mod user_directory;

pub use activation_token_repository::InMemoryActivationTokenRepository;
pub use user_directory::InMemoryUserDirectory;
