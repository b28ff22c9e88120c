pub mod clock;
pub mod config;
pub mod mail;
pub mod metrics;
pub mod persistence;
pub mod revocation;
pub mod security;
