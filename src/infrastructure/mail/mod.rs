mod in_memory;
mod logging;
mod smtp;

pub use in_memory::{InMemoryMailer, SentMail};
pub use logging::LoggingMailer;
pub use smtp::SmtpMailer;
