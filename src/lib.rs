pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod validation;

pub use cache::ValidationCache;
pub use config::ValidatorConfig;
pub use error::{BatchAbort, ProbeError, ValidationError};
pub use pipeline::{AddressOutcome, AddressState, EmailValidator, SmtpValidator};
