//! Environment-derived configuration.
//!
//! The environment is read exactly once, here; every component below
//! the CLI receives explicit values.

use sakiyomi_core::Credentials;

use crate::error::CliError;

const IDENTIFIER_VAR: &str = "SAKIYOMI_IDENTIFIER";
const SECRET_VAR: &str = "SAKIYOMI_SECRET";
const WEBHOOK_VAR: &str = "SAKIYOMI_WEBHOOK_URL";

/// Login credentials for the forecast site.
pub fn credentials_from_env() -> Result<Credentials, CliError> {
    let identifier = std::env::var(IDENTIFIER_VAR)
        .map_err(|_| CliError::Config(format!("{IDENTIFIER_VAR} is not set")))?;
    let secret = std::env::var(SECRET_VAR)
        .map_err(|_| CliError::Config(format!("{SECRET_VAR} is not set")))?;

    Credentials::new(identifier, secret).map_err(CliError::Validation)
}

/// Optional notification webhook; absence disables the sink.
pub fn webhook_from_env() -> Option<String> {
    std::env::var(WEBHOOK_VAR).ok().filter(|url| !url.trim().is_empty())
}
