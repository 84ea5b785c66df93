use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("briefing request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("no text in API response (stop_reason: {stop_reason})")]
    EmptyResponse { stop_reason: String },

    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("cannot build email: {0}")]
    Email(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("SMTP server {host} did not accept the connection check")]
    SmtpUnverified { host: String },

    #[error("no recipients configured (set TO_EMAILS or smtp.to)")]
    NoRecipients,
}
