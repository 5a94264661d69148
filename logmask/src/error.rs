use thiserror::Error;

/// Errors raised while configuring a logger.
///
/// Logging itself never fails; these only come out of configuration and
/// builder calls.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid log level: {0}. Must be one of: trace, debug, info, warn, error, fatal")]
    InvalidLevel(String),

    #[error("failed to load logger configuration: {0}")]
    Config(#[from] figment::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
