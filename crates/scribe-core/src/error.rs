//! Unified error model for the plugin crates
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    /// The Scribe API answered with a non-success status
    #[error("API/{status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced an answer (connect, timeout, TLS)
    #[error("TRANSPORT/{0}")]
    Transport(String),

    /// The answer could not be decoded into the expected shape
    #[error("DECODE/{0}")]
    Decode(String),

    /// Invalid plugin or connection configuration
    #[error("CONFIG/{0}")]
    Config(String),

    /// A workflow action was invoked with unusable inputs
    #[error("ACTION/{0}")]
    Action(String),

    /// A template definition file could not be used
    #[error("DEFINITION/{0}")]
    Definition(String),
}

impl ScribeError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn action(message: impl Into<String>) -> Self {
        Self::Action(message.into())
    }
}
