//! Error types for cmdtree.
//!
//! User-input problems (unknown commands, bad arguments, malformed nested
//! calls) are reported as data on the invocation context and never show up
//! here. `CmdError` covers misuse the embedding program can recover from.

use std::io;

/// Errors produced by the cmdtree framework.
#[derive(Debug, thiserror::Error)]
pub enum CmdError {
    #[error("config error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CmdError>;
