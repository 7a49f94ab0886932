//! Handler configuration loaded from TOML.
//!
//! Every key is optional. Keys may sit at the top level of the document or
//! inside a `[handler]` table; both are merged, the table winning on
//! conflicts:
//!
//! ```toml
//! [handler]
//! command_history_limit = 32
//! case_sensitive = true
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{CmdError, Result};

/// Tunables for a command handler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HandlerConfig {
    /// Maximum entries kept in the command history.
    #[serde(default = "default_command_history_limit")]
    pub command_history_limit: usize,
    /// Maximum entries kept in the output-line history.
    #[serde(default = "default_line_history_limit")]
    pub line_history_limit: usize,
    /// Compare command names case-sensitively.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Queue history notifications until drained instead of firing inline.
    #[serde(default)]
    pub deferred_notifications: bool,
    /// Description width used when listing sub-commands in `help`.
    #[serde(default = "default_description_width")]
    pub description_width: usize,
    /// Prefix put in front of echoed input in the line history.
    #[serde(default = "default_echo_prefix")]
    pub echo_prefix: String,
}

fn default_command_history_limit() -> usize {
    64
}

fn default_line_history_limit() -> usize {
    128
}

fn default_description_width() -> usize {
    80
}

fn default_echo_prefix() -> String {
    "> ".to_string()
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            command_history_limit: default_command_history_limit(),
            line_history_limit: default_line_history_limit(),
            case_sensitive: false,
            deferred_notifications: false,
            description_width: default_description_width(),
            echo_prefix: default_echo_prefix(),
        }
    }
}

impl HandlerConfig {
    /// Parse a configuration document.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let mut doc: toml::Table = toml::from_str(toml_str)?;
        match doc.remove("handler") {
            Some(toml::Value::Table(section)) => {
                for key in section.keys().filter(|k| doc.contains_key(*k)) {
                    log::warn!("[handler].{key} overrides the top-level value");
                }
                doc.extend(section);
            },
            Some(other) => {
                return Err(CmdError::Config(format!(
                    "'handler' must be a table, found {}",
                    other.type_str()
                )));
            },
            None => {},
        }
        let config: HandlerConfig = toml::Value::Table(doc).try_into()?;
        Ok(config.validate())
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| CmdError::Config(format!("{}: {e}", path.display())))
    }

    /// Clamp values that would leave the handler unusable.
    pub fn validate(mut self) -> Self {
        if self.command_history_limit == 0 {
            log::warn!("command_history_limit of 0 raised to 1");
            self.command_history_limit = 1;
        }
        if self.line_history_limit == 0 {
            log::warn!("line_history_limit of 0 raised to 1");
            self.line_history_limit = 1;
        }
        if self.description_width == 0 {
            log::warn!("description_width of 0 reset to {}", default_description_width());
            self.description_width = default_description_width();
        }
        self
    }
}
