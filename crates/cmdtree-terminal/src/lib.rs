//! Command tree and evaluation engine.
//!
//! Commands are `Definition` nodes arranged in a tree of scopes. A `Handler`
//! owns the root scope, tokenizes input, expands `$(...)` nested calls,
//! resolves the longest matching command path, and dispatches the command's
//! callback with a mutable `Data` context. It also keeps bounded command and
//! output-line histories and offers prefix autocomplete.

mod args;
mod commands;
mod data;
mod definition;
mod handler;
mod history;
mod name;
mod notify;
mod substitution;
mod tokenizer;

/// Conversion of a single argument token into a typed value.
pub use args::FromToken;
/// Register the built-in demonstration commands into a handler.
pub use commands::register_builtins;
/// Mutable context for one command evaluation.
pub use data::Data;
/// Deepest node reached while resolving a command path.
pub use definition::ClosestMatch;
/// An executable command callback.
pub use definition::Command;
/// A node in the command tree.
pub use definition::Definition;
/// Name of the built-in help command.
pub use definition::HELP_COMMAND;
/// The root scope plus histories and dispatch.
pub use handler::Handler;
/// A bounded, newest-first history list.
pub use history::BoundedHistory;
/// One line of console output with its severity.
pub use history::OutputLine;
/// Case policy used to order and match command names.
pub use name::CaseSensitivity;
/// History change notifications.
pub use notify::{HistoryEvent, Listener};
/// Whitespace tokenizer and its inverse.
pub use tokenizer::{join_tokens, tokenize};

pub use cmdtree_types::color::{Color, Severity};
pub use cmdtree_types::config::HandlerConfig;
pub use cmdtree_types::error::{CmdError, Result};
