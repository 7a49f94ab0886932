//! Foundation types for cmdtree.
//!
//! This crate holds the pieces shared by the command engine and its
//! front-ends: the error type, handler configuration, and the opaque
//! color/severity tag attached to command output.

pub mod color;
pub mod config;
pub mod error;
