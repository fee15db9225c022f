//! Errors surfaced by the mechanics.
//!
//! Only structural problems (a required scene element is missing) and
//! configuration problems are returned to the caller. Lookup misses, parse
//! misses and unmet preconditions are logged and swallowed where they happen.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MechanicsError {
    #[error("atom '{uid}' is missing required element '{element}'")]
    MissingSceneElement { uid: String, element: String },
    #[error("config: {0}")]
    Config(String),
}
