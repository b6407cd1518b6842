//! Naming script evaluation
//!
//! The options core only needs an `evaluate(script, metadata)` contract. The
//! [`TaggerScript`] engine covers the subset of the tagger language used by
//! naming formats so previews and validation work without a host.

mod parser;

pub use parser::TaggerScript;

use indexmap::IndexMap;
use thiserror::Error;

/// Tag metadata visible to a script, in insertion order
pub type Metadata = IndexMap<String, String>;

/// Failure reported by a script engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{position}: {message}")]
pub struct ScriptError {
    /// 1-based character position where the problem was detected
    pub position: usize,
    pub message: String,
}

impl ScriptError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Evaluates naming scripts against file metadata.
///
/// Implementations must be pure: evaluating the same script with the same
/// metadata always yields the same result and never touches global state.
pub trait ScriptEngine {
    fn evaluate(&self, script: &str, metadata: &Metadata) -> Result<String, ScriptError>;

    /// Syntax check only; evaluates against empty metadata unless overridden
    fn check(&self, script: &str) -> Result<(), ScriptError> {
        self.evaluate(script, &Metadata::new()).map(|_| ())
    }
}

impl<T: ScriptEngine + ?Sized> ScriptEngine for &T {
    fn evaluate(&self, script: &str, metadata: &Metadata) -> Result<String, ScriptError> {
        (**self).evaluate(script, metadata)
    }

    fn check(&self, script: &str) -> Result<(), ScriptError> {
        (**self).check(script)
    }
}

impl<T: ScriptEngine + ?Sized> ScriptEngine for Box<T> {
    fn evaluate(&self, script: &str, metadata: &Metadata) -> Result<String, ScriptError> {
        (**self).evaluate(script, metadata)
    }

    fn check(&self, script: &str) -> Result<(), ScriptError> {
        (**self).check(script)
    }
}
