//! Error types for the options page

use thiserror::Error;

use crate::config::StoreError;

/// A user input problem, shown inline next to the offending field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{message}")]
    ScriptSyntax { message: String },

    #[error("The file naming format must not be empty.")]
    EmptyFormat,

    #[error("The location to move files to must not be empty.")]
    EmptyDestination,
}

impl ValidationError {
    /// Whether this error belongs to the naming format field
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            ValidationError::ScriptSyntax { .. } | ValidationError::EmptyFormat
        )
    }
}

/// All outstanding validation problems, format errors first.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// `None` when there is nothing to report
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn first(&self) -> &ValidationError {
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Errors raised by the options controller
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Recoverable input problems; the user keeps editing
    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to refresh sample files")]
    Samples(#[source] std::io::Error),

    #[error("Options page has not been loaded")]
    NotLoaded,
}

impl OptionsError {
    /// Whether the host should render this inline rather than in an error dialog
    pub fn is_inline(&self) -> bool {
        matches!(self, OptionsError::Invalid(_))
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            OptionsError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for OptionsError {
    fn from(errors: ValidationErrors) -> Self {
        OptionsError::Invalid(errors)
    }
}
