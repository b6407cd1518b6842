//! Naming format and destination validation

use tracing::debug;

use crate::error::{ValidationError, ValidationErrors};
use crate::script::ScriptEngine;
use crate::settings::RenamingSettings;

/// Checks user-authored formats against a script engine
pub struct FormatValidator<E> {
    engine: E,
}

impl<E: ScriptEngine> FormatValidator<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Validate a naming pattern.
    ///
    /// Syntax is always checked; an empty pattern is only rejected when
    /// renaming is enabled.
    pub fn validate(&self, pattern: &str, rename_enabled: bool) -> Result<(), ValidationError> {
        if let Err(e) = self.engine.check(pattern) {
            debug!("Naming format rejected: {}", e);
            return Err(ValidationError::ScriptSyntax {
                message: e.to_string(),
            });
        }

        if rename_enabled && pattern.trim().is_empty() {
            return Err(ValidationError::EmptyFormat);
        }

        Ok(())
    }

    /// Validate the move destination
    pub fn validate_destination(
        &self,
        move_enabled: bool,
        destination: &str,
    ) -> Result<(), ValidationError> {
        if move_enabled && destination.trim().is_empty() {
            return Err(ValidationError::EmptyDestination);
        }
        Ok(())
    }

    /// Run every check and report all problems together
    pub fn check_all(&self, settings: &RenamingSettings) -> Result<(), ValidationErrors> {
        let errors: Vec<ValidationError> = [
            self.validate(&settings.naming_format, settings.rename_enabled),
            self.validate_destination(settings.move_enabled, &settings.move_destination),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        match ValidationErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }
}
