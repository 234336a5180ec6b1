//! Error types for catalog and modifier-library validation.

use thiserror::Error;

/// Error codes for modifier-library validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// E001: Modifier definition declares neither a target nor a macro variable
    EmptyModifierDef,
    /// E002: Unknown modifier type
    UnknownModifierType,
    /// E003: Duplicate modifier full name
    DuplicateModifier,
    /// E004: Macro variable does not resolve to a category or tag
    UnresolvedMacroVariable,
    /// E005: Two modifier groups claim the same macro variable
    MacroVariableConflict,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::EmptyModifierDef => "E001",
            ErrorCode::UnknownModifierType => "E002",
            ErrorCode::DuplicateModifier => "E003",
            ErrorCode::UnresolvedMacroVariable => "E004",
            ErrorCode::MacroVariableConflict => "E005",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for modifier-library validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: Modifier references a target group with no catalog entries
    UnknownTargetGroup,
    /// W002: Modifier group defines no modifiers
    EmptyGroup,
    /// W003: Macro dependency has no owning modifier group
    UnmappedDependency,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::UnknownTargetGroup => "W001",
            WarningCode::EmptyGroup => "W002",
            WarningCode::UnmappedDependency => "W003",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and the offending modifier or group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// The modifier full name or group name the error refers to.
    pub subject: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            subject: None,
        }
    }

    /// Creates a new validation error tied to a modifier or group.
    pub fn with_subject(
        code: ErrorCode,
        message: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            subject: Some(subject.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref subject) = self.subject {
            write!(f, "{}: {} (at {})", self.code, self.message, subject)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validation warning with code, message, and the offending modifier or group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
    /// The modifier full name or group name the warning refers to.
    pub subject: Option<String>,
}

impl ValidationWarning {
    /// Creates a new validation warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            subject: None,
        }
    }

    /// Creates a new validation warning tied to a modifier or group.
    pub fn with_subject(
        code: WarningCode,
        message: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            subject: Some(subject.into()),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref subject) = self.subject {
            write!(f, "{}: {} (at {})", self.code, self.message, subject)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// Top-level error type for data-model operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Library or catalog validation failed with one or more errors.
    #[error("validation failed with {0} error(s)")]
    ValidationFailed(usize),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of modifier-library validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of validation warnings.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Creates an empty (successful) validation result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts to a Result, returning Err if there are errors.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::EmptyModifierDef.code(), "E001");
        assert_eq!(ErrorCode::MacroVariableConflict.code(), "E005");
        assert_eq!(WarningCode::UnknownTargetGroup.code(), "W001");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::with_subject(
            ErrorCode::DuplicateModifier,
            "already defined",
            "breast/BreastSize",
        );
        assert_eq!(
            err.to_string(),
            "E003: already defined (at breast/BreastSize)"
        );
    }

    #[test]
    fn test_validation_result() {
        let mut result = ValidationResult::new();
        assert!(result.is_ok());

        result.add_warning(ValidationWarning::new(WarningCode::EmptyGroup, "empty"));
        assert!(result.is_ok());

        result.add_error(ValidationError::new(ErrorCode::EmptyModifierDef, "empty"));
        assert!(!result.is_ok());
        assert!(result.into_result().is_err());
    }
}
