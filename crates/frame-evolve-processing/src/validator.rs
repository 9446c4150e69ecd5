use frame_evolve_core::{FileHandle, ValidationConstraints, ValidationError};

/// Check a candidate file against the configured constraints.
///
/// The declared type is checked first, so a file that is both the wrong format
/// and too large is rejected as an unsupported format.
pub fn validate(file: &FileHandle, constraints: &ValidationConstraints) -> Result<(), ValidationError> {
    let declared = file.declared_type.trim().to_lowercase();

    if !constraints.accepts(&declared) {
        return Err(ValidationError::UnsupportedFormat {
            declared_type: file.declared_type.clone(),
            accepted: constraints.accepted_types.clone(),
        });
    }

    if file.size > constraints.max_size_bytes {
        return Err(ValidationError::FileTooLarge {
            size: file.size,
            max: constraints.max_size_bytes,
        });
    }

    Ok(())
}

/// Media file validator
///
/// Owns a set of constraints so callers can validate repeatedly without passing
/// them around.
#[derive(Debug, Clone, Default)]
pub struct FileValidator {
    constraints: ValidationConstraints,
}

impl FileValidator {
    pub fn new(constraints: ValidationConstraints) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &ValidationConstraints {
        &self.constraints
    }

    pub fn validate(&self, file: &FileHandle) -> Result<(), ValidationError> {
        validate(file, &self.constraints)
    }

    pub fn is_accepted(&self, file: &FileHandle) -> bool {
        self.validate(file).is_ok()
    }
}
