/// Input validation utilities
use validator::ValidationError;

/// validator crate compatible check that a field is not blank after trimming
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}
