//! Pre-upload file validation
//!
//! Rejects files before any network transfer. The check is pure: no side
//! effects, the caller notifies the user with the specific rule that fired.

use crate::error::ValidationError;
use crate::job::SpreadsheetFile;
use titres_common::config::ImportConfig;

/// Default size ceiling: 10 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Validates a selected spreadsheet against deployment configuration
#[derive(Debug, Clone)]
pub struct FileValidator {
    accept_csv: bool,
    max_size_bytes: u64,
}

impl FileValidator {
    /// Create a validator with explicit limits
    pub fn new(accept_csv: bool, max_size_bytes: u64) -> Self {
        Self {
            accept_csv,
            max_size_bytes,
        }
    }

    /// Create a validator from the import configuration section
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.accept_csv, config.max_file_size_mib * 1024 * 1024)
    }

    /// Extensions accepted by this deployment
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        if self.accept_csv {
            &["xlsx", "xls", "csv"]
        } else {
            &["xlsx", "xls"]
        }
    }

    /// Check extension and size; `Ok(())` means the upload may start
    pub fn validate(&self, file: &SpreadsheetFile) -> Result<(), ValidationError> {
        let extension = file.extension();
        if !self.accepted_extensions().contains(&extension.as_str()) {
            return Err(ValidationError::Extension {
                extension,
                accepted: self.accepted_extensions().join(", "),
            });
        }

        if file.size > self.max_size_bytes {
            return Err(ValidationError::TooLarge {
                size: file.size,
                limit: self.max_size_bytes,
            });
        }

        Ok(())
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(false, DEFAULT_MAX_FILE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64) -> SpreadsheetFile {
        SpreadsheetFile::new(format!("/tmp/{}", name), size)
    }

    #[test]
    fn test_accepts_xlsx_and_xls() {
        let validator = FileValidator::default();
        assert!(validator.validate(&file("titres.xlsx", 1024)).is_ok());
        assert!(validator.validate(&file("titres.xls", 1024)).is_ok());
    }

    #[test]
    fn test_rejects_csv_by_default() {
        let validator = FileValidator::default();
        let err = validator.validate(&file("titres.csv", 1024)).unwrap_err();
        assert!(matches!(err, ValidationError::Extension { .. }));
    }

    #[test]
    fn test_accepts_csv_when_configured() {
        let validator = FileValidator::new(true, DEFAULT_MAX_FILE_SIZE);
        assert!(validator.validate(&file("titres.csv", 1024)).is_ok());
    }

    #[test]
    fn test_rejects_disallowed_extension_with_specific_kind() {
        let validator = FileValidator::default();
        let err = validator.validate(&file("titres.pdf", 1024)).unwrap_err();
        match err {
            ValidationError::Extension { extension, accepted } => {
                assert_eq!(extension, "pdf");
                assert_eq!(accepted, "xlsx, xls");
            }
            other => panic!("Expected extension rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_missing_extension() {
        let validator = FileValidator::default();
        let err = validator.validate(&file("titres", 1024)).unwrap_err();
        assert!(matches!(err, ValidationError::Extension { .. }));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let validator = FileValidator::default();
        assert!(validator.validate(&file("Titres.XLSX", 1024)).is_ok());
    }

    #[test]
    fn test_rejects_oversize_file_with_specific_kind() {
        let validator = FileValidator::default();
        let err = validator
            .validate(&file("titres.xlsx", DEFAULT_MAX_FILE_SIZE + 1))
            .unwrap_err();
        match err {
            ValidationError::TooLarge { size, limit } => {
                assert_eq!(size, DEFAULT_MAX_FILE_SIZE + 1);
                assert_eq!(limit, DEFAULT_MAX_FILE_SIZE);
            }
            other => panic!("Expected size rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_file_at_exact_limit() {
        let validator = FileValidator::default();
        assert!(validator
            .validate(&file("titres.xlsx", DEFAULT_MAX_FILE_SIZE))
            .is_ok());
    }

    #[test]
    fn test_extension_checked_before_size() {
        // Both rules violated: the extension rejection wins so the user
        // fixes the format first.
        let validator = FileValidator::default();
        let err = validator
            .validate(&file("titres.pdf", DEFAULT_MAX_FILE_SIZE + 1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Extension { .. }));
    }
}
