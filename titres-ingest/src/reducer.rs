//! Batch result reduction
//!
//! Interprets the raw ingestion response into a structured [`BatchOutcome`].
//! The critical branch: a successful transport call does NOT mean every row
//! succeeded, so consumers must branch on row counts, not transport status.

use crate::error::ReduceError;
use serde::{Deserialize, Serialize};
use titres_common::api::ImportResponse;

/// How one batch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Every row imported
    Success,
    /// Transport succeeded, one or more rows rejected
    Partial,
    /// The batch failed as a whole
    Failed,
}

/// Immutable result of one import job
///
/// The server may skip rows silently, so `succeeded + failed <= total` is
/// tolerated rather than assumed impossible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Terminal kind of the batch
    pub kind: OutcomeKind,
    /// Rows the server reported seeing (0 when the server omitted it)
    pub total_rows: u64,
    /// Rows imported
    pub succeeded: u64,
    /// Rows rejected
    pub failed: u64,
    /// Per-row error messages in original order (opaque text)
    pub errors: Vec<String>,
    /// Server-side failure message for a failed batch
    pub failure_message: Option<String>,
}

impl BatchOutcome {
    /// Whether any rows at all were imported
    pub fn imported_anything(&self) -> bool {
        self.kind != OutcomeKind::Failed && self.succeeded > 0
    }
}

/// Interpret a raw response body into a [`BatchOutcome`]
///
/// Rules:
/// - `success == false` reduces to `Failed` regardless of row counts.
/// - `success == true` with a non-zero failure count reduces to `Partial`.
/// - Anything that does not parse into the expected shape is a
///   [`ReduceError`], never a silent zero-error success.
pub fn reduce(raw: &str) -> Result<BatchOutcome, ReduceError> {
    let response: ImportResponse = serde_json::from_str(raw)
        .map_err(|e| ReduceError::MalformedResponse(e.to_string()))?;

    if !response.success {
        return Ok(BatchOutcome {
            kind: OutcomeKind::Failed,
            total_rows: 0,
            succeeded: 0,
            failed: 0,
            errors: Vec::new(),
            failure_message: response.error,
        });
    }

    let data = response.data.ok_or_else(|| {
        ReduceError::MalformedResponse(
            "success response carried no data payload".to_string(),
        )
    })?;

    let kind = if data.nombre_erreurs > 0 {
        OutcomeKind::Partial
    } else {
        OutcomeKind::Success
    };

    Ok(BatchOutcome {
        kind,
        total_rows: data
            .nombre_lignes
            .unwrap_or(data.nombre_succes + data.nombre_erreurs),
        succeeded: data.nombre_succes,
        failed: data.nombre_erreurs,
        errors: data.erreurs,
        failure_message: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_success() {
        let raw = r#"{
            "success": true,
            "data": {"nombre_lignes": 10, "nombre_succes": 10, "nombre_erreurs": 0, "erreurs": []}
        }"#;

        let outcome = reduce(raw).unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert_eq!(outcome.total_rows, 10);
        assert_eq!(outcome.succeeded, 10);
        assert_eq!(outcome.failed, 0);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_partial_success_preserves_error_order() {
        let raw = r#"{
            "success": true,
            "data": {
                "nombre_lignes": 10,
                "nombre_succes": 7,
                "nombre_erreurs": 3,
                "erreurs": ["row 4: bad date", "row 5: missing field", "row 9: duplicate"]
            }
        }"#;

        let outcome = reduce(raw).unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Partial);
        assert_eq!(outcome.succeeded, 7);
        assert_eq!(outcome.failed, 3);
        assert_eq!(
            outcome.errors,
            vec!["row 4: bad date", "row 5: missing field", "row 9: duplicate"]
        );
    }

    #[test]
    fn test_failure_flag_wins_over_counts() {
        // Row counts claim success, but the overall flag is false: a
        // structurally failed batch is not partial success.
        let raw = r#"{
            "success": false,
            "error": "Feuille de calcul corrompue",
            "data": {"nombre_lignes": 10, "nombre_succes": 10, "nombre_erreurs": 0, "erreurs": []}
        }"#;

        let outcome = reduce(raw).unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Failed);
        assert_eq!(
            outcome.failure_message.as_deref(),
            Some("Feuille de calcul corrompue")
        );
        assert!(!outcome.imported_anything());
    }

    #[test]
    fn test_success_without_data_is_malformed() {
        let err = reduce(r#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, ReduceError::MalformedResponse(_)));
    }

    #[test]
    fn test_non_json_is_malformed() {
        let err = reduce("<html>ok</html>").unwrap_err();
        assert!(matches!(err, ReduceError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_line_count_derived_from_tally() {
        // The older upload endpoint omits nombre_lignes.
        let raw = r#"{
            "success": true,
            "data": {"nombre_succes": 15, "nombre_erreurs": 0}
        }"#;

        let outcome = reduce(raw).unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Success);
        assert_eq!(outcome.total_rows, 15);
    }

    #[test]
    fn test_silently_skipped_rows_tolerated() {
        // succeeded + failed < total: the server skipped rows without
        // reporting them; the outcome must carry the counts as-is.
        let raw = r#"{
            "success": true,
            "data": {"nombre_lignes": 12, "nombre_succes": 7, "nombre_erreurs": 3,
                     "erreurs": ["a", "b", "c"]}
        }"#;

        let outcome = reduce(raw).unwrap();
        assert_eq!(outcome.total_rows, 12);
        assert_eq!(outcome.succeeded + outcome.failed, 10);
    }

    #[test]
    fn test_partial_with_count_but_empty_error_list() {
        // Failure count and message list can disagree; the count decides
        // the kind.
        let raw = r#"{
            "success": true,
            "data": {"nombre_lignes": 5, "nombre_succes": 4, "nombre_erreurs": 1, "erreurs": []}
        }"#;

        let outcome = reduce(raw).unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Partial);
        assert!(outcome.errors.is_empty());
    }
}
