//! Shared API request/response types
//!
//! Wire contracts of the titles backend consumed by the ingestion tooling.
//! Field names follow the backend's French domain vocabulary verbatim so
//! serde maps them without rename noise.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ========================================
// Title read endpoints
// ========================================

/// One title as returned by `GET /titres/`
///
/// Only the fields the ingestion tooling renders; the backend may send
/// more, which serde ignores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitreSummary {
    /// Title UUID
    pub id: Uuid,
    /// Unique title number
    pub numero_titre: String,
    /// Title type (licence, autorisation, ...)
    #[serde(rename = "type")]
    pub type_titre: String,
    /// Holding company name
    pub entreprise_nom: String,
    /// Workflow status (approuve, en_attente, expire, ...)
    pub status: String,
    /// Expiry date (ISO 8601 date)
    pub date_expiration: Option<chrono::NaiveDate>,
    /// Annual fee in FCFA
    #[serde(default)]
    pub redevance_annuelle: Option<f64>,
}

/// Aggregate statistics from `GET /titres/statistics/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitreStatistics {
    pub total_titres: u64,
    pub titres_actifs: u64,
    pub titres_expires: u64,
    pub titres_expirant_bientot: u64,
    /// Outstanding fees amount
    #[serde(default)]
    pub redevances_en_attente: f64,
    /// Overdue fees amount
    #[serde(default)]
    pub redevances_en_retard: f64,
    /// Count of titles per type
    #[serde(default)]
    pub par_type: HashMap<String, u64>,
    /// Count of titles per status
    #[serde(default)]
    pub par_status: HashMap<String, u64>,
}

/// Urgency filter accepted by the listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitreFilter {
    Expired,
    ExpiringSoon,
    Active,
}

impl TitreFilter {
    /// Query-string value understood by the backend
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TitreFilter::Expired => "expired",
            TitreFilter::ExpiringSoon => "expiring_soon",
            TitreFilter::Active => "active",
        }
    }
}

/// Query parameters for `GET /titres/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitreQuery {
    /// Free-text search over title number, company and owner names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Restrict to one title type
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub type_titre: Option<String>,
    /// Restrict to one workflow status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Urgency filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<TitreFilter>,
}

impl TitreQuery {
    /// Render as query-string pairs, omitting unset parameters
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(type_titre) = &self.type_titre {
            pairs.push(("type", type_titre.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.as_query_value().to_string()));
        }
        pairs
    }
}

// ========================================
// Import endpoint
// ========================================

/// Row tally inside a successful import response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportData {
    /// Rows the server saw in the spreadsheet
    #[serde(default)]
    pub nombre_lignes: Option<u64>,
    /// Rows imported successfully
    pub nombre_succes: u64,
    /// Rows rejected
    pub nombre_erreurs: u64,
    /// Per-row error messages, in spreadsheet order (opaque text)
    #[serde(default)]
    pub erreurs: Vec<String>,
}

/// Top-level response of the ingestion endpoint
///
/// `success == false` means the batch failed as a whole, whatever the
/// counts say; `error` then carries the server's message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<ImportData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titre_query_to_pairs() {
        let query = TitreQuery {
            search: Some("LIC-2024".to_string()),
            type_titre: None,
            status: Some("approuve".to_string()),
            filter: Some(TitreFilter::ExpiringSoon),
        };

        let pairs = query.to_pairs();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&("search", "LIC-2024".to_string())));
        assert!(pairs.contains(&("status", "approuve".to_string())));
        assert!(pairs.contains(&("filter", "expiring_soon".to_string())));
    }

    #[test]
    fn test_empty_query_has_no_pairs() {
        assert!(TitreQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn test_import_response_deserialization() {
        let json = r#"{
            "success": true,
            "data": {
                "nombre_lignes": 10,
                "nombre_succes": 7,
                "nombre_erreurs": 3,
                "erreurs": ["ligne 4: date invalide", "ligne 5: champ manquant", "ligne 9: doublon"]
            }
        }"#;

        let response: ImportResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data.nombre_lignes, Some(10));
        assert_eq!(data.nombre_succes, 7);
        assert_eq!(data.nombre_erreurs, 3);
        assert_eq!(data.erreurs.len(), 3);
        assert_eq!(data.erreurs[0], "ligne 4: date invalide");
    }

    #[test]
    fn test_import_response_failure_shape() {
        let json = r#"{"success": false, "error": "Fichier illisible"}"#;
        let response: ImportResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("Fichier illisible"));
    }

    #[test]
    fn test_statistics_deserialization_with_missing_optionals() {
        let json = r#"{
            "total_titres": 120,
            "titres_actifs": 90,
            "titres_expires": 12,
            "titres_expirant_bientot": 8
        }"#;

        let stats: TitreStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_titres, 120);
        assert_eq!(stats.redevances_en_attente, 0.0);
        assert!(stats.par_type.is_empty());
    }
}
