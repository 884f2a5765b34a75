//! Shared REST API types for the titles backend

pub mod types;

pub use types::{
    ImportData, ImportResponse, TitreFilter, TitreQuery, TitreStatistics, TitreSummary,
};
