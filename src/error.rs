use std::path::PathBuf;

use thiserror::Error;

use crate::model::SourceKind;

/// Failures that abort an ingest run before any catalog is written.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no dated data folder (YYYY-MM-DD) found in {}", root.display())]
    NoDataFound { root: PathBuf },
    #[error("{kind} CSV file not found in {}", folder.display())]
    MissingSourceFile { kind: SourceKind, folder: PathBuf },
    #[error("could not find the '{prefix}' header row in {kind} CSV")]
    HeaderNotFound {
        kind: SourceKind,
        prefix: &'static str,
    },
}

/// Catalog file contents that break the catalog invariants.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog item '{name}' has purine level {level} inconsistent with {purines} mg/100g")]
    InconsistentLevel {
        name: String,
        purines: u32,
        level: &'static str,
    },
    #[error("catalog contains duplicate name '{0}'")]
    DuplicateName(String),
    #[error("catalog contains an item with an empty name")]
    EmptyName,
}
