//! Session state: the catalogs in use and the last calculation result.
//!
//! A `Session` is owned by one front-end (a CLI invocation or the TUI) and
//! passed around explicitly; nothing here is global.

use std::path::Path;

use crate::app::pipeline::{CalcOutput, CalcRequest, run_calc};
use crate::catalog::{CatalogSet, ImportOutcome};
use crate::config::Config;
use crate::domain::CatalogKind;
use crate::error::AppError;
use crate::io::ingest::read_catalog_file;

#[derive(Debug, Clone, Default)]
pub struct Session {
    catalogs: CatalogSet,
    last: Option<CalcOutput>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with the built-in catalogs, replaced by any configured catalog files.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let mut session = Self::new();
        for kind in CatalogKind::ALL {
            if let Some(path) = config.catalog_path(kind) {
                session.import_file(kind, path)?;
            }
        }
        Ok(session)
    }

    pub fn catalogs(&self) -> &CatalogSet {
        &self.catalogs
    }

    /// Result of the last successful calculation, if any.
    pub fn last(&self) -> Option<&CalcOutput> {
        self.last.as_ref()
    }

    /// Replace one catalog from a CSV file.
    ///
    /// Any failure (unreadable file, missing columns, bad row) leaves the
    /// current catalog in place.
    pub fn import_file(&mut self, kind: CatalogKind, path: &Path) -> Result<ImportOutcome, AppError> {
        let path = crate::cli::picker::validate_csv_path(path)?;
        let bytes = read_catalog_file(&path)?;
        let outcome = self.import_bytes(kind, &bytes)?;
        log::info!(
            "{}: {} from '{}' ({} rows)",
            kind.display_name(),
            match outcome {
                ImportOutcome::Replaced { .. } => "imported",
                ImportOutcome::Unchanged { .. } => "unchanged",
            },
            path.display(),
            outcome.rows()
        );
        Ok(outcome)
    }

    pub fn import_bytes(&mut self, kind: CatalogKind, bytes: &[u8]) -> Result<ImportOutcome, AppError> {
        Ok(self.catalogs.replace_from_csv(kind, bytes)?)
    }

    /// Run a calculation and keep its result.
    ///
    /// On error the previous result is kept.
    pub fn calculate(&mut self, request: &CalcRequest) -> Result<&CalcOutput, AppError> {
        let output = run_calc(&self.catalogs, request)?;
        Ok(self.last.insert(output))
    }
}
