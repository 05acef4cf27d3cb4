//! Read/write result snapshot JSON files.
//!
//! A snapshot is the portable record of one calculation:
//! - the request (every form value, including selections)
//! - how the base weight was resolved
//! - engine inputs and derived metrics
//!
//! `dip report --snapshot` re-renders it without the catalogs.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::app::pipeline::CalcOutput;
use crate::error::{AppError, EXIT_INPUT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    pub tool: String,
    pub generated_at: NaiveDateTime,
    pub output: CalcOutput,
}

impl ResultSnapshot {
    pub fn new(output: CalcOutput) -> Self {
        Self {
            tool: "dip".to_string(),
            generated_at: chrono::Local::now().naive_local(),
            output,
        }
    }
}

/// Write a snapshot JSON file.
pub fn write_result_json(path: &Path, output: &CalcOutput) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create snapshot JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, &ResultSnapshot::new(output.clone()))
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write snapshot JSON: {e}")))?;

    Ok(())
}

/// Read a snapshot JSON file.
pub fn read_result_json(path: &Path) -> Result<ResultSnapshot, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open snapshot JSON '{}': {e}", path.display()),
        )
    })?;
    let snapshot: ResultSnapshot = serde_json::from_reader(file)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid snapshot JSON: {e}")))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{CalcRequest, run_calc};
    use crate::catalog::{CatalogSet, Selection};

    #[test]
    fn snapshot_json_keeps_selection_and_resolution() {
        let request = CalcRequest {
            diagnosis: Selection::Named("特发性高血压".to_string()),
            procedure: Selection::NoProcedure,
            ..CalcRequest::default()
        };
        let output = run_calc(&CatalogSet::default(), &request).unwrap();
        let snapshot = ResultSnapshot::new(output.clone());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"kind\":\"no_procedure\""));
        assert!(json.contains("\"kind\":\"matched\""));

        let back: ResultSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tool, "dip");
        assert_eq!(back.output.request.diagnosis, output.request.diagnosis);
        assert_eq!(back.output.request.procedure, Selection::NoProcedure);
        assert!(back.output.resolution.is_match());
        assert!((back.output.metrics.payment_standard - output.metrics.payment_standard).abs() < 1e-9);
    }

    #[test]
    fn missing_snapshot_is_an_input_error() {
        let err = read_result_json(Path::new("no/such/snapshot.json")).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }
}
