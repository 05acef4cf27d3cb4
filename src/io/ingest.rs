//! CSV catalog ingest and normalization.
//!
//! This module turns a catalog CSV into typed catalog rows.
//!
//! Design goals:
//! - **Strict schema** for required columns (every missing column named in one error)
//! - **All-or-nothing**: one bad row fails the whole import, so no partial tables
//! - **Verbatim extras**: unknown columns are carried through, blank cells become "无"
//! - **Separation of concerns**: no lookup or calculation logic here

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::StringRecord;

use crate::catalog::{CatalogRow, ColumnSpec, normalize_text};
use crate::error::IngestError;

/// Parsed catalog content, ready to be swapped in.
#[derive(Debug, Clone)]
pub struct ParsedCatalog<R> {
    pub rows: Vec<R>,
    pub extra_columns: Vec<String>,
}

/// Read a catalog file into memory.
pub fn read_catalog_file(path: &Path) -> Result<Vec<u8>, IngestError> {
    fs::read(path).map_err(|e| IngestError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse CSV bytes into catalog rows of type `R`.
pub fn parse_catalog<R: CatalogRow>(bytes: &[u8]) -> Result<ParsedCatalog<R>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Header { message: e.to_string() })?
        .clone();

    let header_map = build_header_map(&headers);
    let columns = resolve_columns::<R>(&header_map)?;

    // Every header not claimed by a known column is an extra, kept in file order.
    let claimed: Vec<usize> = columns.values().copied().collect();
    let extra_indices: Vec<usize> = (0..headers.len()).filter(|idx| !claimed.contains(idx)).collect();
    let extra_columns: Vec<String> = extra_indices
        .iter()
        .map(|&idx| clean_header(headers.get(idx).unwrap_or_default()).to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;

        let record = result.map_err(|e| IngestError::Row {
            line,
            message: format!("CSV parse error: {e}"),
        })?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let cells = RowCells {
            record: &record,
            columns: &columns,
        };
        let extra = extra_indices
            .iter()
            .map(|&i| normalize_text(record.get(i)))
            .collect();

        let row = R::from_cells(&cells, extra).map_err(|message| IngestError::Row { line, message })?;
        rows.push(row);
    }

    Ok(ParsedCatalog { rows, extra_columns })
}

/// Cell accessor for one record, keyed by catalog column.
pub struct RowCells<'a> {
    record: &'a StringRecord,
    columns: &'a HashMap<&'static str, usize>,
}

impl RowCells<'_> {
    fn raw(&self, column: &ColumnSpec) -> Option<&str> {
        let idx = self.columns.get(column.header)?;
        self.record.get(*idx)
    }

    /// Normalized text; blank, missing or NaN-like cells become "无".
    pub fn text(&self, column: &ColumnSpec) -> String {
        normalize_text(self.raw(column))
    }

    /// `None` when the column is absent from the file, normalized text otherwise.
    pub fn optional_text(&self, column: &ColumnSpec) -> Option<String> {
        if !self.columns.contains_key(column.header) {
            return None;
        }
        Some(self.text(column))
    }

    /// A finite, non-negative number. Blank cells yield `None`.
    pub fn number(&self, column: &ColumnSpec) -> Result<Option<f64>, String> {
        let Some(raw) = self.raw(column).map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let value = raw
            .parse::<f64>()
            .map_err(|_| format!("Invalid `{}` value '{raw}' (expected a number).", column.header))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!(
                "Invalid `{}` value '{raw}' (must be finite and >= 0).",
                column.header
            ));
        }
        Ok(Some(value))
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn clean_header(name: &str) -> &str {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    name.trim().trim_start_matches('\u{feff}')
}

fn normalize_header_name(name: &str) -> String {
    clean_header(name).to_lowercase()
}

/// Map each known column of `R` to its index, failing with all missing required columns.
fn resolve_columns<R: CatalogRow>(
    header_map: &HashMap<String, usize>,
) -> Result<HashMap<&'static str, usize>, IngestError> {
    let mut resolved = HashMap::new();
    let mut missing = Vec::new();

    for column in R::columns() {
        let found = std::iter::once(column.header)
            .chain(column.aliases.iter().copied())
            .find_map(|name| header_map.get(&name.to_lowercase()).copied());

        match found {
            Some(idx) => {
                resolved.insert(column.header, idx);
            }
            None if column.required => missing.push(column.header),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(IngestError::MissingColumns {
            catalog: R::KIND,
            columns: missing,
        });
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DiagnosisRow, DipWeightRow, ProcedureRow};
    use crate::domain::CatalogKind;

    #[test]
    fn parses_dip_rows_with_optional_columns() {
        let csv = "\
序号,DIP编码,DIP名称,病种类型,诊断编码,诊断名称,操作编码,操作名称,病例数,入组的DIP基准分值
1,B11.0S001,高血压病-手术组01,核心病种,I10,特发性高血压,无,无,1000,15.5
2,H25.0S002,老年性初期白内障-手术组02,基层病种,H25.0,老年性初期白内障,13.4100x001,白内障超声乳化抽吸术,7568.0,78.0521
";
        let parsed = parse_catalog::<DipWeightRow>(csv.as_bytes()).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert!(parsed.extra_columns.is_empty());

        let row = &parsed.rows[1];
        assert_eq!(row.seq.as_deref(), Some("2"));
        assert_eq!(row.dip_code.as_deref(), Some("H25.0S002"));
        assert_eq!(row.procedure_name, "白内障超声乳化抽吸术");
        assert_eq!(row.case_count.as_deref(), Some("7568.0"));
        assert!((row.base_weight - 78.0521).abs() < 1e-12);
    }

    #[test]
    fn accepts_english_aliases_and_bom() {
        let csv = "\u{feff}Diagnosis_Code,diagnosis_name\nI10,特发性高血压\n";
        let parsed = parse_catalog::<DiagnosisRow>(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0].code, "I10");
        assert_eq!(parsed.rows[0].name, "特发性高血压");
    }

    #[test]
    fn reports_every_missing_column_at_once() {
        let csv = "操作编码,备注\n36.06,x\n";
        let err = parse_catalog::<ProcedureRow>(csv.as_bytes()).unwrap_err();

        assert_eq!(
            err,
            IngestError::MissingColumns {
                catalog: CatalogKind::Procedure,
                columns: vec!["操作名称", "操作类别"],
            }
        );
        let message = err.to_string();
        assert!(message.contains("操作名称"));
        assert!(message.contains("操作类别"));
    }

    #[test]
    fn blank_cells_normalize_to_none_label() {
        let csv = "操作编码,操作名称,操作类别\n88.01,胸部X线检查,\n54.11,nan,手术\n";
        let parsed = parse_catalog::<ProcedureRow>(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0].category, "无");
        assert_eq!(parsed.rows[1].name, "无");
    }

    #[test]
    fn bad_base_weight_names_line_and_column() {
        let csv = "诊断名称,诊断编码,操作名称,操作编码,入组的DIP基准分值\n肺炎,J18.900,无,无,-3\n";
        let err = parse_catalog::<DipWeightRow>(csv.as_bytes()).unwrap_err();
        match err {
            IngestError::Row { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("入组的DIP基准分值"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_base_weight_is_rejected() {
        let csv = "诊断名称,诊断编码,操作名称,操作编码,入组的DIP基准分值\n肺炎,J18.900,无,无,\n";
        assert!(parse_catalog::<DipWeightRow>(csv.as_bytes()).is_err());
    }

    #[test]
    fn skips_fully_blank_lines() {
        let csv = "诊断编码,诊断名称\nI10,特发性高血压\n,\nR50.900,发热\n";
        let parsed = parse_catalog::<DiagnosisRow>(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 2);
    }

    #[test]
    fn display_columns_are_kept_as_text() {
        let csv = "序号,诊断名称,诊断编码,操作名称,操作编码,病例数,入组的DIP基准分值\n-,肺炎,J18.900,无,无,\"1,000\",9.5\n,发热,R50.900,无,无,10.5,3\n";
        let parsed = parse_catalog::<DipWeightRow>(csv.as_bytes()).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].seq.as_deref(), Some("-"));
        assert_eq!(parsed.rows[0].case_count.as_deref(), Some("1,000"));
        assert_eq!(parsed.rows[0].base_weight, 9.5);
        assert_eq!(parsed.rows[1].seq.as_deref(), Some("无"));
        assert_eq!(parsed.rows[1].case_count.as_deref(), Some("10.5"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_catalog_file(Path::new("definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
