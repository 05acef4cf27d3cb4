//! Reference catalogs: diagnoses, procedures and DIP weight groups.
//!
//! Each catalog is an immutable table of typed rows. Replacing a catalog is a
//! whole-table swap: the new table is fully parsed before anything changes,
//! so a failed import leaves the previous table in place.

use std::hash::{DefaultHasher, Hasher};

use serde::{Deserialize, Serialize};

use crate::domain::{CatalogKind, NONE_LABEL};
use crate::error::IngestError;
use crate::io::ingest::{RowCells, parse_catalog};

pub mod defaults;
pub mod lookup;

pub use lookup::*;

/// A catalog column: canonical header plus accepted aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub header: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

impl ColumnSpec {
    const fn required(header: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            header,
            aliases,
            required: true,
        }
    }

    const fn optional(header: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            header,
            aliases,
            required: false,
        }
    }
}

pub const COL_DIAGNOSIS_CODE: ColumnSpec = ColumnSpec::required("诊断编码", &["diagnosis_code"]);
pub const COL_DIAGNOSIS_NAME: ColumnSpec = ColumnSpec::required("诊断名称", &["diagnosis_name"]);
pub const COL_PROCEDURE_CODE: ColumnSpec = ColumnSpec::required("操作编码", &["procedure_code"]);
pub const COL_PROCEDURE_NAME: ColumnSpec = ColumnSpec::required("操作名称", &["procedure_name"]);
pub const COL_PROCEDURE_CATEGORY: ColumnSpec = ColumnSpec::required("操作类别", &["procedure_category"]);
pub const COL_BASE_WEIGHT: ColumnSpec = ColumnSpec::required("入组的DIP基准分值", &["base_weight"]);
pub const COL_SEQ: ColumnSpec = ColumnSpec::optional("序号", &["seq"]);
pub const COL_DIP_CODE: ColumnSpec = ColumnSpec::optional("DIP编码", &["dip_code"]);
pub const COL_DIP_NAME: ColumnSpec = ColumnSpec::optional("DIP名称", &["dip_name"]);
pub const COL_GROUP_TYPE: ColumnSpec = ColumnSpec::optional("病种类型", &["group_type"]);
pub const COL_CASE_COUNT: ColumnSpec = ColumnSpec::optional("病例数", &["case_count"]);

/// A typed catalog row that can be built from a CSV record and displayed as a table row.
pub trait CatalogRow: Sized + Clone {
    const KIND: CatalogKind;

    /// Known columns in display order.
    fn columns() -> &'static [ColumnSpec];

    /// Build a row from one record. `extra` holds unknown columns, in file order.
    fn from_cells(cells: &RowCells<'_>, extra: Vec<String>) -> Result<Self, String>;

    /// Display cells aligned with `columns()`.
    fn cells(&self) -> Vec<String>;

    fn extra(&self) -> &[String];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRow {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub extra: Vec<String>,
}

impl CatalogRow for DiagnosisRow {
    const KIND: CatalogKind = CatalogKind::Diagnosis;

    fn columns() -> &'static [ColumnSpec] {
        static COLUMNS: [ColumnSpec; 2] = [COL_DIAGNOSIS_CODE, COL_DIAGNOSIS_NAME];
        &COLUMNS
    }

    fn from_cells(cells: &RowCells<'_>, extra: Vec<String>) -> Result<Self, String> {
        Ok(Self {
            code: cells.text(&COL_DIAGNOSIS_CODE),
            name: cells.text(&COL_DIAGNOSIS_NAME),
            extra,
        })
    }

    fn cells(&self) -> Vec<String> {
        vec![self.code.clone(), self.name.clone()]
    }

    fn extra(&self) -> &[String] {
        &self.extra
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureRow {
    pub code: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub extra: Vec<String>,
}

impl CatalogRow for ProcedureRow {
    const KIND: CatalogKind = CatalogKind::Procedure;

    fn columns() -> &'static [ColumnSpec] {
        static COLUMNS: [ColumnSpec; 3] = [COL_PROCEDURE_CODE, COL_PROCEDURE_NAME, COL_PROCEDURE_CATEGORY];
        &COLUMNS
    }

    fn from_cells(cells: &RowCells<'_>, extra: Vec<String>) -> Result<Self, String> {
        Ok(Self {
            code: cells.text(&COL_PROCEDURE_CODE),
            name: cells.text(&COL_PROCEDURE_NAME),
            category: cells.text(&COL_PROCEDURE_CATEGORY),
            extra,
        })
    }

    fn cells(&self) -> Vec<String> {
        vec![self.code.clone(), self.name.clone(), self.category.clone()]
    }

    fn extra(&self) -> &[String] {
        &self.extra
    }
}

/// One DIP weight group: a (diagnosis, procedure) pair and its base weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DipWeightRow {
    /// Display-only columns keep their cell text.
    pub seq: Option<String>,
    pub dip_code: Option<String>,
    pub dip_name: Option<String>,
    pub group_type: Option<String>,
    pub diagnosis_code: String,
    pub diagnosis_name: String,
    /// "无" when the group has no procedure.
    pub procedure_code: String,
    pub procedure_name: String,
    pub case_count: Option<String>,
    pub base_weight: f64,
    #[serde(default)]
    pub extra: Vec<String>,
}

impl CatalogRow for DipWeightRow {
    const KIND: CatalogKind = CatalogKind::Dip;

    fn columns() -> &'static [ColumnSpec] {
        static COLUMNS: [ColumnSpec; 10] = [
            COL_SEQ,
            COL_DIP_CODE,
            COL_DIP_NAME,
            COL_GROUP_TYPE,
            COL_DIAGNOSIS_CODE,
            COL_DIAGNOSIS_NAME,
            COL_PROCEDURE_CODE,
            COL_PROCEDURE_NAME,
            COL_CASE_COUNT,
            COL_BASE_WEIGHT,
        ];
        &COLUMNS
    }

    fn from_cells(cells: &RowCells<'_>, extra: Vec<String>) -> Result<Self, String> {
        let base_weight = cells
            .number(&COL_BASE_WEIGHT)?
            .ok_or_else(|| format!("Missing required value: `{}`", COL_BASE_WEIGHT.header))?;

        Ok(Self {
            seq: cells.optional_text(&COL_SEQ),
            dip_code: cells.optional_text(&COL_DIP_CODE),
            dip_name: cells.optional_text(&COL_DIP_NAME),
            group_type: cells.optional_text(&COL_GROUP_TYPE),
            diagnosis_code: cells.text(&COL_DIAGNOSIS_CODE),
            diagnosis_name: cells.text(&COL_DIAGNOSIS_NAME),
            procedure_code: cells.text(&COL_PROCEDURE_CODE),
            procedure_name: cells.text(&COL_PROCEDURE_NAME),
            case_count: cells.optional_text(&COL_CASE_COUNT),
            base_weight,
            extra,
        })
    }

    fn cells(&self) -> Vec<String> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        vec![
            opt(&self.seq),
            opt(&self.dip_code),
            opt(&self.dip_name),
            opt(&self.group_type),
            self.diagnosis_code.clone(),
            self.diagnosis_name.clone(),
            self.procedure_code.clone(),
            self.procedure_name.clone(),
            opt(&self.case_count),
            format!("{:.4}", self.base_weight),
        ]
    }

    fn extra(&self) -> &[String] {
        &self.extra
    }
}

/// Identifies the content a catalog was loaded from.
///
/// `revision` counts replacements (0 = built-in defaults); `digest` hashes the
/// imported bytes so re-importing the same file is detected without relying
/// on file identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogVersion {
    pub revision: u32,
    pub digest: u64,
}

/// What happened when a file was offered to a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The table was swapped; `rows` were imported.
    Replaced { rows: usize },
    /// Same content as the current table; nothing changed.
    Unchanged { rows: usize },
}

impl ImportOutcome {
    pub fn rows(self) -> usize {
        match self {
            ImportOutcome::Replaced { rows } | ImportOutcome::Unchanged { rows } => rows,
        }
    }
}

/// An immutable table of typed rows plus any extra columns carried verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog<R> {
    pub rows: Vec<R>,
    pub extra_columns: Vec<String>,
    pub version: CatalogVersion,
}

impl<R: CatalogRow> Catalog<R> {
    pub fn from_rows(rows: Vec<R>) -> Self {
        Self {
            rows,
            extra_columns: Vec::new(),
            version: CatalogVersion::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row for display: known columns, then extra columns.
    pub fn headers(&self) -> Vec<String> {
        R::columns()
            .iter()
            .map(|c| c.header.to_string())
            .chain(self.extra_columns.iter().cloned())
            .collect()
    }

    /// Display rows aligned with `headers()`.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let mut cells = r.cells();
                cells.extend(r.extra().iter().cloned());
                cells
            })
            .collect()
    }

    /// Replace the whole table from CSV bytes.
    ///
    /// On error the current table is untouched.
    pub fn replace_from_csv(&mut self, bytes: &[u8]) -> Result<ImportOutcome, IngestError> {
        let digest = content_digest(bytes);
        if self.version.revision > 0 && self.version.digest == digest {
            return Ok(ImportOutcome::Unchanged { rows: self.rows.len() });
        }

        let parsed = parse_catalog::<R>(bytes)?;
        let rows = parsed.rows.len();

        *self = Catalog {
            rows: parsed.rows,
            extra_columns: parsed.extra_columns,
            version: CatalogVersion {
                revision: self.version.revision + 1,
                digest,
            },
        };

        Ok(ImportOutcome::Replaced { rows })
    }
}

/// The three catalogs of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSet {
    pub dip: Catalog<DipWeightRow>,
    pub procedures: Catalog<ProcedureRow>,
    pub diagnoses: Catalog<DiagnosisRow>,
}

impl Default for CatalogSet {
    fn default() -> Self {
        Self {
            dip: Catalog::from_rows(defaults::dip_rows()),
            procedures: Catalog::from_rows(defaults::procedure_rows()),
            diagnoses: Catalog::from_rows(defaults::diagnosis_rows()),
        }
    }
}

impl CatalogSet {
    /// Replace one catalog from CSV bytes.
    pub fn replace_from_csv(&mut self, kind: CatalogKind, bytes: &[u8]) -> Result<ImportOutcome, IngestError> {
        match kind {
            CatalogKind::Dip => self.dip.replace_from_csv(bytes),
            CatalogKind::Procedure => self.procedures.replace_from_csv(bytes),
            CatalogKind::Diagnosis => self.diagnoses.replace_from_csv(bytes),
        }
    }

    pub fn version(&self, kind: CatalogKind) -> CatalogVersion {
        match kind {
            CatalogKind::Dip => self.dip.version,
            CatalogKind::Procedure => self.procedures.version,
            CatalogKind::Diagnosis => self.diagnoses.version,
        }
    }

    pub fn len(&self, kind: CatalogKind) -> usize {
        match kind {
            CatalogKind::Dip => self.dip.len(),
            CatalogKind::Procedure => self.procedures.len(),
            CatalogKind::Diagnosis => self.diagnoses.len(),
        }
    }

    /// Header + rows of one catalog, for table rendering.
    pub fn table(&self, kind: CatalogKind) -> (Vec<String>, Vec<Vec<String>>) {
        match kind {
            CatalogKind::Dip => (self.dip.headers(), self.dip.table_rows()),
            CatalogKind::Procedure => (self.procedures.headers(), self.procedures.table_rows()),
            CatalogKind::Diagnosis => (self.diagnoses.headers(), self.diagnoses.table_rows()),
        }
    }
}

/// Normalize a textual cell: blank or NaN-like values become "无".
pub fn normalize_text(value: Option<&str>) -> String {
    let Some(value) = value else {
        return NONE_LABEL.to_string();
    };
    let trimmed = value.trim();
    if trimmed.is_empty() || is_nan_like(trimmed) {
        NONE_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn is_nan_like(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "nan" | "none" | "null" | "n/a" | "na" | "<na>"
    )
}

fn content_digest(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(bytes);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIP_CSV: &str = "\
诊断名称,诊断编码,操作名称,操作编码,入组的DIP基准分值
特发性高血压,I10,,,15.5
肺炎,J18.900,胸部X线检查,88.01,9.8
";

    #[test]
    fn normalize_text_maps_blank_and_nan() {
        assert_eq!(normalize_text(None), "无");
        assert_eq!(normalize_text(Some("  ")), "无");
        assert_eq!(normalize_text(Some("NaN")), "无");
        assert_eq!(normalize_text(Some("null")), "无");
        assert_eq!(normalize_text(Some(" 手术 ")), "手术");
    }

    #[test]
    fn replace_swaps_table_and_bumps_revision() {
        let mut set = CatalogSet::default();
        let outcome = set.replace_from_csv(CatalogKind::Dip, DIP_CSV.as_bytes()).unwrap();

        assert_eq!(outcome, ImportOutcome::Replaced { rows: 2 });
        assert_eq!(set.dip.len(), 2);
        assert_eq!(set.dip.version.revision, 1);
        assert_eq!(set.dip.rows[0].procedure_name, "无");
        assert_eq!(set.dip.rows[0].dip_code, None);
    }

    #[test]
    fn non_numeric_display_columns_do_not_block_import() {
        let mut set = CatalogSet::default();
        let csv = "序号,诊断名称,诊断编码,操作名称,操作编码,病例数,入组的DIP基准分值\n\
                   -,肺炎,J18.900,无,无,\"1,000\",9.5\n";

        let outcome = set.replace_from_csv(CatalogKind::Dip, csv.as_bytes()).unwrap();
        assert_eq!(outcome, ImportOutcome::Replaced { rows: 1 });

        let row = &set.dip.rows[0];
        assert_eq!(row.seq.as_deref(), Some("-"));
        assert_eq!(row.case_count.as_deref(), Some("1,000"));
        assert_eq!(row.base_weight, 9.5);

        let (_, rows) = set.table(CatalogKind::Dip);
        assert_eq!(rows[0][0], "-");
        assert_eq!(rows[0][8], "1,000");
    }

    #[test]
    fn reimport_of_same_content_is_unchanged() {
        let mut set = CatalogSet::default();
        set.replace_from_csv(CatalogKind::Dip, DIP_CSV.as_bytes()).unwrap();
        let version = set.version(CatalogKind::Dip);

        let outcome = set.replace_from_csv(CatalogKind::Dip, DIP_CSV.as_bytes()).unwrap();
        assert_eq!(outcome, ImportOutcome::Unchanged { rows: 2 });
        assert_eq!(set.version(CatalogKind::Dip), version);
    }

    #[test]
    fn missing_base_weight_keeps_previous_catalog() {
        let mut set = CatalogSet::default();
        let before = set.dip.clone();

        let csv = "诊断名称,诊断编码,操作名称,操作编码\n特发性高血压,I10,无,无\n";
        let err = set.replace_from_csv(CatalogKind::Dip, csv.as_bytes()).unwrap_err();

        match err {
            IngestError::MissingColumns { catalog, columns } => {
                assert_eq!(catalog, CatalogKind::Dip);
                assert_eq!(columns, vec!["入组的DIP基准分值"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(set.dip, before);
    }

    #[test]
    fn bad_row_keeps_previous_catalog() {
        let mut set = CatalogSet::default();
        let before = set.dip.clone();

        let csv = "诊断名称,诊断编码,操作名称,操作编码,入组的DIP基准分值\n\
                   特发性高血压,I10,无,无,15.5\n\
                   肺炎,J18.900,无,无,abc\n";
        assert!(set.replace_from_csv(CatalogKind::Dip, csv.as_bytes()).is_err());
        assert_eq!(set.dip, before);
    }

    #[test]
    fn headers_include_extra_columns() {
        let mut set = CatalogSet::default();
        let csv = "诊断编码,诊断名称,备注\nI10,特发性高血压,\n";
        set.replace_from_csv(CatalogKind::Diagnosis, csv.as_bytes()).unwrap();

        let (headers, rows) = set.table(CatalogKind::Diagnosis);
        assert_eq!(headers, vec!["诊断编码", "诊断名称", "备注"]);
        assert_eq!(rows, vec![vec!["I10", "特发性高血压", "无"]]);
    }

    #[test]
    fn defaults_are_revision_zero() {
        let set = CatalogSet::default();
        for kind in CatalogKind::ALL {
            assert_eq!(set.version(kind).revision, 0);
            assert!(set.len(kind) > 0);
        }
    }
}
