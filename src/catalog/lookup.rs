//! Diagnosis/procedure selection and base-weight resolution.
//!
//! Resolution rules:
//! - either selection not yet chosen → fallback weight
//! - otherwise the first DIP row (catalog order) whose diagnosis name and
//!   normalized procedure name match exactly
//! - no matching row → fallback weight (a lookup miss, not an error)

use serde::{Deserialize, Serialize};

use super::{Catalog, DipWeightRow, ProcedureRow, normalize_text};
use crate::domain::{FALLBACK_BASE_WEIGHT, NONE_LABEL};

/// A diagnosis or procedure choice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Selection {
    /// Placeholder: nothing picked yet.
    #[default]
    Unchosen,
    /// "无操作": the case has no procedure. Matches rows whose procedure is "无".
    NoProcedure,
    Named(String),
}

impl Selection {
    /// Parse a diagnosis: empty → unchosen, anything else is a name.
    ///
    /// "无" stays a name here; a DIP row with a blank diagnosis cell is listed under it.
    pub fn parse_diagnosis(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Selection::Unchosen;
        }
        Selection::Named(trimmed.to_string())
    }

    /// Parse a procedure: empty → unchosen, "无"/"none"/"无操作" → no procedure.
    pub fn parse_procedure(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Selection::Unchosen;
        }
        if matches!(trimmed, "无" | "无操作") || trimmed.eq_ignore_ascii_case("none") {
            return Selection::NoProcedure;
        }
        Selection::Named(trimmed.to_string())
    }

    /// Label as shown in selection lists.
    pub fn label(&self) -> &str {
        match self {
            Selection::Unchosen => "请选择...",
            Selection::NoProcedure => "无操作",
            Selection::Named(name) => name,
        }
    }

    /// Procedure name this selection matches in the DIP catalog.
    fn procedure_key(&self) -> Option<&str> {
        match self {
            Selection::Unchosen => None,
            Selection::NoProcedure => Some(NONE_LABEL),
            Selection::Named(name) => Some(name),
        }
    }
}

/// Why the fallback weight was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Diagnosis or procedure still at the placeholder.
    Unselected,
    /// No catalog row matches the selection.
    NoMatch,
}

/// Outcome of base-weight resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightResolution {
    /// `row` is the index of the first matching DIP catalog row.
    Matched { row: usize, base_weight: f64 },
    Fallback { reason: FallbackReason },
}

impl WeightResolution {
    pub fn base_weight(&self) -> f64 {
        match self {
            WeightResolution::Matched { base_weight, .. } => *base_weight,
            WeightResolution::Fallback { .. } => FALLBACK_BASE_WEIGHT,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, WeightResolution::Matched { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            WeightResolution::Matched { row, base_weight } => {
                format!("matched catalog row {} (base weight {base_weight:.4})", row + 1)
            }
            WeightResolution::Fallback {
                reason: FallbackReason::Unselected,
            } => format!("no selection; default base weight {FALLBACK_BASE_WEIGHT:.4}"),
            WeightResolution::Fallback {
                reason: FallbackReason::NoMatch,
            } => format!("no catalog match; default base weight {FALLBACK_BASE_WEIGHT:.4}"),
        }
    }
}

/// Resolve the base weight for a diagnosis/procedure selection.
pub fn resolve_base_weight(
    catalog: &Catalog<DipWeightRow>,
    diagnosis: &Selection,
    procedure: &Selection,
) -> WeightResolution {
    let (Selection::Named(diagnosis), Some(procedure)) = (diagnosis, procedure.procedure_key()) else {
        return WeightResolution::Fallback {
            reason: FallbackReason::Unselected,
        };
    };

    let found = catalog.rows.iter().enumerate().find(|(_, row)| {
        row.diagnosis_name == *diagnosis && normalize_text(Some(&row.procedure_name)) == procedure
    });

    match found {
        Some((idx, row)) => WeightResolution::Matched {
            row: idx,
            base_weight: row.base_weight,
        },
        None => {
            log::debug!("no DIP group for diagnosis '{diagnosis}' / procedure '{procedure}'");
            WeightResolution::Fallback {
                reason: FallbackReason::NoMatch,
            }
        }
    }
}

/// Distinct diagnosis names in first-seen catalog order.
pub fn diagnosis_options(catalog: &Catalog<DipWeightRow>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for row in &catalog.rows {
        if !out.contains(&row.diagnosis_name) {
            out.push(row.diagnosis_name.clone());
        }
    }
    out
}

/// Procedure choices for a diagnosis.
///
/// Always starts with `NoProcedure`, followed by the distinct non-"无"
/// procedure names of rows sharing the diagnosis, in first-seen order.
pub fn procedure_options(catalog: &Catalog<DipWeightRow>, diagnosis: &Selection) -> Vec<Selection> {
    let mut out = vec![Selection::NoProcedure];
    let Selection::Named(diagnosis) = diagnosis else {
        return out;
    };

    for row in catalog.rows.iter().filter(|r| r.diagnosis_name == *diagnosis) {
        let name = normalize_text(Some(&row.procedure_name));
        if name == NONE_LABEL {
            continue;
        }
        let option = Selection::Named(name);
        if !out.contains(&option) {
            out.push(option);
        }
    }
    out
}

/// Category of a procedure from the procedure catalog, if listed.
pub fn procedure_category<'a>(catalog: &'a Catalog<ProcedureRow>, procedure: &Selection) -> Option<&'a str> {
    let Selection::Named(name) = procedure else {
        return None;
    };
    catalog
        .rows
        .iter()
        .find(|r| r.name == *name)
        .map(|r| r.category.as_str())
}
