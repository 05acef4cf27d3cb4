//! Debug bundle writer for inspecting a session: catalogs, form and last result.

use std::fmt::Write as _;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::app::pipeline::{CalcOutput, CalcRequest, effective_base_weight};
use crate::app::session::Session;
use crate::domain::{CatalogKind, InputField};
use crate::error::{AppError, EXIT_RUNTIME};

/// Write a markdown bundle under `debug/` and return its path.
pub fn write_debug_bundle(session: &Session, form: &CalcRequest) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir).map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("dip_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to create debug file: {e}")))?;
    file.write_all(render_debug_bundle(session, form).as_bytes())
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to write debug: {e}")))?;

    Ok(path)
}

/// Markdown body of the bundle.
pub fn render_debug_bundle(session: &Session, form: &CalcRequest) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# dip debug bundle");
    let _ = writeln!(out, "- generated: {}", Local::now().to_rfc3339());

    let _ = writeln!(out, "\n## Catalogs");
    let _ = writeln!(out, "| catalog | rows | revision | digest |");
    let _ = writeln!(out, "| - | - | - | - |");
    for kind in CatalogKind::ALL {
        let version = session.catalogs().version(kind);
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:016x} |",
            kind.display_name(),
            session.catalogs().len(kind),
            version.revision,
            version.digest
        );
    }

    let _ = writeln!(out, "\n## Form");
    write_request(&mut out, form);
    let (resolution, base_weight) = effective_base_weight(session.catalogs(), form);
    let _ = writeln!(out, "- resolution: {}", resolution.describe());
    let _ = writeln!(out, "- effective base weight: {base_weight:.4}");

    let _ = writeln!(out, "\n## Last result");
    match session.last() {
        Some(output) => write_output(&mut out, output),
        None => {
            let _ = writeln!(out, "(no calculation yet)");
        }
    }

    out
}

fn write_request(out: &mut String, request: &CalcRequest) {
    for field in InputField::ALL {
        let Some(value) = request.value(field) else {
            continue;
        };
        let _ = writeln!(out, "- {} ({}): {:.*}", field.name(), field.label(), field.decimals(), value);
    }
    let _ = writeln!(out, "- pool: {}", request.pool.display_name());
    let _ = writeln!(out, "- diagnosis: {}", request.diagnosis.label());
    let _ = writeln!(out, "- procedure: {}", request.procedure.label());
    if request.base_weight_override.is_none() {
        let _ = writeln!(out, "- base weight override: -");
    }
}

fn write_output(out: &mut String, output: &CalcOutput) {
    let _ = writeln!(out, "- resolution: {}", output.resolution.describe());
    let _ = writeln!(out, "- base weight used: {:.4}", output.inputs.base_weight);
    let _ = writeln!(out, "- overridden: {}", output.weight_overridden());

    let m = &output.metrics;
    let _ = writeln!(out, "\n| metric | value |");
    let _ = writeln!(out, "| - | - |");
    for (name, value) in [
        ("effective_weight", m.effective_weight),
        ("total_cost", m.total_cost),
        ("medical_income", m.medical_income),
        ("drug_material_income", m.drug_material_income),
        ("treatment_cost", m.treatment_cost),
        ("patient_out_of_pocket", m.patient_out_of_pocket),
        ("payment_standard", m.payment_standard),
        ("settlement_amount", m.settlement_amount),
        ("true_profit_loss", m.true_profit_loss),
        ("settlement_rate", m.settlement_rate),
        ("net_profit_loss", m.net_profit_loss),
    ] {
        let _ = writeln!(out, "| {name} | {value:.6} |");
    }
}
