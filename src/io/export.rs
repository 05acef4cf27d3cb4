//! Export the detail table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets: one row per
//! metric, with the formatted value next to the raw number.

use std::path::Path;

use crate::app::pipeline::CalcOutput;
use crate::error::{AppError, EXIT_INPUT};
use crate::report::detail_rows;

/// Write the ten-row detail table to a CSV file.
pub fn write_detail_csv(path: &Path, output: &CalcOutput) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;
    write_detail(&mut writer, output)?;
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV: {e}")))?;
    Ok(())
}

fn write_detail<W: std::io::Write>(writer: &mut csv::Writer<W>, output: &CalcOutput) -> Result<(), AppError> {
    let m = &output.metrics;
    let raw = [
        m.total_cost,
        m.medical_income,
        m.drug_material_income,
        m.treatment_cost,
        m.patient_out_of_pocket,
        m.payment_standard,
        m.settlement_amount,
        m.true_profit_loss,
        m.net_profit_loss,
        m.settlement_rate,
    ];

    let write_err = |e: csv::Error| AppError::new(EXIT_INPUT, format!("Failed to write export CSV row: {e}"));

    writer.write_record(["项目", "金额/比率", "value"]).map_err(write_err)?;
    for (row, value) in detail_rows(m).into_iter().zip(raw) {
        writer
            .write_record([row.label.to_string(), row.value, format!("{value:.6}")])
            .map_err(write_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{CalcRequest, run_calc};
    use crate::catalog::CatalogSet;

    #[test]
    fn detail_csv_has_header_and_ten_rows() {
        let output = run_calc(&CatalogSet::default(), &CalcRequest::default()).unwrap();
        let mut writer = csv::Writer::from_writer(Vec::new());
        write_detail(&mut writer, &output).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "项目,金额/比率,value");
        assert_eq!(lines[1], "住院总费用,\"¥12,402.27\",12402.270000");
        assert_eq!(lines[10], "DIP回款率,0.00%,0.000000");
    }
}
