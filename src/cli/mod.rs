//! Command-line parsing for the DIP case calculator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! engine and catalog code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{CatalogKind, InsurancePool};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dip", version, about = "DIP case profit/loss calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate one case and print cards, charts and the detail table.
    Calc(CalcArgs),
    /// Print the reference catalogs.
    Catalog(CatalogCmdArgs),
    /// List diagnosis options, or the procedure options of one diagnosis.
    Options(OptionsArgs),
    /// Re-render a result snapshot written by `dip calc --export-json`.
    Report(ReportArgs),
    /// Launch the interactive TUI.
    Tui(TuiArgs),
}

/// Catalog replacement files, shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct CatalogArgs {
    /// DIP weight catalog CSV (诊断名称, 诊断编码, 操作名称, 操作编码, 入组的DIP基准分值).
    #[arg(long, value_name = "CSV")]
    pub dip_catalog: Option<PathBuf>,

    /// Procedure catalog CSV (操作编码, 操作名称, 操作类别).
    #[arg(long, value_name = "CSV")]
    pub procedure_catalog: Option<PathBuf>,

    /// Diagnosis catalog CSV (诊断编码, 诊断名称).
    #[arg(long, value_name = "CSV")]
    pub diagnosis_catalog: Option<PathBuf>,
}

/// Case parameters.
#[derive(Debug, Clone, Args)]
pub struct CaseArgs {
    /// Treatment fee (诊疗费用).
    #[arg(long, default_value_t = 3936.93)]
    pub treatment_fee: f64,

    /// Examination and lab fee (检查检验费用).
    #[arg(long, default_value_t = 3348.15)]
    pub exam_fee: f64,

    /// Drug fee (药品费用).
    #[arg(long, default_value_t = 2001.41)]
    pub drug_fee: f64,

    /// Medical material fee (耗材费用).
    #[arg(long, default_value_t = 3115.78)]
    pub material_fee: f64,

    /// Cost ratio of treatment + exam income, in [0, 1] (医疗性收入成本率).
    #[arg(long, default_value_t = 0.50)]
    pub medical_ratio: f64,

    /// Cost ratio of drug + material income, in [0, 1.5] (药耗成本率).
    #[arg(long, default_value_t = 1.00)]
    pub drug_material_ratio: f64,

    /// Pooled fund payment (统筹基金支付金额).
    #[arg(long, default_value_t = 7657.03)]
    pub payer: f64,

    /// Hospital tier coefficient, in [0.5, 2.0] (医院等级系数).
    #[arg(long, default_value_t = 1.0330)]
    pub tier: f64,

    /// Insurance pool; selects the default point value.
    #[arg(long, value_enum, default_value_t = InsurancePool::Employee)]
    pub pool: InsurancePool,

    /// Point value, in [0, 200]; defaults to the pool preset.
    #[arg(long)]
    pub point_value: Option<f64>,

    /// Diagnosis name as listed in the DIP catalog.
    #[arg(long)]
    pub diagnosis: Option<String>,

    /// Procedure name, or `无`/`none` for no procedure.
    #[arg(long)]
    pub procedure: Option<String>,

    /// Base weight override; skips the catalog lookup.
    #[arg(long)]
    pub base_weight: Option<f64>,
}

#[derive(Debug, Parser)]
pub struct CalcArgs {
    #[command(flatten)]
    pub catalogs: CatalogArgs,

    #[command(flatten)]
    pub case: CaseArgs,

    /// Chart width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Export the detail table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export a result snapshot (request, resolution, metrics) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct CatalogCmdArgs {
    #[command(flatten)]
    pub catalogs: CatalogArgs,

    /// Which catalog to print (all when omitted).
    #[arg(long, value_enum)]
    pub which: Option<CatalogKind>,
}

#[derive(Debug, Parser)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub catalogs: CatalogArgs,

    /// Diagnosis whose procedure options to list.
    #[arg(long)]
    pub diagnosis: Option<String>,
}

#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// Snapshot JSON produced by `dip calc --export-json`.
    #[arg(long, value_name = "JSON")]
    pub snapshot: PathBuf,

    /// Chart width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,
}

#[derive(Debug, Parser)]
pub struct TuiArgs {
    #[command(flatten)]
    pub catalogs: CatalogArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calc_defaults_match_sample_case() {
        let cli = Cli::parse_from(["dip", "calc"]);
        let Command::Calc(args) = cli.command else {
            panic!("expected calc");
        };
        assert_eq!(args.case.treatment_fee, 3936.93);
        assert_eq!(args.case.pool, InsurancePool::Employee);
        assert!(args.case.point_value.is_none());
        assert!(args.catalogs.dip_catalog.is_none());
    }

    #[test]
    fn parses_catalog_and_case_flags() {
        let cli = Cli::parse_from([
            "dip",
            "calc",
            "--dip-catalog",
            "dip.csv",
            "--pool",
            "resident",
            "--diagnosis",
            "肺炎",
            "--procedure",
            "无",
            "--payer",
            "0",
        ]);
        let Command::Calc(args) = cli.command else {
            panic!("expected calc");
        };
        assert_eq!(args.catalogs.dip_catalog, Some(PathBuf::from("dip.csv")));
        assert_eq!(args.case.pool, InsurancePool::Resident);
        assert_eq!(args.case.diagnosis.as_deref(), Some("肺炎"));
        assert_eq!(args.case.payer, 0.0);
    }

    #[test]
    fn catalog_which_value_enum() {
        let cli = Cli::parse_from(["dip", "catalog", "--which", "procedure"]);
        let Command::Catalog(args) = cli.command else {
            panic!("expected catalog");
        };
        assert_eq!(args.which, Some(CatalogKind::Procedure));
    }
}
