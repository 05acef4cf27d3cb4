//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration and catalogs
//! - runs calculations
//! - prints reports/catalogs
//! - writes optional exports

use clap::Parser;

use crate::app::session::Session;
use crate::catalog::{Selection, diagnosis_options, procedure_options};
use crate::cli::{CalcArgs, CatalogArgs, CatalogCmdArgs, Command, OptionsArgs, ReportArgs};
use crate::config::Config;
use crate::domain::CatalogKind;
use crate::error::AppError;

pub mod pipeline;
pub mod session;

/// Entry point for the `dip` binary.
pub fn run() -> Result<(), AppError> {
    // We want `dip` and `dip --dip-catalog x.csv` to behave like `dip tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; it reports through its status line instead.
    if !matches!(cli.command, Command::Tui(_)) {
        init_logging();
    }

    match cli.command {
        Command::Calc(args) => handle_calc(args),
        Command::Catalog(args) => handle_catalog(args),
        Command::Options(args) => handle_options(args),
        Command::Report(args) => handle_report(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

fn load_session(catalogs: &CatalogArgs) -> Result<(Config, Session), AppError> {
    let config = Config::load(catalogs)?;
    let session = Session::from_config(&config)?;
    Ok((config, session))
}

fn handle_calc(args: CalcArgs) -> Result<(), AppError> {
    let (config, mut session) = load_session(&args.catalogs)?;
    let request = config.request_from_args(&args.case);
    let output = session.calculate(&request)?;

    if !output.resolution.is_match() && args.case.base_weight.is_none() {
        log::warn!("{}", output.resolution.describe());
    }

    println!("{}", crate::report::format_report(output, args.width, !args.no_plot));

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_detail_csv(path, output)?;
        log::info!("wrote detail table to '{}'", path.display());
    }
    if let Some(path) = &args.export_json {
        crate::io::snapshot::write_result_json(path, output)?;
        log::info!("wrote result snapshot to '{}'", path.display());
    }

    Ok(())
}

fn handle_catalog(args: CatalogCmdArgs) -> Result<(), AppError> {
    let (_, session) = load_session(&args.catalogs)?;
    let kinds: Vec<CatalogKind> = match args.which {
        Some(kind) => vec![kind],
        None => CatalogKind::ALL.to_vec(),
    };

    for kind in kinds {
        let (headers, rows) = session.catalogs().table(kind);
        println!("{}", crate::report::format_catalog(kind.display_name(), &headers, &rows));
    }
    Ok(())
}

fn handle_options(args: OptionsArgs) -> Result<(), AppError> {
    let (_, session) = load_session(&args.catalogs)?;
    let dip = &session.catalogs().dip;

    match args.diagnosis.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        None => {
            println!("{}", crate::report::format_options("诊断", &diagnosis_options(dip)));
        }
        Some(diagnosis) => {
            let selection = Selection::Named(diagnosis.to_string());
            if !diagnosis_options(dip).iter().any(|d| d == diagnosis) {
                log::warn!("diagnosis '{diagnosis}' is not listed in the DIP catalog");
            }
            let options: Vec<String> = procedure_options(dip, &selection)
                .iter()
                .map(|p| p.label().to_string())
                .collect();
            println!(
                "{}",
                crate::report::format_options(&format!("操作 ({diagnosis})"), &options)
            );
        }
    }
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let snapshot = crate::io::snapshot::read_result_json(&args.snapshot)?;
    println!("Snapshot generated at {}", snapshot.generated_at.format("%Y-%m-%d %H:%M:%S"));
    println!("{}", crate::report::format_report(&snapshot.output, args.width, true));
    Ok(())
}

/// Rewrite argv so `dip` defaults to `dip tui`.
///
/// Rules:
/// - `dip`                       -> `dip tui`
/// - `dip --dip-catalog x ...`   -> `dip tui --dip-catalog x ...`
/// - `dip --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "calc" | "catalog" | "options" | "report" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["dip"])), argv(&["dip", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["dip", "--dip-catalog", "x.csv"])),
            argv(&["dip", "tui", "--dip-catalog", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["dip", "calc", "--payer", "0"])), argv(&["dip", "calc", "--payer", "0"]));
        assert_eq!(rewrite_args(argv(&["dip", "--help"])), argv(&["dip", "--help"]));
    }
}
