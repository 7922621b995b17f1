//! `restock run` and `restock validate`.

use std::path::{Path, PathBuf};

use restock_engine::config::RestockConfig;
use restock_engine::model::{CalculatedProduct, ProcessingInfo, RunOutput};
use restock_engine::{process_and_calculate, RestockError, TabularSource};
use restock_io::export::{export_csv, export_xlsx, write_csv, ExportRequest};
use restock_io::TabularFile;
use serde::Serialize;

use crate::exit_codes::{
    restock_exit_code, EXIT_ERROR, EXIT_EXPORT_FAILED, EXIT_INPUT_UNREADABLE, EXIT_INVALID_CONFIG,
    EXIT_USAGE,
};
use crate::CliError;

pub struct RunArgs {
    pub sales: PathBuf,
    pub rules: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub weeks: Option<usize>,
    pub window: Option<usize>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Xlsx,
    Csv,
}

/// The `--json` document.
#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a [CalculatedProduct],
    week_labels: &'a [String],
    warnings: &'a [String],
    processing_info: &'a ProcessingInfo,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?.with_periods(args.weeks, args.window);
    config
        .validate()
        .map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))?;

    // Fail on a bad output path before doing any work
    let report_format = args.output.as_deref().map(report_format).transpose()?;

    let sales = input_file(&args.sales, "sales")?;
    let rules = args.rules.as_deref().map(|p| input_file(p, "rules")).transpose()?;

    log::info!(
        "analysing {} ({} week(s), window {})",
        args.sales.display(),
        config.analysis.weeks,
        config.analysis.averaging_window
    );

    let output = process_and_calculate(
        &sales,
        rules.as_ref().map(|r| r as &dyn TabularSource),
        &config,
    )
    .map_err(engine_error)?;

    let source_name = sales.label();
    let request = ExportRequest::from_run(&output, &source_name, &config.analysis);

    if let (Some(path), Some(format)) = (args.output.as_deref(), report_format) {
        let written = match format {
            ReportFormat::Xlsx => export_xlsx(path, &request),
            ReportFormat::Csv => export_csv(path, &request),
        };
        written.map_err(|e| {
            CliError::new(EXIT_EXPORT_FAILED, format!("cannot write {}: {e}", path.display()))
        })?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        let report = JsonReport {
            results: &output.results,
            week_labels: &output.week_labels,
            warnings: &output.warnings,
            processing_info: &output.processing_info,
        };
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else if args.output.is_none() {
        write_csv(std::io::stdout().lock(), &request)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write to stdout: {e}")))?;
    }

    if !args.quiet {
        for warning in &output.warnings {
            eprintln!("warning: {warning}");
        }
        print_summary(&output, &request);
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: {} week(s) of history, averaging window {}, rollover {}",
        config.analysis.weeks, config.analysis.averaging_window, config.analysis.rollover,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<RestockConfig, CliError> {
    let Some(path) = path else {
        return Ok(RestockConfig::default());
    };
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_INVALID_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    RestockConfig::from_toml(&config_str).map_err(|e| {
        CliError::new(EXIT_INVALID_CONFIG, format!("{}: {e}", path.display()))
            .with_hint("known sections: [analysis] [sales_columns] [rules_columns] [report]")
    })
}

fn report_format(path: &Path) -> Result<ReportFormat, CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx") => Ok(ReportFormat::Xlsx),
        Some("csv") => Ok(ReportFormat::Csv),
        _ => Err(CliError::new(
            EXIT_USAGE,
            format!("cannot write report to {}: unsupported extension", path.display()),
        )
        .with_hint("use a .xlsx or .csv file name")),
    }
}

fn input_file(path: &Path, role: &str) -> Result<TabularFile, CliError> {
    let file = TabularFile::new(path);
    if !file.is_supported() {
        return Err(CliError::new(
            EXIT_USAGE,
            format!("{role} file {} has an unsupported type", path.display()),
        )
        .with_hint("supported: .csv, .tsv, .txt, .xlsx, .xlsm, .xls, .xlsb, .ods"));
    }
    if !path.is_file() {
        return Err(CliError::new(
            EXIT_INPUT_UNREADABLE,
            format!("{role} file not found: {}", path.display()),
        ));
    }
    Ok(file)
}

fn engine_error(err: RestockError) -> CliError {
    let hint = match &err {
        RestockError::MissingColumns { .. } => {
            Some("map your headers in the [sales_columns] section of a --config file")
        }
        RestockError::NoValidTransactions { .. } => {
            Some("dates must be DD/MM/YYYY or spreadsheet dates; rerun with -v for details")
        }
        _ => None,
    };
    let cli_err = CliError::new(restock_exit_code(&err), err.to_string());
    match hint {
        Some(hint) => cli_err.with_hint(hint),
        None => cli_err,
    }
}

fn print_summary(output: &RunOutput, request: &ExportRequest<'_>) {
    let info = &output.processing_info;
    eprintln!(
        "{} product(s) from {} transaction(s) ({} row(s) skipped): {} to reorder, {} error(s)",
        info.products_with_sales,
        info.valid_transactions,
        info.skipped_rows,
        request.reorder_count(),
        request.error_count(),
    );
    if let (Some(newest), Some(oldest)) = (output.week_labels.first(), output.week_labels.last()) {
        eprintln!(
            "history: {newest} .. {oldest}; sales {} - {}",
            info.date_range.start.format("%d/%m/%Y"),
            info.date_range.end.format("%d/%m/%Y"),
        );
    }
    if info.products_with_config > 0 {
        eprintln!(
            "rules: {} configured, {} applied",
            info.products_with_config, info.rules_applied
        );
    }
}
