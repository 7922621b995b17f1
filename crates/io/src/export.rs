// Report export: Excel workbook (Summary + Results sheets) and plain CSV
//
// Both formats share one column layout:
//   ID | Name | Current Month Units | <week columns, newest first> |
//   Avg Weekly Sales | Coverage Weeks | Current Stock | Ideal Stock |
//   Units to Order | Status | Error

use std::io::Write;
use std::path::Path;

use restock_engine::config::AnalysisConfig;
use restock_engine::model::{CalculatedProduct, ProcessingInfo, RunOutput};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

pub const SUMMARY_SHEET: &str = "Summary";
pub const RESULTS_SHEET: &str = "Results";

/// Everything a report needs.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub results: &'a [CalculatedProduct],
    /// Aligned with each product's `sales_periods`.
    pub week_labels: &'a [String],
    pub source_file_name: &'a str,
    pub num_periods: usize,
    pub averaging_window: usize,
    pub processing_info: &'a ProcessingInfo,
}

impl<'a> ExportRequest<'a> {
    pub fn from_run(output: &'a RunOutput, source_file_name: &'a str, analysis: &AnalysisConfig) -> Self {
        Self {
            results: &output.results,
            week_labels: &output.week_labels,
            source_file_name,
            num_periods: analysis.weeks,
            averaging_window: analysis.averaging_window,
            processing_info: &output.processing_info,
        }
    }

    /// Products with something to order.
    pub fn reorder_count(&self) -> usize {
        self.results.iter().filter(|r| r.units_to_order() > 0.0).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.error().is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Table layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    Number(f64),
}

pub fn result_headers(week_labels: &[String]) -> Vec<String> {
    let mut headers: Vec<String> = vec!["ID".into(), "Name".into(), "Current Month Units".into()];
    headers.extend(week_labels.iter().cloned());
    headers.extend(
        [
            "Avg Weekly Sales",
            "Coverage Weeks",
            "Current Stock",
            "Ideal Stock",
            "Units to Order",
            "Status",
            "Error",
        ]
        .map(String::from),
    );
    headers
}

/// One result row. `week_count` pads or truncates the weekly history so every
/// row has the same width as the header.
fn result_row(result: &CalculatedProduct, week_count: usize) -> Vec<Value> {
    let product = &result.product;
    let mut row = vec![
        Value::Text(product.id.clone()),
        Value::Text(product.name.clone()),
        Value::Number(product.current_month_total),
    ];
    row.extend(
        (0..week_count)
            .map(|i| Value::Number(product.sales_periods.get(i).copied().unwrap_or(0.0))),
    );
    row.extend([
        Value::Number(result.average_weekly_sales),
        Value::Number(product.coverage_weeks_requested),
        Value::Number(product.current_stock),
        Value::Number(result.ideal_stock()),
        Value::Number(result.units_to_order()),
        Value::Text(result.status.to_string()),
        Value::Text(result.error().unwrap_or_default().to_string()),
    ]);
    row
}

/// Integers without decimals; non-finite values render blank.
fn format_number(n: f64) -> String {
    if !n.is_finite() {
        String::new()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ---------------------------------------------------------------------------
// Excel
// ---------------------------------------------------------------------------

/// Write the report workbook to `path`.
pub fn export_xlsx(path: &Path, request: &ExportRequest<'_>) -> Result<(), String> {
    let mut workbook = build_workbook(request)?;
    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    log::info!("wrote {} product(s) to {}", request.results.len(), path.display());
    Ok(())
}

/// Same workbook as [`export_xlsx`], returned as bytes.
pub fn export_xlsx_to_buffer(request: &ExportRequest<'_>) -> Result<Vec<u8>, String> {
    let mut workbook = build_workbook(request)?;
    workbook
        .save_to_buffer()
        .map_err(|e| format!("Failed to build XLSX file: {}", e))
}

fn build_workbook(request: &ExportRequest<'_>) -> Result<Workbook, String> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let summary = workbook
        .add_worksheet()
        .set_name(SUMMARY_SHEET)
        .map_err(|e| format!("Failed to create sheet '{}': {}", SUMMARY_SHEET, e))?;
    write_summary(summary, request, &bold)?;

    let results = workbook
        .add_worksheet()
        .set_name(RESULTS_SHEET)
        .map_err(|e| format!("Failed to create sheet '{}': {}", RESULTS_SHEET, e))?;
    write_results(results, request, &bold)?;

    Ok(workbook)
}

fn write_summary(sheet: &mut Worksheet, request: &ExportRequest<'_>, bold: &Format) -> Result<(), String> {
    let info = request.processing_info;
    let date_range = format!(
        "{} - {}",
        info.date_range.start.format("%d/%m/%Y"),
        info.date_range.end.format("%d/%m/%Y")
    );

    let rows: Vec<(&str, Value)> = vec![
        ("Source file", Value::Text(request.source_file_name.to_string())),
        ("Weeks of history", Value::Number(request.num_periods as f64)),
        ("Averaging window", Value::Number(request.averaging_window as f64)),
        ("Sales date range", Value::Text(date_range)),
        ("Rows read", Value::Number(info.total_rows as f64)),
        ("Valid transactions", Value::Number(info.valid_transactions as f64)),
        ("Rows skipped", Value::Number(info.skipped_rows as f64)),
        ("Products", Value::Number(info.products_with_sales as f64)),
        ("Products without recent sales", Value::Number(info.products_without_recent_sales as f64)),
        ("Products with rules", Value::Number(info.products_with_config as f64)),
        ("Rules applied", Value::Number(info.rules_applied as f64)),
        ("Products to reorder", Value::Number(request.reorder_count() as f64)),
        ("Calculation errors", Value::Number(request.error_count() as f64)),
    ];

    sheet
        .write_string_with_format(0, 0, "Restock report", bold)
        .map_err(|e| e.to_string())?;
    for (i, (label, value)) in rows.iter().enumerate() {
        let row = (i + 2) as u32;
        sheet
            .write_string_with_format(row, 0, *label, bold)
            .map_err(|e| e.to_string())?;
        write_value(sheet, row, 1, value)?;
    }
    sheet.set_column_width(0, 30.0).map_err(|e| e.to_string())?;
    sheet.set_column_width(1, 28.0).map_err(|e| e.to_string())?;
    Ok(())
}

fn write_results(sheet: &mut Worksheet, request: &ExportRequest<'_>, bold: &Format) -> Result<(), String> {
    let headers = result_headers(request.week_labels);
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, header.as_str(), bold)
            .map_err(|e| e.to_string())?;
        let width = header.len().max(10) as f64 + 2.0;
        sheet.set_column_width(col as u16, width).map_err(|e| e.to_string())?;
    }

    for (i, result) in request.results.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, value) in result_row(result, request.week_labels.len()).iter().enumerate() {
            write_value(sheet, row, col as u16, value)?;
        }
    }

    let last_col = (headers.len() - 1) as u16;
    sheet
        .autofilter(0, 0, request.results.len() as u32, last_col)
        .map_err(|e| format!("Failed to set autofilter: {}", e))?;
    sheet.set_freeze_panes(1, 0).map_err(|e| e.to_string())?;
    Ok(())
}

fn write_value(sheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<(), String> {
    match value {
        Value::Text(s) if s.is_empty() => {}
        Value::Text(s) => {
            sheet.write_string(row, col, s.as_str()).map_err(|e| e.to_string())?;
        }
        Value::Number(n) if n.is_finite() => {
            sheet.write_number(row, col, *n).map_err(|e| e.to_string())?;
        }
        Value::Number(_) => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Write the Results table as CSV to `path`.
pub fn export_csv(path: &Path, request: &ExportRequest<'_>) -> Result<(), String> {
    let file = std::fs::File::create(path).map_err(|e| e.to_string())?;
    write_csv(file, request)?;
    log::info!("wrote {} product(s) to {}", request.results.len(), path.display());
    Ok(())
}

/// Write the Results table as CSV to any writer (stdout, a buffer).
pub fn write_csv<W: Write>(writer: W, request: &ExportRequest<'_>) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(result_headers(request.week_labels))
        .map_err(|e| e.to_string())?;

    for result in request.results {
        let record: Vec<String> = result_row(result, request.week_labels.len())
            .into_iter()
            .map(|value| match value {
                Value::Text(s) => s,
                Value::Number(n) => format_number(n),
            })
            .collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Data, Reader};
    use chrono::NaiveDate;
    use restock_engine::calc::calculate_product;
    use restock_engine::model::{AggregatedProduct, DateRange};

    fn product(id: &str, periods: &[f64], stock: f64) -> AggregatedProduct {
        AggregatedProduct {
            id: id.into(),
            name: format!("Product {id}"),
            current_month_total: 7.0,
            sales_periods: periods.to_vec(),
            coverage_weeks_requested: 4.0,
            current_stock: stock,
            row_index: 2,
            averaging_divisor: periods.len(),
            product_age_in_weeks: 10,
            fixed_stock_override: None,
        }
    }

    fn info() -> ProcessingInfo {
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
        ProcessingInfo {
            total_rows: 10,
            valid_transactions: 9,
            skipped_rows: 1,
            products_with_sales: 2,
            products_without_recent_sales: 0,
            products_with_config: 0,
            rules_applied: 0,
            date_range: DateRange { start: d(1, 2), end: d(3, 14) },
        }
    }

    fn fixture() -> (Vec<CalculatedProduct>, Vec<String>, ProcessingInfo) {
        let results = vec![
            calculate_product(product("P1", &[10.0, 20.0, 30.0, 40.0], 15.0)),
            calculate_product(product("P2", &[1.0, 1.0, 1.0, 1.0], f64::NAN)),
        ];
        let labels = ["Week 10", "Week 9", "Week 8", "Week 7"].map(String::from).to_vec();
        (results, labels, info())
    }

    fn request<'a>(
        results: &'a [CalculatedProduct],
        labels: &'a [String],
        info: &'a ProcessingInfo,
    ) -> ExportRequest<'a> {
        ExportRequest {
            results,
            week_labels: labels,
            source_file_name: "ventas.xlsx",
            num_periods: 4,
            averaging_window: 4,
            processing_info: info,
        }
    }

    #[test]
    fn headers_follow_fixed_order() {
        let headers = result_headers(&["Week 2".to_string(), "Week 1".to_string()]);
        assert_eq!(
            headers,
            vec![
                "ID",
                "Name",
                "Current Month Units",
                "Week 2",
                "Week 1",
                "Avg Weekly Sales",
                "Coverage Weeks",
                "Current Stock",
                "Ideal Stock",
                "Units to Order",
                "Status",
                "Error",
            ]
        );
    }

    #[test]
    fn csv_table() {
        let (results, labels, info) = fixture();
        let mut out = Vec::new();
        write_csv(&mut out, &request(&results, &labels, &info)).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID,Name,Current Month Units,Week 10,Week 9"));
        assert_eq!(lines[1], "P1,Product P1,7,10,20,30,40,25,4,15,100,85,OK,");
        assert!(lines[2].starts_with("P2,Product P2,7,1,1,1,1,1,4,,0,0,OK,"));
        assert!(lines[2].contains("current stock is not a finite number"));
    }

    #[test]
    fn csv_to_path() {
        let (results, labels, info) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        export_csv(&path, &request(&results, &labels, &info)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("P1,Product P1"));
    }

    #[test]
    fn xlsx_has_summary_and_results() {
        let (results, labels, info) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        export_xlsx(&path, &request(&results, &labels, &info)).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![SUMMARY_SHEET, RESULTS_SHEET]);

        let summary = workbook.worksheet_range(SUMMARY_SHEET).unwrap();
        assert_eq!(summary.get_value((0, 0)), Some(&Data::String("Restock report".into())));
        assert_eq!(summary.get_value((2, 1)), Some(&Data::String("ventas.xlsx".into())));
        assert_eq!(summary.get_value((5, 1)), Some(&Data::String("02/01/2024 - 14/03/2024".into())));

        let table = workbook.worksheet_range(RESULTS_SHEET).unwrap();
        assert_eq!(table.get_size(), (3, 14));
        assert_eq!(table.get_value((0, 3)), Some(&Data::String("Week 10".into())));
        assert_eq!(table.get_value((1, 0)), Some(&Data::String("P1".into())));
        assert_eq!(table.get_value((1, 11)), Some(&Data::Float(85.0)));
        assert_eq!(table.get_value((2, 12)), Some(&Data::String("OK".into())));
    }

    #[test]
    fn xlsx_buffer_is_a_zip() {
        let (results, labels, info) = fixture();
        let bytes = export_xlsx_to_buffer(&request(&results, &labels, &info)).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn short_history_is_padded() {
        let result = calculate_product(product("P9", &[5.0], 0.0));
        let row = result_row(&result, 3);
        assert_eq!(row[3..6], [Value::Number(5.0), Value::Number(0.0), Value::Number(0.0)]);
    }
}
