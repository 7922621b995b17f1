//! Grid → typed records.
//!
//! Header problems reject the whole file. Everything below the header is
//! validated row by row: a bad row is dropped with a diagnostic and parsing
//! carries on with the next one.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::calendar::{date_from_serial, iso_week_of};
use crate::config::{RulesColumns, SalesColumns};
use crate::error::RestockError;
use crate::model::{Cell, ConfigRule, Grid, RowIssue, RuleMap, Transaction};
use crate::normalize::normalize_id;

/// Dates outside this year range are rejected as implausible.
pub const MIN_YEAR: i32 = 1901;
pub const MAX_YEAR: i32 = 2999;

static EMPTY: Cell = Cell::Empty;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SalesParse {
    pub transactions: Vec<Transaction>,
    pub errors: Vec<RowIssue>,
    /// Non-blank data rows seen below the header.
    pub total_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RulesParse {
    pub rules: RuleMap,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Header name (trimmed, lowercased) → first column holding it.
struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    fn from_row(row: &[Cell]) -> Self {
        let mut positions = HashMap::new();
        for (idx, cell) in row.iter().enumerate() {
            let key = header_key(&cell.to_string());
            if !key.is_empty() {
                positions.entry(key).or_insert(idx);
            }
        }
        Self { positions }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.positions.get(&header_key(name)).copied()
    }

    /// Positions of every name, or a single error listing all missing ones.
    fn require<const N: usize>(
        &self,
        names: [&str; N],
        source: &str,
    ) -> Result<[usize; N], RestockError> {
        let found = names.map(|name| self.find(name));
        let missing: Vec<String> = names
            .iter()
            .zip(found.iter())
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| name.trim().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RestockError::MissingColumns {
                source: source.to_string(),
                columns: missing,
            });
        }
        Ok(found.map(|pos| pos.unwrap_or_default()))
    }
}

fn header_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    row.get(idx).unwrap_or(&EMPTY)
}

// ---------------------------------------------------------------------------
// Cell conversions
// ---------------------------------------------------------------------------

fn date_text_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{2,4})(?:\s.*)?$")
            .expect("date pattern is a valid regex")
    })
}

/// Parse a sale date from a native date, a spreadsheet serial, or
/// `D/M/Y` text (separators `/`, `-`, `.`; two-digit years are 20xx).
/// Purely numeric text is read as a serial, as CSV exports of date columns
/// often carry the raw day count.
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    let date = match cell {
        Cell::Date(date) => *date,
        Cell::Number(serial) => date_from_serial(*serial)?,
        Cell::Text(text) => parse_date_text(text)?,
        Cell::Empty | Cell::Bool(_) => return None,
    };
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(serial) = text.parse::<f64>() {
        return date_from_serial(serial);
    }
    let caps = date_text_pattern().captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Required numeric cell. Blank reads as zero; anything else must be a finite number.
pub fn parse_number(cell: &Cell) -> Option<f64> {
    match parse_optional_number(cell) {
        Ok(value) => Some(value.unwrap_or(0.0)),
        Err(()) => None,
    }
}

/// Optional numeric cell: `Ok(None)` when blank, `Err` when not a finite number.
fn parse_optional_number(cell: &Cell) -> Result<Option<f64>, ()> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::Number(n) if n.is_finite() => Ok(Some(*n)),
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(()),
            }
        }
        _ => Err(()),
    }
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

/// Parse the sales export. Fails only when the grid has no header row or the
/// header lacks a required column.
pub fn parse_sales(
    grid: &Grid,
    columns: &SalesColumns,
    source: &str,
) -> Result<SalesParse, RestockError> {
    let Some((header, rows)) = grid.split_first() else {
        return Err(RestockError::EmptyFile { source: source.to_string() });
    };
    let positions = HeaderIndex::from_row(header).require(columns.all(), source)?;

    let mut transactions = Vec::new();
    let mut errors = Vec::new();
    let mut total_rows = 0;

    for (offset, row) in rows.iter().enumerate() {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        total_rows += 1;
        // Header is row 1
        let row_index = offset + 2;
        match parse_sales_row(row, &positions, columns, row_index) {
            Ok(transaction) => transactions.push(transaction),
            Err(issue) => errors.push(issue),
        }
    }

    log::debug!(
        "{source}: {} transaction(s), {} row(s) rejected",
        transactions.len(),
        errors.len()
    );

    Ok(SalesParse { transactions, errors, total_rows })
}

fn parse_sales_row(
    row: &[Cell],
    positions: &[usize; 6],
    columns: &SalesColumns,
    row_index: usize,
) -> Result<Transaction, RowIssue> {
    let [id_col, name_col, date_col, units_col, coverage_col, stock_col] = *positions;
    let issue = |message: String| RowIssue { row: row_index, message };

    let date_cell = cell_at(row, date_col);
    let Some(sale_date) = parse_date(date_cell) else {
        return Err(issue(if date_cell.is_blank() {
            format!("empty date in column '{}'", columns.date)
        } else {
            format!("invalid date '{}' in column '{}'", date_cell, columns.date)
        }));
    };

    let id = cell_at(row, id_col).to_string();
    if normalize_id(&id).is_empty() {
        return Err(issue(format!("empty identifier in column '{}'", columns.id)));
    }

    let number = |col: usize, name: &str| -> Result<f64, RowIssue> {
        let cell = cell_at(row, col);
        parse_number(cell).ok_or_else(|| {
            issue(format!("column '{name}' has non-numeric value '{cell}'"))
        })
    };
    let units_sold = number(units_col, &columns.units_sold)?;
    let coverage_weeks_requested = number(coverage_col, &columns.coverage_weeks)?;
    let current_stock = number(stock_col, &columns.current_stock)?;

    let week = iso_week_of(sale_date);
    Ok(Transaction {
        row_index,
        id,
        name: cell_at(row, name_col).to_string(),
        sale_date,
        units_sold,
        coverage_weeks_requested,
        current_stock,
        iso_week: week.week,
        iso_year: week.year,
    })
}

/// Render row issues for display, keeping at most `cap` individual lines and
/// folding the rest into one count line.
pub fn summarize_issues(issues: &[RowIssue], cap: usize, source: &str) -> Vec<String> {
    let mut lines: Vec<String> = issues
        .iter()
        .take(cap)
        .map(|issue| format!("{source}: {issue}; row skipped"))
        .collect();
    if issues.len() > cap {
        lines.push(format!(
            "{source}: ... and {} more row(s) skipped",
            issues.len() - cap
        ));
    }
    lines
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Parse the rules table. Only the identifier column is required; every
/// problem below the header is a warning.
pub fn parse_rules(
    grid: &Grid,
    columns: &RulesColumns,
    source: &str,
) -> Result<RulesParse, RestockError> {
    let Some((header, rows)) = grid.split_first() else {
        return Err(RestockError::EmptyFile { source: source.to_string() });
    };
    let index = HeaderIndex::from_row(header);
    let [id_col] = index.require([columns.id.as_str()], source)?;
    let name_col = index.find(&columns.name);
    let fixed_col = index.find(&columns.fixed_stock);
    let coverage_col = index.find(&columns.coverage_weeks);

    let mut rules = RuleMap::new();
    let mut warnings = Vec::new();

    for (offset, row) in rows.iter().enumerate() {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        let row_index = offset + 2;

        let id = normalize_id(&cell_at(row, id_col).to_string());
        let name = name_col
            .map(|col| cell_at(row, col).to_string().trim().to_string())
            .filter(|name| !name.is_empty());
        if id.is_empty() {
            let named = name.as_deref().map(|n| format!(" for '{n}'")).unwrap_or_default();
            warnings.push(format!(
                "{source}: row {row_index}: empty identifier{named}; rule skipped"
            ));
            continue;
        }

        let fixed_stock = fixed_col.and_then(|col| {
            optional_field(cell_at(row, col), &columns.fixed_stock, |v| v >= 0.0, "a number >= 0")
                .unwrap_or_else(|msg| {
                    warnings.push(format!("{source}: row {row_index}: {msg}"));
                    None
                })
        });
        let coverage_weeks_override = coverage_col.and_then(|col| {
            optional_field(cell_at(row, col), &columns.coverage_weeks, |v| v > 0.0, "a number > 0")
                .unwrap_or_else(|msg| {
                    warnings.push(format!("{source}: row {row_index}: {msg}"));
                    None
                })
        });

        let rule = ConfigRule {
            id: id.clone(),
            name,
            row_index,
            fixed_stock,
            coverage_weeks_override,
        };
        let label = rule_label(&rule);
        if let Some(previous) = rules.insert(id, rule) {
            warnings.push(format!(
                "{source}: row {row_index}: {label} already defined at row {}; the later row wins",
                previous.row_index
            ));
        }
    }

    log::debug!("{source}: {} rule(s), {} warning(s)", rules.len(), warnings.len());

    Ok(RulesParse { rules, warnings })
}

fn rule_label(rule: &ConfigRule) -> String {
    match &rule.name {
        Some(name) => format!("identifier '{}' ({name})", rule.id),
        None => format!("identifier '{}'", rule.id),
    }
}

/// One optional override value: blank → `None`, valid → `Some`, otherwise a
/// warning message and the field is dropped.
fn optional_field(
    cell: &Cell,
    column: &str,
    in_range: impl Fn(f64) -> bool,
    expected: &str,
) -> Result<Option<f64>, String> {
    match parse_optional_number(cell) {
        Ok(Some(value)) if in_range(value) => Ok(Some(value)),
        Ok(None) => Ok(None),
        _ => Err(format!("ignoring {column} value '{cell}' (expected {expected})")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|row| row.iter().map(|v| Cell::text(v)).collect())
            .collect()
    }

    const SALES_HEADER: &[&str] = &[
        "ID",
        "Nombre",
        "Fecha",
        "Unidades_Vendidas",
        "Semanas_Cobertura_Stock",
        "Stock_Actual",
    ];

    // -- dates ---------------------------------------------------------------

    #[test]
    fn date_text_forms() {
        assert_eq!(parse_date(&Cell::text("14/03/2024")), Some(d(2024, 3, 14)));
        assert_eq!(parse_date(&Cell::text("4-3-2024")), Some(d(2024, 3, 4)));
        assert_eq!(parse_date(&Cell::text("04.03.24")), Some(d(2024, 3, 4)));
        assert_eq!(parse_date(&Cell::text(" 14/03/2024 10:30 ")), Some(d(2024, 3, 14)));
    }

    #[test]
    fn date_text_rejects_other_shapes() {
        assert_eq!(parse_date(&Cell::text("2024-03-14")), None);
        assert_eq!(parse_date(&Cell::text("March 14")), None);
        assert_eq!(parse_date(&Cell::text("31/02/2024")), None);
        assert_eq!(parse_date(&Cell::text("14/13/2024")), None);
        assert_eq!(parse_date(&Cell::text("1/1/202")), None);
        assert_eq!(parse_date(&Cell::Empty), None);
        assert_eq!(parse_date(&Cell::Bool(true)), None);
    }

    #[test]
    fn date_serial_as_text() {
        assert_eq!(parse_date(&Cell::text("45365")), Some(d(2024, 3, 14)));
        assert_eq!(parse_date(&Cell::text(" 45365.5 ")), Some(d(2024, 3, 14)));
        assert_eq!(parse_date(&Cell::text("1")), None);
        assert_eq!(parse_date(&Cell::text("NaN")), None);
    }

    #[test]
    fn date_serial_and_native() {
        assert_eq!(parse_date(&Cell::Number(45365.0)), Some(d(2024, 3, 14)));
        assert_eq!(parse_date(&Cell::Date(d(2024, 3, 14))), Some(d(2024, 3, 14)));
        // Serial 1 is 1899-12-31: outside the plausible range
        assert_eq!(parse_date(&Cell::Number(1.0)), None);
        assert_eq!(parse_date(&Cell::Number(-5.0)), None);
        assert_eq!(parse_date(&Cell::Number(9_999_999.0)), None);
    }

    // -- numbers -------------------------------------------------------------

    #[test]
    fn numbers() {
        assert_eq!(parse_number(&Cell::Number(3.5)), Some(3.5));
        assert_eq!(parse_number(&Cell::text(" 12 ")), Some(12.0));
        assert_eq!(parse_number(&Cell::Empty), Some(0.0));
        assert_eq!(parse_number(&Cell::text("abc")), None);
        assert_eq!(parse_number(&Cell::text("inf")), None);
        assert_eq!(parse_number(&Cell::Number(f64::NAN)), None);
        assert_eq!(parse_number(&Cell::Bool(false)), None);
    }

    // -- sales ---------------------------------------------------------------

    #[test]
    fn parses_valid_rows() {
        let g = grid(&[
            SALES_HEADER,
            &["A1", "Widget", "14/03/2024", "5", "4", "10"],
            &["A2", "Gadget", "13/03/2024", "2", "3", "0"],
        ]);
        let parsed = parse_sales(&g, &SalesColumns::default(), "ventas.csv").unwrap();
        assert_eq!(parsed.transactions.len(), 2);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.total_rows, 2);

        let t = &parsed.transactions[0];
        assert_eq!(t.row_index, 2);
        assert_eq!(t.id, "A1");
        assert_eq!(t.name, "Widget");
        assert_eq!(t.sale_date, d(2024, 3, 14));
        assert_eq!(t.units_sold, 5.0);
        assert_eq!((t.iso_year, t.iso_week), (2024, 11));
    }

    #[test]
    fn header_matching_ignores_case_and_padding() {
        let g = grid(&[
            &[" id ", "NOMBRE", "fecha", "unidades_vendidas", "Semanas_Cobertura_Stock ", "stock_actual"],
            &["A1", "Widget", "14/03/2024", "5", "4", "10"],
        ]);
        let parsed = parse_sales(&g, &SalesColumns::default(), "ventas.csv").unwrap();
        assert_eq!(parsed.transactions.len(), 1);
    }

    #[test]
    fn missing_columns_fail_the_file() {
        let g = grid(&[&["ID", "Nombre", "Unidades_Vendidas"], &["A1", "Widget", "5"]]);
        let err = parse_sales(&g, &SalesColumns::default(), "ventas.csv").unwrap_err();
        match err {
            RestockError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["Fecha", "Semanas_Cobertura_Stock", "Stock_Actual"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_grid_is_an_empty_file() {
        let err = parse_sales(&Grid::new(), &SalesColumns::default(), "ventas.csv").unwrap_err();
        assert!(matches!(err, RestockError::EmptyFile { .. }));
    }

    #[test]
    fn bad_date_drops_only_that_row() {
        let g = grid(&[
            SALES_HEADER,
            &["A1", "Widget", "14/03/2024", "5", "4", "10"],
            &["A2", "Gadget", "not a date", "2", "3", "0"],
            &["A3", "Doohickey", "12/03/2024", "1", "2", "1"],
        ]);
        let parsed = parse_sales(&g, &SalesColumns::default(), "ventas.csv").unwrap();
        assert_eq!(parsed.transactions.len(), 2);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].row, 3);
        assert!(parsed.errors[0].message.contains("not a date"));
    }

    #[test]
    fn empty_identifier_and_bad_numbers_are_row_issues() {
        let g = grid(&[
            SALES_HEADER,
            &["", "Nameless", "14/03/2024", "5", "4", "10"],
            &["A2", "Gadget", "14/03/2024", "lots", "3", "0"],
            &["A3", "Gizmo", "14/03/2024", "1", "2", "1"],
        ]);
        let parsed = parse_sales(&g, &SalesColumns::default(), "ventas.csv").unwrap();
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].to_string(), "row 2: empty identifier in column 'ID'");
        assert_eq!(
            parsed.errors[1].to_string(),
            "row 3: column 'Unidades_Vendidas' has non-numeric value 'lots'"
        );
    }

    #[test]
    fn blank_rows_are_ignored_and_blank_numbers_are_zero() {
        let g = grid(&[
            SALES_HEADER,
            &["", "", "", "", "", ""],
            &["A1", "Widget", "14/03/2024", "", "4", ""],
        ]);
        let parsed = parse_sales(&g, &SalesColumns::default(), "ventas.csv").unwrap();
        assert_eq!(parsed.total_rows, 1);
        assert_eq!(parsed.transactions[0].row_index, 3);
        assert_eq!(parsed.transactions[0].units_sold, 0.0);
        assert_eq!(parsed.transactions[0].current_stock, 0.0);
    }

    #[test]
    fn numeric_identifiers_render_without_decimals() {
        let g: Grid = vec![
            SALES_HEADER.iter().map(|h| Cell::text(h)).collect(),
            vec![
                Cell::Number(123.0),
                Cell::text("Widget"),
                Cell::Number(45365.0),
                Cell::Number(5.0),
                Cell::Number(4.0),
                Cell::Number(10.0),
            ],
        ];
        let parsed = parse_sales(&g, &SalesColumns::default(), "ventas.xlsx").unwrap();
        assert_eq!(parsed.transactions[0].id, "123");
        assert_eq!(parsed.transactions[0].sale_date, d(2024, 3, 14));
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let g = grid(&[SALES_HEADER, &["A1", "Widget", "14/03/2024", "5"]]);
        let parsed = parse_sales(&g, &SalesColumns::default(), "ventas.csv").unwrap();
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.transactions[0].current_stock, 0.0);
    }

    #[test]
    fn summarize_caps_lines() {
        let issues: Vec<RowIssue> = (0..5)
            .map(|i| RowIssue { row: i + 2, message: "empty date in column 'Fecha'".into() })
            .collect();
        let lines = summarize_issues(&issues, 2, "ventas.csv");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ventas.csv: row 2: empty date in column 'Fecha'; row skipped");
        assert_eq!(lines[2], "ventas.csv: ... and 3 more row(s) skipped");

        assert_eq!(summarize_issues(&issues, 10, "ventas.csv").len(), 5);
    }

    // -- rules ---------------------------------------------------------------

    #[test]
    fn rules_basic() {
        let g = grid(&[
            &["ID", "Nombre", "Stock_Fijo", "Semanas_Cobertura_Stock"],
            &["A1.0", "Widget", "50", ""],
            &["a2", "Gadget", "", "6"],
            &["A3", "Gizmo", "0", ""],
        ]);
        let parsed = parse_rules(&g, &RulesColumns::default(), "reglas.csv").unwrap();
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        assert_eq!(parsed.rules.len(), 3);
        assert_eq!(parsed.rules["a1"].fixed_stock, Some(50.0));
        assert_eq!(parsed.rules["a1"].coverage_weeks_override, None);
        assert_eq!(parsed.rules["a2"].coverage_weeks_override, Some(6.0));
        // Zero is a real override, not absence
        assert_eq!(parsed.rules["a3"].fixed_stock, Some(0.0));
    }

    #[test]
    fn rules_only_need_the_id_column() {
        let g = grid(&[&["id"], &["A1"]]);
        let parsed = parse_rules(&g, &RulesColumns::default(), "reglas.csv").unwrap();
        assert_eq!(parsed.rules["a1"].fixed_stock, None);
    }

    #[test]
    fn rules_missing_id_column_is_an_error() {
        let g = grid(&[&["SKU", "Stock_Fijo"], &["A1", "5"]]);
        let err = parse_rules(&g, &RulesColumns::default(), "reglas.csv").unwrap_err();
        assert!(err.to_string().contains("ID"));
    }

    #[test]
    fn rules_duplicates_later_row_wins() {
        let g = grid(&[
            &["ID", "Stock_Fijo"],
            &["A1", "10"],
            &[" a1 ", "20"],
        ]);
        let parsed = parse_rules(&g, &RulesColumns::default(), "reglas.csv").unwrap();
        assert_eq!(parsed.rules.len(), 1);
        assert_eq!(parsed.rules["a1"].fixed_stock, Some(20.0));
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("already defined at row 2"));
    }

    #[test]
    fn rules_bad_fields_are_dropped_individually() {
        let g = grid(&[
            &["ID", "Stock_Fijo", "Semanas_Cobertura_Stock"],
            &["A1", "-3", "4"],
            &["A2", "7", "zero"],
            &["", "9", "1"],
        ]);
        let parsed = parse_rules(&g, &RulesColumns::default(), "reglas.csv").unwrap();
        assert_eq!(parsed.rules.len(), 2);
        assert_eq!(parsed.rules["a1"].fixed_stock, None);
        assert_eq!(parsed.rules["a1"].coverage_weeks_override, Some(4.0));
        assert_eq!(parsed.rules["a2"].fixed_stock, Some(7.0));
        assert_eq!(parsed.rules["a2"].coverage_weeks_override, None);
        assert_eq!(parsed.warnings.len(), 3);
        assert!(parsed.warnings[0].contains("ignoring Stock_Fijo value '-3'"));
        assert!(parsed.warnings[2].contains("empty identifier"));
    }

    #[test]
    fn rules_name_column_labels_warnings() {
        let g = grid(&[
            &["ID", "Nombre", "Stock_Fijo"],
            &["A1", "Widget", "10"],
            &["A1", "Widget XL", "20"],
            &["", "Tornillo", "5"],
        ]);
        let parsed = parse_rules(&g, &RulesColumns::default(), "reglas.csv").unwrap();
        assert_eq!(parsed.rules["a1"].name.as_deref(), Some("Widget XL"));
        assert_eq!(
            parsed.warnings[0],
            "reglas.csv: row 3: identifier 'a1' (Widget XL) already defined at row 2; the later row wins"
        );
        assert_eq!(
            parsed.warnings[1],
            "reglas.csv: row 4: empty identifier for 'Tornillo'; rule skipped"
        );
    }

    #[test]
    fn rules_without_name_column() {
        let g = grid(&[&["ID", "Stock_Fijo"], &["A1", "10"]]);
        let parsed = parse_rules(&g, &RulesColumns::default(), "reglas.csv").unwrap();
        assert_eq!(parsed.rules["a1"].name, None);
    }
}
