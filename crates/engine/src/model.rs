use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::calendar::WeekSpan;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One decoded cell of a tabular file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Cell {
    /// Build a cell from text, mapping blank strings to `Empty`.
    pub fn text(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            // Integers without decimals
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Cell::Date(d) => write!(f, "{}", d.format("%d/%m/%Y")),
        }
    }
}

/// Rows of cells; the first row holds the column headers.
pub type Grid = Vec<Vec<Cell>>;

// ---------------------------------------------------------------------------
// Parsed records
// ---------------------------------------------------------------------------

/// A validated sales row.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// 1-based row in the source file (the header is row 1).
    pub row_index: usize,
    /// Identifier exactly as it appeared in the file.
    pub id: String,
    pub name: String,
    pub sale_date: NaiveDate,
    pub units_sold: f64,
    pub coverage_weeks_requested: f64,
    pub current_stock: f64,
    pub iso_week: u32,
    pub iso_year: i32,
}

/// Per-product override from the rules file, keyed by normalized id.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRule {
    pub id: String,
    /// Name column of the rules file, when present and non-blank.
    pub name: Option<String>,
    pub row_index: usize,
    pub fixed_stock: Option<f64>,
    pub coverage_weeks_override: Option<f64>,
}

pub type RuleMap = HashMap<String, ConfigRule>;

/// A row-level problem that excluded a sales row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub row: usize,
    pub message: String,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedProduct {
    pub id: String,
    pub name: String,
    pub current_month_total: f64,
    /// Weekly units, newest complete week first.
    pub sales_periods: Vec<f64>,
    pub coverage_weeks_requested: f64,
    pub current_stock: f64,
    pub row_index: usize,
    pub averaging_divisor: usize,
    pub product_age_in_weeks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_stock_override: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StockStatus {
    #[serde(rename = "OK")]
    Ok,
    Fixed,
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Fixed => write!(f, "Fixed"),
        }
    }
}

/// Result of the replenishment formula for one product.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcOutcome {
    Ready { ideal_stock: f64, units_to_order: f64 },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedProduct {
    pub product: AggregatedProduct,
    pub average_weekly_sales: f64,
    pub status: StockStatus,
    pub outcome: CalcOutcome,
}

impl CalculatedProduct {
    /// Ideal stock, or 0 when the calculation failed.
    pub fn ideal_stock(&self) -> f64 {
        match self.outcome {
            CalcOutcome::Ready { ideal_stock, .. } => ideal_stock,
            CalcOutcome::Failed { .. } => 0.0,
        }
    }

    /// Units to order, or 0 when the calculation failed.
    pub fn units_to_order(&self) -> f64 {
        match self.outcome {
            CalcOutcome::Ready { units_to_order, .. } => units_to_order,
            CalcOutcome::Failed { .. } => 0.0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            CalcOutcome::Ready { .. } => None,
            CalcOutcome::Failed { message } => Some(message),
        }
    }
}

/// Flat wire shape: product fields, derived fields, and `error` only when set.
#[derive(Serialize)]
struct CalculatedProductView<'a> {
    #[serde(flatten)]
    product: &'a AggregatedProduct,
    average_weekly_sales: f64,
    ideal_stock: f64,
    units_to_order: f64,
    status: StockStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for CalculatedProduct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CalculatedProductView {
            product: &self.product,
            average_weekly_sales: self.average_weekly_sales,
            ideal_stock: self.ideal_stock(),
            units_to_order: self.units_to_order(),
            status: self.status,
            error: self.error(),
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingInfo {
    /// Non-blank data rows in the sales file.
    pub total_rows: usize,
    pub valid_transactions: usize,
    pub skipped_rows: usize,
    pub products_with_sales: usize,
    /// Products whose whole weekly history is zero.
    pub products_without_recent_sales: usize,
    pub products_with_config: usize,
    pub rules_applied: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutput {
    pub results: Vec<CalculatedProduct>,
    /// Aligned with each product's `sales_periods`, newest first.
    pub week_labels: Vec<String>,
    pub week_spans: Vec<WeekSpan>,
    pub warnings: Vec<String>,
    pub processing_info: ProcessingInfo,
}
