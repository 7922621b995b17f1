//! Replenishment formula.
//!
//! ```text
//! average       = round(sum(newest `divisor` weeks) / divisor)
//! ideal_stock   = fixed override, or round(average * coverage_weeks)
//! units_to_order = round(max(0, ideal_stock - current_stock))
//! ```

use crate::model::{AggregatedProduct, CalcOutcome, CalculatedProduct, StockStatus};

/// Round to the nearest integer; ties go toward +∞ (2.5 → 3, -2.5 → -2).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub fn calculate_products(products: Vec<AggregatedProduct>) -> Vec<CalculatedProduct> {
    let results: Vec<CalculatedProduct> = products.into_iter().map(calculate_product).collect();
    let failed = results.iter().filter(|r| r.error().is_some()).count();
    if failed > 0 {
        log::warn!("{failed} product(s) could not be calculated");
    }
    results
}

/// Compute one product. Bad inputs never abort the run: the product comes
/// back as `CalcOutcome::Failed` with zeros in the derived fields.
pub fn calculate_product(product: AggregatedProduct) -> CalculatedProduct {
    let average_weekly_sales = average_weekly_sales(&product);
    let status = match product.fixed_stock_override {
        Some(fixed) if fixed.is_finite() => StockStatus::Fixed,
        _ => StockStatus::Ok,
    };
    let outcome = match evaluate(&product, average_weekly_sales, status) {
        Ok((ideal_stock, units_to_order)) => CalcOutcome::Ready { ideal_stock, units_to_order },
        Err(reason) => CalcOutcome::Failed { message: describe_failure(&product, reason) },
    };
    CalculatedProduct { product, average_weekly_sales, status, outcome }
}

fn average_weekly_sales(product: &AggregatedProduct) -> f64 {
    let divisor = product.averaging_divisor;
    if divisor == 0 {
        return 0.0;
    }
    let total: f64 = product.sales_periods.iter().take(divisor).sum();
    round_half_up(total / divisor as f64)
}

fn evaluate(
    product: &AggregatedProduct,
    average: f64,
    status: StockStatus,
) -> Result<(f64, f64), &'static str> {
    let ideal_stock = match (status, product.fixed_stock_override) {
        (StockStatus::Fixed, Some(fixed)) => fixed,
        _ => {
            if !product.coverage_weeks_requested.is_finite() {
                return Err("coverage weeks is not a finite number");
            }
            if !average.is_finite() {
                return Err("average weekly sales is not a finite number");
            }
            round_half_up(average * product.coverage_weeks_requested)
        }
    };
    if !product.current_stock.is_finite() {
        return Err("current stock is not a finite number");
    }
    let units_to_order = round_half_up((ideal_stock - product.current_stock).max(0.0));
    Ok((ideal_stock, units_to_order))
}

fn describe_failure(product: &AggregatedProduct, reason: &str) -> String {
    if product.id.trim().is_empty() {
        format!("row {}: {reason}", product.row_index)
    } else {
        format!("product '{}': {reason}", product.id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
