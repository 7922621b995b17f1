//! Transactions → one weekly-history record per product.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::calendar::{first_of_month, iso_week_of, week_range_with, WeekSpan};
use crate::config::AnalysisConfig;
use crate::model::{AggregatedProduct, DateRange, Transaction};
use crate::normalize::normalize_id;

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// First-seen order of the normalized identifiers.
    pub products: Vec<AggregatedProduct>,
    /// `"{prefix} {week}"`, newest first, aligned with `sales_periods`.
    pub week_labels: Vec<String>,
    pub week_spans: Vec<WeekSpan>,
    /// Earliest and latest sale date; `None` for an empty input.
    pub date_range: Option<DateRange>,
}

/// Per-product running totals while transactions are bucketed.
struct Group<'a> {
    first: &'a Transaction,
    earliest: NaiveDate,
    current_month_total: f64,
    periods: Vec<f64>,
}

/// Group transactions by normalized identifier and bucket their units into
/// complete ISO weeks ending the week before the latest sale.
///
/// A transaction dated after the last complete week (or before the oldest
/// one) lands in no bucket but still counts toward the current month.
pub fn aggregate_transactions(
    transactions: &[Transaction],
    analysis: &AnalysisConfig,
    week_label: &str,
) -> Aggregation {
    let (Some(earliest), Some(latest)) = (
        transactions.iter().map(|t| t.sale_date).min(),
        transactions.iter().map(|t| t.sale_date).max(),
    ) else {
        return Aggregation {
            products: Vec::new(),
            week_labels: Vec::new(),
            week_spans: Vec::new(),
            date_range: None,
        };
    };

    let month_start = first_of_month(latest);
    let last_complete = iso_week_of(latest).previous(analysis.rollover);
    let weeks = week_range_with(
        last_complete.year,
        last_complete.week,
        analysis.weeks,
        analysis.rollover,
    );
    let week_spans: Vec<WeekSpan> = weeks.iter().map(|w| w.span()).collect();
    let week_labels: Vec<String> = weeks
        .iter()
        .map(|w| format!("{} {}", week_label.trim(), w.week))
        .collect();

    log::debug!(
        "latest sale {latest}; history {} .. {}",
        weeks.last().copied().unwrap_or(last_complete),
        last_complete
    );

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();

    for t in transactions {
        let slot = *index.entry(normalize_id(&t.id)).or_insert_with(|| {
            groups.push(Group {
                first: t,
                earliest: t.sale_date,
                current_month_total: 0.0,
                periods: vec![0.0; week_spans.len()],
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];

        if let Some(bucket) = week_spans.iter().position(|span| span.contains(t.sale_date)) {
            group.periods[bucket] += t.units_sold;
        }
        if t.sale_date >= month_start {
            group.current_month_total += t.units_sold;
        }
        group.earliest = group.earliest.min(t.sale_date);
    }

    let products: Vec<AggregatedProduct> = groups
        .into_iter()
        .map(|group| {
            let age = product_age_in_weeks(group.earliest, latest);
            AggregatedProduct {
                id: group.first.id.clone(),
                name: group.first.name.clone(),
                current_month_total: group.current_month_total,
                sales_periods: group.periods,
                coverage_weeks_requested: group.first.coverage_weeks_requested,
                current_stock: group.first.current_stock,
                row_index: group.first.row_index,
                averaging_divisor: age.clamp(1, analysis.averaging_window.max(1)),
                product_age_in_weeks: age,
                fixed_stock_override: None,
            }
        })
        .collect();

    log::debug!(
        "{} transaction(s) grouped into {} product(s)",
        transactions.len(),
        products.len()
    );

    Aggregation {
        products,
        week_labels,
        week_spans,
        date_range: Some(DateRange { start: earliest, end: latest }),
    }
}

/// Whole weeks from the first sale to the dataset's latest sale, counting a
/// partial week as one. A product first sold on the latest day is 1 week old.
pub fn product_age_in_weeks(first_sale: NaiveDate, latest: NaiveDate) -> usize {
    let days = (latest - first_sale).num_days().max(0);
    (days / 7) as usize + 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
