use crate::aggregate::aggregate_transactions;
use crate::calc::calculate_products;
use crate::config::{RestockConfig, RulesColumns};
use crate::error::RestockError;
use crate::model::{ProcessingInfo, RuleMap, RunOutput};
use crate::parse::{parse_rules, parse_sales, summarize_issues};
use crate::rules::apply_rules;
use crate::source::TabularSource;

/// Run the whole pipeline: read, parse, aggregate, overlay rules, calculate.
///
/// `Err` means no usable results. Everything recoverable (rejected rows,
/// rule problems, products that failed the formula) is reported through
/// `RunOutput::warnings` or the per-product error instead.
pub fn process_and_calculate(
    sales: &dyn TabularSource,
    rules: Option<&dyn TabularSource>,
    config: &RestockConfig,
) -> Result<RunOutput, RestockError> {
    config.validate()?;

    let sales_label = sales.label();
    let grid = sales.read_grid().map_err(|message| RestockError::Read {
        source: sales_label.clone(),
        message,
    })?;
    let parsed = parse_sales(&grid, &config.sales_columns, &sales_label)?;
    if parsed.transactions.is_empty() {
        return Err(RestockError::NoValidTransactions {
            source: sales_label,
            skipped: parsed.errors.len(),
        });
    }

    let mut warnings =
        summarize_issues(&parsed.errors, config.report.max_row_diagnostics, &sales_label);
    if !parsed.errors.is_empty() {
        log::info!("{sales_label}: {} row(s) skipped", parsed.errors.len());
    }

    // Rules are only read once the sales file is known to be usable
    let rule_map = match rules {
        Some(source) => load_rules(source, &config.rules_columns, &mut warnings)?,
        None => RuleMap::new(),
    };

    let aggregation =
        aggregate_transactions(&parsed.transactions, &config.analysis, &config.report.week_label);
    let Some(date_range) = aggregation.date_range else {
        return Err(RestockError::NoValidTransactions {
            source: sales_label,
            skipped: parsed.errors.len(),
        });
    };

    let overlay = apply_rules(aggregation.products, &rule_map);
    let results = calculate_products(overlay.products);

    let processing_info = ProcessingInfo {
        total_rows: parsed.total_rows,
        valid_transactions: parsed.transactions.len(),
        skipped_rows: parsed.errors.len(),
        products_with_sales: results.len(),
        products_without_recent_sales: results
            .iter()
            .filter(|r| r.product.sales_periods.iter().all(|units| *units == 0.0))
            .count(),
        products_with_config: rule_map.len(),
        rules_applied: overlay.applied,
        date_range,
    };

    Ok(RunOutput {
        results,
        week_labels: aggregation.week_labels,
        week_spans: aggregation.week_spans,
        warnings,
        processing_info,
    })
}

/// Read and parse the rules file. A file that cannot be used as a rules
/// table degrades to a warning; a file that cannot be read at all is fatal.
fn load_rules(
    source: &dyn TabularSource,
    columns: &RulesColumns,
    warnings: &mut Vec<String>,
) -> Result<RuleMap, RestockError> {
    let label = source.label();
    let grid = source
        .read_grid()
        .map_err(|message| RestockError::Read { source: label.clone(), message })?;

    match parse_rules(&grid, columns, &label) {
        Ok(parsed) => {
            warnings.extend(parsed.warnings);
            Ok(parsed.rules)
        }
        Err(err) if err.is_input_shape() => {
            log::warn!("{err}; continuing without rules");
            warnings.push(format!("{err}; continuing without rules"));
            Ok(RuleMap::new())
        }
        Err(err) => Err(err),
    }
}
