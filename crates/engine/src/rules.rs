use crate::model::{AggregatedProduct, RuleMap};
use crate::normalize::normalize_id;

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub products: Vec<AggregatedProduct>,
    /// Products that matched a rule.
    pub applied: usize,
}

/// Merge per-product overrides into the aggregated products.
///
/// A coverage override replaces the requested coverage; a fixed stock value
/// is attached as `fixed_stock_override`. Products without a rule pass
/// through unchanged.
pub fn apply_rules(products: Vec<AggregatedProduct>, rules: &RuleMap) -> Overlay {
    if rules.is_empty() {
        return Overlay { products, applied: 0 };
    }

    let mut applied = 0;
    let products = products
        .into_iter()
        .map(|mut product| {
            let Some(rule) = rules.get(&normalize_id(&product.id)) else {
                return product;
            };
            applied += 1;
            if let Some(coverage) = rule.coverage_weeks_override {
                product.coverage_weeks_requested = coverage;
            }
            if let Some(fixed) = rule.fixed_stock {
                product.fixed_stock_override = Some(fixed);
            }
            product
        })
        .collect();

    log::debug!("rules applied to {applied} product(s)");

    Overlay { products, applied }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConfigRule;

    fn product(id: &str) -> AggregatedProduct {
        AggregatedProduct {
            id: id.to_string(),
            name: String::new(),
            current_month_total: 0.0,
            sales_periods: vec![1.0, 2.0],
            coverage_weeks_requested: 4.0,
            current_stock: 3.0,
            row_index: 2,
            averaging_divisor: 2,
            product_age_in_weeks: 5,
            fixed_stock_override: None,
        }
    }

    fn rule(id: &str, fixed: Option<f64>, coverage: Option<f64>) -> (String, ConfigRule) {
        (
            id.to_string(),
            ConfigRule {
                id: id.to_string(),
                name: None,
                row_index: 2,
                fixed_stock: fixed,
                coverage_weeks_override: coverage,
            },
        )
    }

    #[test]
    fn matches_on_normalized_id() {
        let rules: RuleMap = [rule("sku-1", Some(0.0), None), rule("123", None, Some(6.0))]
            .into_iter()
            .collect();
        let overlay = apply_rules(
            vec![product("SKU-1"), product("123.0"), product("other")],
            &rules,
        );
        assert_eq!(overlay.applied, 2);
        // Zero is a real override
        assert_eq!(overlay.products[0].fixed_stock_override, Some(0.0));
        assert_eq!(overlay.products[0].coverage_weeks_requested, 4.0);
        assert_eq!(overlay.products[1].coverage_weeks_requested, 6.0);
        assert_eq!(overlay.products[1].fixed_stock_override, None);
        assert_eq!(overlay.products[2], product("other"));
    }

    #[test]
    fn no_rules_is_identity() {
        let overlay = apply_rules(vec![product("A")], &RuleMap::new());
        assert_eq!(overlay.products, vec![product("A")]);
        assert_eq!(overlay.applied, 0);
    }
}
