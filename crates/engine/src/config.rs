use serde::Deserialize;

use crate::calendar::RolloverRule;
use crate::error::RestockError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration, usually loaded from `restock.toml`. Every section is
/// optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RestockConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub sales_columns: SalesColumns,
    #[serde(default)]
    pub rules_columns: RulesColumns,
    #[serde(default)]
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    /// Number of complete weeks of history per product.
    #[serde(default = "default_weeks")]
    pub weeks: usize,
    /// Upper bound on the number of recent weeks averaged.
    #[serde(default = "default_averaging_window")]
    pub averaging_window: usize,
    #[serde(default)]
    pub rollover: RolloverRule,
}

/// Longest history (and averaging window) a run may ask for: ten years of weeks.
pub const MAX_WEEKS: usize = 520;

fn default_weeks() -> usize {
    8
}

fn default_averaging_window() -> usize {
    4
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            weeks: default_weeks(),
            averaging_window: default_averaging_window(),
            rollover: RolloverRule::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Header names of the sales export. Matched case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SalesColumns {
    pub id: String,
    pub name: String,
    pub date: String,
    pub units_sold: String,
    pub coverage_weeks: String,
    pub current_stock: String,
}

impl Default for SalesColumns {
    fn default() -> Self {
        Self {
            id: "ID".into(),
            name: "Nombre".into(),
            date: "Fecha".into(),
            units_sold: "Unidades_Vendidas".into(),
            coverage_weeks: "Semanas_Cobertura_Stock".into(),
            current_stock: "Stock_Actual".into(),
        }
    }
}

impl SalesColumns {
    pub fn all(&self) -> [&str; 6] {
        [
            self.id.as_str(),
            self.name.as_str(),
            self.date.as_str(),
            self.units_sold.as_str(),
            self.coverage_weeks.as_str(),
            self.current_stock.as_str(),
        ]
    }
}

/// Header names of the rules file. Only `id` is required to be present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RulesColumns {
    pub id: String,
    pub name: String,
    pub fixed_stock: String,
    pub coverage_weeks: String,
}

impl Default for RulesColumns {
    fn default() -> Self {
        Self {
            id: "ID".into(),
            name: "Nombre".into(),
            fixed_stock: "Stock_Fijo".into(),
            coverage_weeks: "Semanas_Cobertura_Stock".into(),
        }
    }
}

impl RulesColumns {
    pub fn all(&self) -> [&str; 4] {
        [
            self.id.as_str(),
            self.name.as_str(),
            self.fixed_stock.as_str(),
            self.coverage_weeks.as_str(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Prefix of the weekly history labels ("Week 33").
    pub week_label: String,
    /// Individual skipped-row messages kept before the remainder is summarized.
    pub max_row_diagnostics: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            week_label: "Week".into(),
            max_row_diagnostics: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RestockConfig {
    pub fn from_toml(input: &str) -> Result<Self, RestockError> {
        let config: RestockConfig =
            toml::from_str(input).map_err(|e| RestockError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the analysis window with explicit values (command-line overrides).
    pub fn with_periods(mut self, weeks: Option<usize>, averaging_window: Option<usize>) -> Self {
        if let Some(weeks) = weeks {
            self.analysis.weeks = weeks;
        }
        if let Some(window) = averaging_window {
            self.analysis.averaging_window = window;
        }
        self
    }

    pub fn validate(&self) -> Result<(), RestockError> {
        if !(1..=MAX_WEEKS).contains(&self.analysis.weeks) {
            return Err(RestockError::ConfigValidation(format!(
                "analysis.weeks must be between 1 and {MAX_WEEKS}, got {}",
                self.analysis.weeks
            )));
        }
        if !(1..=MAX_WEEKS).contains(&self.analysis.averaging_window) {
            return Err(RestockError::ConfigValidation(format!(
                "analysis.averaging_window must be between 1 and {MAX_WEEKS}, got {}",
                self.analysis.averaging_window
            )));
        }

        for name in self.sales_columns.all() {
            if name.trim().is_empty() {
                return Err(RestockError::ConfigValidation(
                    "sales_columns entries must not be blank".into(),
                ));
            }
        }
        for name in self.rules_columns.all() {
            if name.trim().is_empty() {
                return Err(RestockError::ConfigValidation(
                    "rules_columns entries must not be blank".into(),
                ));
            }
        }

        // Two roles mapped to one header would silently read the same cell twice
        let mut seen: Vec<String> = Vec::new();
        for name in self.sales_columns.all() {
            let key = name.trim().to_lowercase();
            if seen.contains(&key) {
                return Err(RestockError::ConfigValidation(format!(
                    "sales column '{}' is mapped more than once",
                    name.trim()
                )));
            }
            seen.push(key);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = RestockConfig::from_toml("").unwrap();
        assert_eq!(config, RestockConfig::default());
        assert_eq!(config.analysis.weeks, 8);
        assert_eq!(config.analysis.averaging_window, 4);
        assert_eq!(config.analysis.rollover, RolloverRule::December31);
        assert_eq!(config.sales_columns.date, "Fecha");
        assert_eq!(config.report.max_row_diagnostics, 20);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = RestockConfig::from_toml(
            r#"
[analysis]
weeks = 12
rollover = "iso_last_week"

[sales_columns]
id = "SKU"
date = "Sale Date"

[report]
week_label = "Semana"
"#,
        )
        .unwrap();
        assert_eq!(config.analysis.weeks, 12);
        assert_eq!(config.analysis.averaging_window, 4);
        assert_eq!(config.analysis.rollover, RolloverRule::IsoLastWeek);
        assert_eq!(config.sales_columns.id, "SKU");
        assert_eq!(config.sales_columns.date, "Sale Date");
        assert_eq!(config.sales_columns.units_sold, "Unidades_Vendidas");
        assert_eq!(config.rules_columns.fixed_stock, "Stock_Fijo");
        assert_eq!(config.report.week_label, "Semana");
        assert_eq!(config.report.max_row_diagnostics, 20);
    }

    #[test]
    fn reject_zero_weeks() {
        let err = RestockConfig::from_toml("[analysis]\nweeks = 0\n").unwrap_err();
        assert!(err.to_string().contains("analysis.weeks"));
    }

    #[test]
    fn reject_zero_window() {
        let err = RestockConfig::from_toml("[analysis]\naveraging_window = 0\n").unwrap_err();
        assert!(err.to_string().contains("averaging_window"));
    }

    #[test]
    fn reject_oversized_history() {
        let err = RestockConfig::from_toml("[analysis]\nweeks = 14000000\n").unwrap_err();
        assert!(matches!(err, RestockError::ConfigValidation(_)));
        assert!(err.to_string().contains("between 1 and 520"));

        let err = RestockConfig::from_toml("[analysis]\naveraging_window = 521\n").unwrap_err();
        assert!(err.to_string().contains("averaging_window"));

        let config = RestockConfig::from_toml("[analysis]\nweeks = 520\naveraging_window = 520\n");
        assert!(config.is_ok());
    }

    #[test]
    fn reject_oversized_override() {
        let config = RestockConfig::default().with_periods(Some(MAX_WEEKS + 1), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_blank_column_name() {
        let err = RestockConfig::from_toml("[rules_columns]\nfixed_stock = \"  \"\n").unwrap_err();
        assert!(matches!(err, RestockError::ConfigValidation(_)));
    }

    #[test]
    fn reject_duplicate_sales_column() {
        let err = RestockConfig::from_toml("[sales_columns]\nname = \"id\"\n").unwrap_err();
        assert!(err.to_string().contains("mapped more than once"));
    }

    #[test]
    fn reject_unknown_rollover() {
        let err = RestockConfig::from_toml("[analysis]\nrollover = \"dec31\"\n");
        assert!(matches!(err, Err(RestockError::ConfigParse(_))));
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let config = RestockConfig::default().with_periods(Some(10), None);
        assert_eq!(config.analysis.weeks, 10);
        assert_eq!(config.analysis.averaging_window, 4);
    }
}
