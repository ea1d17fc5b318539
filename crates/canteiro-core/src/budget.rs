//! Financial efficiency from an external budget correlation
//!
//! Linking a project to a row of the approved-budget table is someone else's
//! job. The core only consumes the outcome through [`BudgetSource`]: either
//! no correlation, or the approved budget and realized value in [`BudgetFigures`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Budget correlation
// ============================================================================

/// Monetary figures for one correlated project
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetFigures {
    /// Orçamento aprovado
    pub approved: Decimal,
    /// Valor realizado
    pub realized: Decimal,
}

/// Supplies budget figures for a project, or `None` when no correlation exists
pub trait BudgetSource {
    fn correlate(&self, code: &str, name: &str) -> Option<BudgetFigures>;
}

/// Source that never correlates
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBudget;

impl BudgetSource for NoBudget {
    fn correlate(&self, _code: &str, _name: &str) -> Option<BudgetFigures> {
        None
    }
}

/// One `[[budget]]` entry in the configuration file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub code: String,
    pub approved: Decimal,
    pub realized: Decimal,
}

/// Budget figures keyed by exact project code
#[derive(Clone, Debug, Default)]
pub struct BudgetTable {
    entries: HashMap<String, BudgetFigures>,
}

impl BudgetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, figures: BudgetFigures) {
        self.entries.insert(code.into(), figures);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&[BudgetEntry]> for BudgetTable {
    fn from(entries: &[BudgetEntry]) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.insert(
                entry.code.trim(),
                BudgetFigures {
                    approved: entry.approved,
                    realized: entry.realized,
                },
            );
        }
        table
    }
}

impl BudgetSource for BudgetTable {
    fn correlate(&self, code: &str, _name: &str) -> Option<BudgetFigures> {
        self.entries.get(code.trim()).cloned()
    }
}

// ============================================================================
// Efficiency
// ============================================================================

/// Execution efficiency bucket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyCategory {
    /// Up to 120%
    Efficient,
    /// 121% to 150%
    Attention,
    /// Above 150%
    Critical,
}

impl EfficiencyCategory {
    pub fn from_percent(percent: i64) -> Self {
        match percent {
            p if p <= 120 => EfficiencyCategory::Efficient,
            p if p <= 150 => EfficiencyCategory::Attention,
            _ => EfficiencyCategory::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EfficiencyCategory::Efficient => "Eficiente",
            EfficiencyCategory::Attention => "Atenção",
            EfficiencyCategory::Critical => "Crítico",
        }
    }
}

impl std::fmt::Display for EfficiencyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Realized value over approved budget.
///
/// `Unavailable` is its own state: it is never folded into 0% or 100%.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FinancialEfficiency {
    Unavailable,
    Available {
        /// round(100 * realized / approved)
        percent: i64,
        category: EfficiencyCategory,
    },
}

impl FinancialEfficiency {
    /// Compute efficiency from correlated figures.
    ///
    /// A zero approved budget, or a ratio that overflows `Decimal`, is
    /// reported as unavailable.
    pub fn from_figures(figures: Option<&BudgetFigures>) -> Self {
        let Some(figures) = figures else {
            return FinancialEfficiency::Unavailable;
        };
        if figures.approved.is_zero() {
            return FinancialEfficiency::Unavailable;
        }

        let percent = figures
            .realized
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(figures.approved))
            .map(|ratio| ratio.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|ratio| ratio.to_i64());
        match percent {
            Some(percent) => FinancialEfficiency::Available {
                percent,
                category: EfficiencyCategory::from_percent(percent),
            },
            None => FinancialEfficiency::Unavailable,
        }
    }

    pub fn percent(&self) -> Option<i64> {
        match self {
            FinancialEfficiency::Available { percent, .. } => Some(*percent),
            FinancialEfficiency::Unavailable => None,
        }
    }

    pub fn category(&self) -> Option<EfficiencyCategory> {
        match self {
            FinancialEfficiency::Available { category, .. } => Some(*category),
            FinancialEfficiency::Unavailable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn figures(approved: Decimal, realized: Decimal) -> BudgetFigures {
        BudgetFigures { approved, realized }
    }

    #[test]
    fn one_hundred_fifty_is_attention() {
        let eff = FinancialEfficiency::from_figures(Some(&figures(dec!(100000), dec!(150000))));
        assert_eq!(
            eff,
            FinancialEfficiency::Available {
                percent: 150,
                category: EfficiencyCategory::Attention
            }
        );
    }

    #[test]
    fn category_boundaries() {
        assert_eq!(EfficiencyCategory::from_percent(120), EfficiencyCategory::Efficient);
        assert_eq!(EfficiencyCategory::from_percent(121), EfficiencyCategory::Attention);
        assert_eq!(EfficiencyCategory::from_percent(150), EfficiencyCategory::Attention);
        assert_eq!(EfficiencyCategory::from_percent(151), EfficiencyCategory::Critical);
        assert_eq!(EfficiencyCategory::from_percent(0), EfficiencyCategory::Efficient);
    }

    #[test]
    fn ratio_is_rounded() {
        let eff = FinancialEfficiency::from_figures(Some(&figures(dec!(300), dec!(361.5))));
        assert_eq!(eff.percent(), Some(121));
        assert_eq!(eff.category(), Some(EfficiencyCategory::Attention));
    }

    #[test]
    fn no_correlation_is_unavailable() {
        let eff = FinancialEfficiency::from_figures(None);
        assert_eq!(eff, FinancialEfficiency::Unavailable);
        assert_eq!(eff.percent(), None);
        assert_eq!(eff.category(), None);
    }

    #[test]
    fn zero_budget_is_unavailable() {
        let eff = FinancialEfficiency::from_figures(Some(&figures(dec!(0), dec!(10))));
        assert_eq!(eff, FinancialEfficiency::Unavailable);
    }

    #[test]
    fn overflowing_ratio_is_unavailable() {
        let tiny_budget = figures(dec!(0.000000000000000000001), dec!(1000000000));
        assert_eq!(
            FinancialEfficiency::from_figures(Some(&tiny_budget)),
            FinancialEfficiency::Unavailable
        );

        let huge_realized = figures(dec!(1), Decimal::MAX);
        assert_eq!(
            FinancialEfficiency::from_figures(Some(&huge_realized)),
            FinancialEfficiency::Unavailable
        );
    }

    #[test]
    fn budget_table_matches_trimmed_code() {
        let entries = vec![BudgetEntry {
            code: " R200-1 ".into(),
            approved: dec!(100),
            realized: dec!(90),
        }];
        assert!(BudgetTable::new().is_empty());
        let table = BudgetTable::from(entries.as_slice());

        assert!(!table.is_empty());
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.correlate("R200-1", "Obra X"),
            Some(figures(dec!(100), dec!(90)))
        );
        assert_eq!(table.correlate("R300", "Obra Y"), None);
        assert_eq!(NoBudget.correlate("R200-1", "Obra X"), None);
    }
}
