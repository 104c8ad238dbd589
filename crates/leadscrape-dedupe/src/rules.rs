use leadscrape_core::fields;
use serde::{Deserialize, Serialize};

/// How a rule's duplicate pairs combine with the rule that follows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleOperator {
    /// Pairs found by either rule are duplicates.
    #[default]
    Or,
    /// Only pairs found by both rules are duplicates.
    And,
}

/// One declarative matching rule for [`crate::Deduplicator::deduplicate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MatchRule {
    Exact {
        columns: Vec<String>,
        #[serde(default)]
        operator: RuleOperator,
    },
    Fuzzy {
        column: String,
        #[serde(default = "default_fuzzy_threshold")]
        threshold: f64,
        #[serde(default)]
        additional_exact: Vec<String>,
        #[serde(default)]
        operator: RuleOperator,
    },
}

impl MatchRule {
    #[must_use]
    pub fn exact<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self::Exact {
            columns: columns.into_iter().map(Into::into).collect(),
            operator: RuleOperator::Or,
        }
    }

    #[must_use]
    pub fn fuzzy(column: impl Into<String>, threshold: f64) -> Self {
        Self::Fuzzy {
            column: column.into(),
            threshold,
            additional_exact: Vec::new(),
            operator: RuleOperator::Or,
        }
    }

    #[must_use]
    pub fn with_additional_exact<S: Into<String>>(
        self,
        extra: impl IntoIterator<Item = S>,
    ) -> Self {
        match self {
            Self::Fuzzy {
                column,
                threshold,
                operator,
                ..
            } => Self::Fuzzy {
                column,
                threshold,
                additional_exact: extra.into_iter().map(Into::into).collect(),
                operator,
            },
            exact @ Self::Exact { .. } => exact,
        }
    }

    #[must_use]
    pub fn with_operator(mut self, op: RuleOperator) -> Self {
        match &mut self {
            Self::Exact { operator, .. } | Self::Fuzzy { operator, .. } => *operator = op,
        }
        self
    }

    #[must_use]
    pub fn operator(&self) -> RuleOperator {
        match self {
            Self::Exact { operator, .. } | Self::Fuzzy { operator, .. } => *operator,
        }
    }

    /// Every column the rule reads.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Exact { columns, .. } => columns.iter().map(String::as_str).collect(),
            Self::Fuzzy {
                column,
                additional_exact,
                ..
            } => std::iter::once(column.as_str())
                .chain(additional_exact.iter().map(String::as_str))
                .collect(),
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    80.0
}

/// Exact email, OR exact phone, OR business names at least 80 % similar.
#[must_use]
pub fn default_rules() -> Vec<MatchRule> {
    vec![
        MatchRule::exact([fields::EMAIL]),
        MatchRule::exact([fields::PHONE]),
        MatchRule::fuzzy(fields::BUSINESS_NAME, default_fuzzy_threshold()),
    ]
}
