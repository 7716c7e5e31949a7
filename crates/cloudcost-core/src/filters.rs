//! Filter expressions for billing queries
//!
//! A small expression tree over billing dimensions, mirroring the shape the
//! Cost Explorer API accepts: dimension matches combined with `Not`, `And`
//! and `Or`.
//!
//! # Examples
//!
//! ```
//! use cloudcost_core::filters::FilterExpression;
//! use cloudcost_core::types::Dimension;
//!
//! // Exclude credits and refunds
//! let filter = FilterExpression::dimension_not_in(Dimension::RecordType, ["Credit", "Refund"]);
//! assert!(!filter.matches(&[(Dimension::RecordType, "Credit")]));
//! assert!(filter.matches(&[(Dimension::RecordType, "Usage")]));
//! ```

use crate::types::Dimension;

/// Filter applied to a billing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    /// Dimension equals one of the values
    Dimension {
        key: Dimension,
        values: Vec<String>,
    },
    Not(Box<FilterExpression>),
    And(Vec<FilterExpression>),
    Or(Vec<FilterExpression>),
}

impl FilterExpression {
    /// Match records whose dimension equals any of `values`
    pub fn dimension_in<I, S>(key: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterExpression::Dimension {
            key,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Match records whose dimension equals none of `values`
    pub fn dimension_not_in<I, S>(key: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterExpression::Not(Box::new(Self::dimension_in(key, values)))
    }

    /// Evaluate the expression against a set of dimension values
    ///
    /// Used by in-memory billing sources; a dimension absent from `attributes`
    /// never matches.
    pub fn matches(&self, attributes: &[(Dimension, &str)]) -> bool {
        match self {
            FilterExpression::Dimension { key, values } => attributes
                .iter()
                .any(|(d, v)| d == key && values.iter().any(|candidate| candidate == v)),
            FilterExpression::Not(inner) => !inner.matches(attributes),
            FilterExpression::And(all) => all.iter().all(|e| e.matches(attributes)),
            FilterExpression::Or(any) => any.iter().any(|e| e.matches(attributes)),
        }
    }
}
