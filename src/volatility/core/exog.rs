//! Tagged exogenous regressors for the variance equation.
//!
//! Purpose
//! -------
//! Hold the exogenous design matrix as named columns, each carrying an
//! explicit [`ExogTag`] supplied by whoever built the column. Results use the
//! tag to group coefficients (event effects vs. sentiment effects), so
//! classification is a property of the data rather than of the column name.
//!
//! Key behaviors
//! -------------
//! - [`ExogMatrix::new`] validates lengths, finiteness, and name uniqueness
//!   and packs the columns into a dense `n × k` array for the filter.
//! - [`ExogMatrix::aggregate_by_tag`] collapses columns sharing a tag into
//!   one column per tag. This is the reduced design used when a fit with the
//!   full exogenous set fails to converge.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every column is index-aligned with the return series (`n_obs` rows).
//! - Values are finite. Their scale is not checked: indicators in {0, 0.5, 1}
//!   and continuous z-scores are both accepted. How overlapping event windows
//!   are weighted is decided upstream when the columns are built.
//! - `k = 0` is valid and yields the plain asymmetric GARCH recursion.
use crate::volatility::errors::{TarchError, TarchResult};
use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;
use std::fmt;

/// Category attached to an exogenous column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ExogTag {
    /// Event-window indicator (e.g. infrastructure or regulatory events).
    Event,
    /// Continuous sentiment index.
    Sentiment,
    /// Any other caller-defined category.
    Custom(String),
}

impl fmt::Display for ExogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExogTag::Event => write!(f, "event"),
            ExogTag::Sentiment => write!(f, "sentiment"),
            ExogTag::Custom(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for ExogTag {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "event" => ExogTag::Event,
            "sentiment" => ExogTag::Sentiment,
            _ => ExogTag::Custom(s.to_string()),
        }
    }
}

/// How columns sharing a tag are combined by [`ExogMatrix::aggregate_by_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AggregationRule {
    /// Element-wise sum: overlapping effects add up.
    #[default]
    Sum,
    /// Element-wise maximum: a single "any event active" style indicator.
    Max,
}

/// One named, tagged regressor.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogColumn {
    pub name: String,
    pub tag: ExogTag,
    pub values: Array1<f64>,
}

impl ExogColumn {
    pub fn new(name: impl Into<String>, tag: ExogTag, values: Array1<f64>) -> Self {
        Self { name: name.into(), tag, values }
    }
}

/// Validated `n × k` exogenous design with per-column metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogMatrix {
    names: Vec<String>,
    tags: Vec<ExogTag>,
    values: Array2<f64>,
}

impl ExogMatrix {
    /// Build a design matrix for a series of `n_obs` returns.
    ///
    /// Errors
    /// ------
    /// - `TarchError::ExogLengthMismatch` if a column is not `n_obs` long.
    /// - `TarchError::NonFiniteExog` for the first NaN/±inf value.
    /// - `TarchError::DuplicateExogName` if two columns share a name.
    pub fn new(n_obs: usize, columns: Vec<ExogColumn>) -> TarchResult<Self> {
        let k = columns.len();
        let mut names = Vec::with_capacity(k);
        let mut tags = Vec::with_capacity(k);
        let mut values = Array2::zeros((n_obs, k));
        for (j, column) in columns.into_iter().enumerate() {
            if column.values.len() != n_obs {
                return Err(TarchError::ExogLengthMismatch {
                    column: column.name,
                    expected: n_obs,
                    found: column.values.len(),
                });
            }
            if let Some((index, &value)) =
                column.values.iter().enumerate().find(|(_, v)| !v.is_finite())
            {
                return Err(TarchError::NonFiniteExog { column: column.name, index, value });
            }
            if names.contains(&column.name) {
                return Err(TarchError::DuplicateExogName { name: column.name });
            }
            values.column_mut(j).assign(&column.values);
            names.push(column.name);
            tags.push(column.tag);
        }
        Ok(Self { names, tags, values })
    }

    /// Design with no columns (`k = 0`).
    pub fn empty(n_obs: usize) -> Self {
        Self { names: Vec::new(), tags: Vec::new(), values: Array2::zeros((n_obs, 0)) }
    }

    pub fn k(&self) -> usize {
        self.names.len()
    }

    pub fn n_obs(&self) -> usize {
        self.values.nrows()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn tags(&self) -> &[ExogTag] {
        &self.tags
    }

    /// Regressor values at time `t` (length `k`).
    pub fn row(&self, t: usize) -> ArrayView1<'_, f64> {
        self.values.row(t)
    }

    pub fn column(&self, j: usize) -> ArrayView1<'_, f64> {
        self.values.column(j)
    }

    /// Distinct tags in order of first appearance.
    pub fn distinct_tags(&self) -> Vec<ExogTag> {
        let mut seen: Vec<ExogTag> = Vec::new();
        for tag in &self.tags {
            if !seen.contains(tag) {
                seen.push(tag.clone());
            }
        }
        seen
    }

    /// Collapse columns that share a tag into one column per tag.
    ///
    /// Output columns follow the order in which tags first appear and are
    /// named `"<tag>_aggregate"`. A tag carried by a single column is kept
    /// under the aggregate name with unchanged values.
    pub fn aggregate_by_tag(&self, rule: AggregationRule) -> ExogMatrix {
        let groups = self.distinct_tags();
        let n = self.n_obs();
        let mut values = Array2::zeros((n, groups.len()));
        let mut names = Vec::with_capacity(groups.len());
        for (g, tag) in groups.iter().enumerate() {
            let members: Vec<usize> = (0..self.k()).filter(|&j| &self.tags[j] == tag).collect();
            for t in 0..n {
                let mut acc = match rule {
                    AggregationRule::Sum => 0.0,
                    AggregationRule::Max => f64::NEG_INFINITY,
                };
                for &j in &members {
                    let x = self.values[[t, j]];
                    acc = match rule {
                        AggregationRule::Sum => acc + x,
                        AggregationRule::Max => acc.max(x),
                    };
                }
                values[[t, g]] = acc;
            }
            names.push(format!("{tag}_aggregate"));
        }
        ExogMatrix { names, tags: groups, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation in `ExogMatrix::new` (length, finiteness, duplicate names).
    // - Dense packing and row access.
    // - Tag aggregation under both rules.
    // -------------------------------------------------------------------------

    fn columns() -> Vec<ExogColumn> {
        vec![
            ExogColumn::new("etf_approval", ExogTag::Event, array![0.0, 1.0, 1.0, 0.0]),
            ExogColumn::new("fear_greed", ExogTag::Sentiment, array![0.3, -1.2, 0.0, 2.0]),
            ExogColumn::new("exchange_hack", ExogTag::Event, array![0.0, 0.5, 1.0, 1.0]),
        ]
    }

    #[test]
    // Purpose
    // -------
    // Build a valid matrix and read it back by row and column.
    //
    // Given
    // -----
    // - Three aligned columns of length 4.
    //
    // Expect
    // ------
    // - `k = 3`, `n_obs = 4`, row 1 = (1, -1.2, 0.5), names and tags preserved.
    fn new_packs_columns_in_order() {
        // Act
        let exog = ExogMatrix::new(4, columns()).expect("matrix should build");

        // Assert
        assert_eq!(exog.k(), 3);
        assert_eq!(exog.n_obs(), 4);
        assert_eq!(exog.row(1), array![1.0, -1.2, 0.5]);
        assert_eq!(exog.names()[2], "exchange_hack");
        assert_eq!(exog.tags()[1], ExogTag::Sentiment);
    }

    #[test]
    // Purpose
    // -------
    // Reject misaligned, non-finite, and duplicate columns.
    //
    // Given
    // -----
    // - A short column, a column with NaN, and two columns with one name.
    //
    // Expect
    // ------
    // - The matching `TarchError` variant in each case.
    fn new_rejects_malformed_columns() {
        // Arrange
        let short = vec![ExogColumn::new("a", ExogTag::Event, array![1.0, 0.0])];
        let nan = vec![ExogColumn::new("b", ExogTag::Event, array![0.0, f64::NAN, 0.0])];
        let dup = vec![
            ExogColumn::new("c", ExogTag::Event, array![0.0, 0.0, 0.0]),
            ExogColumn::new("c", ExogTag::Sentiment, array![1.0, 1.0, 1.0]),
        ];

        // Act / Assert
        assert!(matches!(
            ExogMatrix::new(3, short),
            Err(TarchError::ExogLengthMismatch { expected: 3, found: 2, .. })
        ));
        assert!(matches!(
            ExogMatrix::new(3, nan),
            Err(TarchError::NonFiniteExog { index: 1, .. })
        ));
        assert_eq!(
            ExogMatrix::new(3, dup),
            Err(TarchError::DuplicateExogName { name: "c".to_string() })
        );
    }

    #[test]
    // Purpose
    // -------
    // Aggregate event columns together while leaving sentiment alone.
    //
    // Given
    // -----
    // - Two event columns and one sentiment column.
    //
    // Expect
    // ------
    // - Sum: event aggregate = (0, 1.5, 2, 1); Max: (0, 1, 1, 1).
    // - Sentiment values unchanged; names end in `_aggregate`.
    fn aggregate_by_tag_combines_columns_per_tag() {
        // Arrange
        let exog = ExogMatrix::new(4, columns()).expect("matrix should build");

        // Act
        let summed = exog.aggregate_by_tag(AggregationRule::Sum);
        let maxed = exog.aggregate_by_tag(AggregationRule::Max);

        // Assert
        assert_eq!(summed.k(), 2);
        assert_eq!(summed.names(), &["event_aggregate", "sentiment_aggregate"]);
        assert_eq!(summed.column(0), array![0.0, 1.5, 2.0, 1.0]);
        assert_eq!(summed.column(1), array![0.3, -1.2, 0.0, 2.0]);
        assert_eq!(maxed.column(0), array![0.0, 1.0, 1.0, 1.0]);
        assert_eq!(maxed.tags(), &[ExogTag::Event, ExogTag::Sentiment]);
    }
}
