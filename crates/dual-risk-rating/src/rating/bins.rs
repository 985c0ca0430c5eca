use serde::{Deserialize, Serialize};

/// One threshold of a bin table. `upper_bound: None` is the unbounded tail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinEntry {
    pub upper_bound: Option<f64>,
    pub score: f64,
}

impl BinEntry {
    pub const fn below(upper_bound: f64, score: f64) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            score,
        }
    }

    pub const fn unbounded(score: f64) -> Self {
        Self {
            upper_bound: None,
            score,
        }
    }

    fn admits(&self, value: f64) -> bool {
        self.upper_bound.map_or(true, |bound| value < bound)
    }
}

/// Ascending thresholds that discretize a continuous metric into a sub-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinTable {
    entries: Vec<BinEntry>,
}

impl BinTable {
    pub fn new(entries: Vec<BinEntry>) -> Result<Self, BinTableError> {
        let table = Self { entries };
        table.check()?;
        Ok(table)
    }

    /// Built-in tables that are known to satisfy [`BinTable::check`].
    pub(crate) fn from_sorted(entries: Vec<BinEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[BinEntry] {
        &self.entries
    }

    /// Score of the first bin whose bound strictly exceeds `value`.
    ///
    /// A value equal to a bound lands in the following bin.
    pub fn lookup(&self, value: f64) -> Result<f64, BinTableError> {
        if self.entries.is_empty() {
            return Err(BinTableError::Empty);
        }

        self.entries
            .iter()
            .find(|entry| entry.admits(value))
            .map(|entry| entry.score)
            .ok_or(BinTableError::NoMatch(value))
    }

    /// Verify the table is non-empty, ascending, and closed by an unbounded tail.
    pub fn check(&self) -> Result<(), BinTableError> {
        let (last, leading) = self.entries.split_last().ok_or(BinTableError::Empty)?;

        let mut previous: Option<f64> = None;
        for (index, entry) in leading.iter().enumerate() {
            let bound = entry
                .upper_bound
                .ok_or(BinTableError::UnboundedBeforeEnd { index })?;
            if !bound.is_finite() || !entry.score.is_finite() {
                return Err(BinTableError::NonFinite { index });
            }
            if let Some(previous) = previous {
                if bound <= previous {
                    return Err(BinTableError::Unsorted {
                        index,
                        bound,
                        previous,
                    });
                }
            }
            previous = Some(bound);
        }

        if let Some(bound) = last.upper_bound {
            if bound != f64::INFINITY {
                return Err(BinTableError::BoundedTail(bound));
            }
        }
        if !last.score.is_finite() {
            return Err(BinTableError::NonFinite {
                index: leading.len(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BinTableError {
    #[error("bin table has no entries")]
    Empty,
    #[error("bin {index} is unbounded but is not the final bin")]
    UnboundedBeforeEnd { index: usize },
    #[error("bin {index} bound {bound} does not exceed the previous bound {previous}")]
    Unsorted {
        index: usize,
        bound: f64,
        previous: f64,
    },
    #[error("bin {index} carries a non-finite bound or score")]
    NonFinite { index: usize },
    #[error("final bin must be unbounded, found bound {0}")]
    BoundedTail(f64),
    #[error("no bin covers value {0}")]
    NoMatch(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ltv_table() -> BinTable {
        BinTable::new(vec![
            BinEntry::below(30.0, 4.0),
            BinEntry::below(66.0, 5.0),
            BinEntry::unbounded(6.0),
        ])
        .expect("valid table")
    }

    #[test]
    fn lookup_returns_first_bin_above_value() {
        let table = ltv_table();
        assert_eq!(table.lookup(0.0), Ok(4.0));
        assert_eq!(table.lookup(29.999), Ok(4.0));
        assert_eq!(table.lookup(50.0), Ok(5.0));
        assert_eq!(table.lookup(250.0), Ok(6.0));
    }

    #[test]
    fn value_on_a_bound_falls_into_the_next_bin() {
        let table = ltv_table();
        assert_eq!(table.lookup(30.0), Ok(5.0));
        assert_eq!(table.lookup(66.0), Ok(6.0));
    }

    #[test]
    fn empty_table_is_a_configuration_error() {
        let table: BinTable = serde_json::from_str("[]").expect("deserializes");
        assert_eq!(table.lookup(1.0), Err(BinTableError::Empty));
        assert_eq!(BinTable::new(Vec::new()), Err(BinTableError::Empty));
    }

    #[test]
    fn check_rejects_unsorted_bounds() {
        let result = BinTable::new(vec![
            BinEntry::below(66.0, 5.0),
            BinEntry::below(30.0, 4.0),
            BinEntry::unbounded(6.0),
        ]);
        assert!(matches!(
            result,
            Err(BinTableError::Unsorted { index: 1, .. })
        ));
    }

    #[test]
    fn check_requires_unbounded_tail() {
        let result = BinTable::new(vec![BinEntry::below(30.0, 4.0), BinEntry::below(66.0, 5.0)]);
        assert_eq!(result, Err(BinTableError::BoundedTail(66.0)));

        let result = BinTable::new(vec![BinEntry::unbounded(4.0), BinEntry::unbounded(5.0)]);
        assert_eq!(result, Err(BinTableError::UnboundedBeforeEnd { index: 0 }));
    }

    #[test]
    fn unbounded_tail_serializes_as_null() {
        let json = serde_json::to_value(ltv_table()).expect("serializes");
        assert_eq!(json[2]["upper_bound"], serde_json::Value::Null);
        assert_eq!(json[0]["upper_bound"], 30.0);
    }
}
