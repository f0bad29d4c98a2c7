//! List query parameters.

use kvmodel_codec::Value;

/// Page size used when a query does not set one.
pub const DEFAULT_LIMIT: usize = 10;

/// Direction of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Lowest score first.
    #[default]
    Ascending,
    /// Highest score first.
    Descending,
}

impl Order {
    /// Returns true for [`Order::Descending`].
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Order::Descending)
    }
}

/// A window over an index.
///
/// Without bounds the window is positional: ranks `offset` through
/// `offset + limit`, both inclusive. With either bound the query selects
/// scores in `[min, max]` (a missing bound is infinite) and returns at most
/// `limit` of them after skipping `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListQuery {
    /// Direction.
    pub order: Order,
    /// Members to skip.
    pub offset: usize,
    /// Page size.
    pub limit: usize,
    /// Lowest accepted score.
    pub min: Option<f64>,
    /// Highest accepted score.
    pub max: Option<f64>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            order: Order::Ascending,
            offset: 0,
            limit: DEFAULT_LIMIT,
            min: None,
            max: None,
        }
    }
}

impl ListQuery {
    /// An ascending query over the first page.
    #[must_use]
    pub fn ascending() -> Self {
        Self::default()
    }

    /// A descending query over the first page.
    #[must_use]
    pub fn descending() -> Self {
        Self {
            order: Order::Descending,
            ..Self::default()
        }
    }

    /// An ascending query over scores in `[min, max]`.
    #[must_use]
    pub fn range(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self::ascending().min(min).max(max)
    }

    /// Sets the number of members to skip.
    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the lower score bound from a value, scored like an index entry.
    #[must_use]
    pub fn min(mut self, min: impl Into<Value>) -> Self {
        self.min = Some(min.into().score());
        self
    }

    /// Sets the upper score bound from a value, scored like an index entry.
    #[must_use]
    pub fn max(mut self, max: impl Into<Value>) -> Self {
        self.max = Some(max.into().score());
        self
    }

    /// Returns true if the query selects by score.
    #[must_use]
    pub fn is_ranged(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}
