//! Batched writes.

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Write a string value.
    Set {
        /// Target key.
        key: String,
        /// Value to store.
        value: String,
    },
    /// Add or re-score a sorted-set member.
    ZAdd {
        /// Sorted-set key.
        key: String,
        /// Member score.
        score: f64,
        /// Member name.
        member: String,
    },
}

impl BatchOp {
    /// Returns the key this operation writes.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            BatchOp::Set { key, .. } | BatchOp::ZAdd { key, .. } => key,
        }
    }
}

/// An ordered list of writes dispatched together.
///
/// Batches mirror a pipelined `MULTI`: the store receives them as one unit
/// but does not promise atomicity across the keys they touch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a string write.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Queues a sorted-set insert.
    pub fn zadd(&mut self, key: impl Into<String>, score: f64, member: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::ZAdd {
            key: key.into(),
            score,
            member: member.into(),
        });
        self
    }

    /// Returns the queued operations.
    #[must_use]
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Consumes the batch, returning its operations in order.
    #[must_use]
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }

    /// Number of queued operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
