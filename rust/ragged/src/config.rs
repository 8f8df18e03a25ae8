//! Selection settings and the policy enums of the carry engine.

use ragged_common::{Result, error::Error};

/// Default upper bound on the number of dimensional units in one selector.
pub const MAX_DIMS: usize = 32;

/// Configuration for [`getitem_with`](crate::getitem::getitem_with).
#[derive(Debug, Clone)]
pub struct SliceConfig {
    /// Broadcast all integer-array units of a selector to a common shape
    /// before slicing.
    pub broadcast_arrays: bool,
    /// Maximum number of dimensional units (integers, ranges, arrays) in one
    /// selector.
    pub max_dims: usize,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            broadcast_arrays: true,
            max_dims: MAX_DIMS,
        }
    }
}

impl SliceConfig {
    pub fn with_broadcast_arrays(mut self, broadcast_arrays: bool) -> Self {
        self.broadcast_arrays = broadcast_arrays;
        self
    }

    pub fn with_max_dims(mut self, max_dims: usize) -> Self {
        self.max_dims = max_dims;
        self
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_dims == 0 {
            return Err(Error::invalid_arg("max_dims", "must be greater than 0"));
        }
        Ok(())
    }
}

/// How a carry may be applied to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryMode {
    /// Every field of a record is re-indexed immediately.
    Eager,
    /// Records may defer the carry behind an `IndexedArray`.
    Lazy,
    /// Like `Lazy`; the carry buffer is a private copy that may be normalized
    /// in place.
    LazyCopied,
}

impl CarryMode {
    pub fn is_lazy(&self) -> bool {
        !matches!(self, CarryMode::Eager)
    }

    pub fn is_copied(&self) -> bool {
        matches!(self, CarryMode::LazyCopied)
    }
}

/// Error kind raised by a carry with out-of-range entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfBounds {
    /// [`ErrorKind::NestedIndex`](ragged_common::error::ErrorKind::NestedIndex)
    /// naming the node.
    Nested,
    /// Plain [`ErrorKind::Index`](ragged_common::error::ErrorKind::Index).
    Plain,
}

#[cfg(test)]
mod tests {
    use super::{CarryMode, SliceConfig};

    #[test]
    fn test_defaults_validate() {
        let config = SliceConfig::default();
        assert!(config.broadcast_arrays);
        assert!(config.validate().is_ok());
        assert!(config.with_max_dims(0).validate().is_err());
    }

    #[test]
    fn test_carry_mode() {
        assert!(!CarryMode::Eager.is_lazy());
        assert!(CarryMode::LazyCopied.is_lazy());
        assert!(CarryMode::LazyCopied.is_copied());
        assert!(!CarryMode::Lazy.is_copied());
    }
}
