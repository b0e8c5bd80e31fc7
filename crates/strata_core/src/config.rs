//! # Growth Configuration
//!
//! Controls how [`DynamicArray`](crate::DynamicArray) picks a new capacity
//! when it runs out of room. Policies can be loaded from TOML:
//!
//! ```toml
//! factor = 2
//! min_capacity = 16
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, ContainerResult};

/// Geometric growth policy for dynamic storage.
///
/// Growth is always multiplicative so that pushes are amortized O(1).
/// A factor below 2 is rejected by [`GrowthPolicy::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrowthPolicy {
    /// Capacity multiplier applied on every reallocation.
    factor: usize,
    /// Smallest non-zero capacity ever allocated.
    min_capacity: usize,
}

impl GrowthPolicy {
    /// Doubling, starting at four slots.
    pub const DEFAULT: Self = Self {
        factor: 2,
        min_capacity: 4,
    };

    /// Creates a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::InvalidConfig`] if `factor < 2` or
    /// `min_capacity == 0`.
    pub fn new(factor: usize, min_capacity: usize) -> ContainerResult<Self> {
        let policy = Self {
            factor,
            min_capacity,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Parses and validates a policy from a TOML document.
    ///
    /// Missing keys fall back to [`GrowthPolicy::DEFAULT`].
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::InvalidConfig`] on malformed TOML, unknown
    /// keys, or values rejected by [`GrowthPolicy::validate`].
    pub fn from_toml_str(source: &str) -> ContainerResult<Self> {
        let policy: Self =
            toml::from_str(source).map_err(|e| ContainerError::InvalidConfig(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Checks the policy invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::InvalidConfig`] describing the first
    /// violated invariant.
    pub fn validate(&self) -> ContainerResult<()> {
        if self.factor < 2 {
            return Err(ContainerError::InvalidConfig(format!(
                "growth factor must be at least 2, got {}",
                self.factor
            )));
        }
        if self.min_capacity == 0 {
            return Err(ContainerError::InvalidConfig(
                "min_capacity must be non-zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// Capacity multiplier.
    #[inline]
    #[must_use]
    pub const fn factor(&self) -> usize {
        self.factor
    }

    /// Smallest non-zero capacity.
    #[inline]
    #[must_use]
    pub const fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Computes the capacity to allocate when `current` slots are not
    /// enough to hold `required` elements.
    ///
    /// The result is never below `required`. If geometric growth would
    /// overflow, `required` itself is returned.
    #[inline]
    #[must_use]
    pub fn next_capacity(&self, current: usize, required: usize) -> usize {
        // Deserialized policies skip `validate`, so clamp here as well.
        let factor = self.factor.max(2);
        let min_capacity = self.min_capacity.max(1);
        current
            .checked_mul(factor)
            .unwrap_or(required)
            .max(required)
            .max(min_capacity)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_doubles() {
        let policy = GrowthPolicy::default();
        assert_eq!(policy.next_capacity(0, 1), 4);
        assert_eq!(policy.next_capacity(4, 5), 8);
        assert_eq!(policy.next_capacity(8, 9), 16);
    }

    #[test]
    fn test_required_wins_over_factor() {
        let policy = GrowthPolicy::default();
        assert_eq!(policy.next_capacity(8, 100), 100);
    }

    #[test]
    fn test_overflowing_growth_falls_back_to_required() {
        let policy = GrowthPolicy::default();
        let current = usize::MAX / 2 + 1;
        assert_eq!(policy.next_capacity(current, current + 1), current + 1);
    }

    #[test]
    fn test_rejects_linear_growth() {
        assert!(matches!(
            GrowthPolicy::new(1, 4),
            Err(ContainerError::InvalidConfig(_))
        ));
        assert!(matches!(
            GrowthPolicy::new(2, 0),
            Err(ContainerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_toml() {
        let policy = GrowthPolicy::from_toml_str("factor = 3\nmin_capacity = 16\n").unwrap();
        assert_eq!(policy.factor(), 3);
        assert_eq!(policy.min_capacity(), 16);

        let partial = GrowthPolicy::from_toml_str("min_capacity = 32").unwrap();
        assert_eq!(partial.factor(), 2);
        assert_eq!(partial.min_capacity(), 32);
    }

    #[test]
    fn test_from_toml_rejects_bad_documents() {
        assert!(GrowthPolicy::from_toml_str("factor = 1").is_err());
        assert!(GrowthPolicy::from_toml_str("speed = 9").is_err());
        assert!(GrowthPolicy::from_toml_str("factor = ").is_err());
    }
}
