//! Exact non-negative fractions for comparing and dividing error bounds.

use std::cmp::Ordering;

/// `num / den` with `den > 0`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Ratio {
    num: i128,
    den: i128,
}

impl Ratio {
    pub(crate) const ZERO: Self = Self { num: 0, den: 1 };

    /// Callers pass a positive denominator.
    pub(crate) fn new(num: i128, den: i128) -> Self {
        debug_assert!(den > 0, "ratio denominator must be positive");
        Self { num, den }
    }

    pub(crate) fn is_positive(&self) -> bool {
        self.num > 0
    }

    pub(crate) fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// `floor(self / other)` for a positive `other`, saturating at `u64::MAX`.
    pub(crate) fn floor_div(self, other: Self) -> u64 {
        if self.num <= 0 || other.num <= 0 {
            return 0;
        }
        let q = (self.num * other.den) / (self.den * other.num);
        u64::try_from(q).unwrap_or(u64::MAX)
    }
}

impl PartialEq for Ratio {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ratio {}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}
