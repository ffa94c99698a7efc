//! Sample draws produced by the consistent sampler.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::manifest::BatchKey;

/// A ticket number: a binary fraction in [0, 1) with 64 bits of precision.
///
/// Rendered and serialized as a fixed 9-decimal-digit string such as
/// `"0.003875995"`. Ordering follows the underlying fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketNumber(u64);

impl TicketNumber {
    /// Digits after the decimal point in the rendered form.
    pub const DIGITS: u32 = 9;

    /// Build from the numerator over 2^64.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 18_446_744_073_709_551_616.0
    }

    /// The rendered digits, `floor(ticket * 10^9)`.
    pub fn decimal_digits(&self) -> u64 {
        let scale = 10u128.pow(Self::DIGITS);
        ((u128::from(self.0) * scale) >> 64) as u64
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0.{:09}", self.decimal_digits())
    }
}

impl Serialize for TicketNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What a draw selected.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampledUnit {
    /// One ballot, `position` counted from 1 within its batch.
    Ballot { batch: BatchKey, position: u64 },
    /// A whole batch (batch-comparison audits).
    Batch { batch: BatchKey },
}

impl SampledUnit {
    pub fn batch(&self) -> &BatchKey {
        match self {
            Self::Ballot { batch, .. } | Self::Batch { batch } => batch,
        }
    }
}

/// One element of a sample.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SampleDraw {
    pub ticket: TicketNumber,
    pub unit: SampledUnit,
    /// How many times this unit has been drawn so far, counting this draw.
    pub times_sampled: u32,
}
