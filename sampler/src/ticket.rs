//! Ticket-number construction.
//!
//! - `seed_hash` = lowercase hex of SHA-256 over the UTF-8 seed.
//! - Every sampling id is a string. A batch renders as its bare name when
//!   it has no jurisdiction, else as the tuple `('<jurisdiction>', '<batch>')`,
//!   using Python's `str`/`repr` quoting. A ballot id is `(<batch repr>, <i>)`
//!   with a 0-based index `i`. Copy `c` of a weighted batch is `<batch>.<c>`.
//! - Draw `k` (1-indexed) of an id hashes `id + seed_hash`, followed by
//!   `",k"` for every draw after the first. The digest, read big-endian, is
//!   a fraction `u` of 2^256, truncated here to its leading 64 bits.
//! - An id's ticket moves from `t` to `t + (1 - t) * u`, tracked exactly as
//!   the integer `remaining = 2^64 * (1 - t)`.

use std::fmt::Write as _;

use rla_types::{BatchKey, TicketNumber};
use sha2::{Digest, Sha256};

const TWO_64: u128 = 1 << 64;

/// Hex-encoded SHA-256 of the seed.
pub fn seed_hash(seed: &str) -> String {
    hex::encode(Sha256::digest(seed.as_bytes()))
}

/// Python `repr` of a string literal.
pub fn py_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = u32::from(c);
                let _ = if code <= 0xff {
                    write!(out, "\\x{code:02x}")
                } else {
                    write!(out, "\\u{code:04x}")
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// `str` and `repr` renderings of a batch key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchLabel {
    pub str_form: String,
    pub repr_form: String,
}

impl BatchLabel {
    pub fn new(key: &BatchKey) -> Self {
        if key.jurisdiction.is_empty() {
            return Self {
                str_form: key.batch.clone(),
                repr_form: py_repr(&key.batch),
            };
        }
        let tuple = format!("({}, {})", py_repr(&key.jurisdiction), py_repr(&key.batch));
        Self {
            str_form: tuple.clone(),
            repr_form: tuple,
        }
    }

    /// Id of the ballot at 0-based `index` within the batch.
    pub fn ballot_id(&self, index: u64) -> String {
        format!("({}, {index})", self.repr_form)
    }

    /// Id of virtual copy `copy` of a weighted batch.
    pub fn copy_id(&self, copy: u64) -> String {
        format!("{}.{copy}", self.str_form)
    }
}

/// Uniform 64-bit value for draw `draw` (1-indexed) of `id`.
pub fn draw_uniform(id: &str, seed_hash: &str, draw: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(seed_hash.as_bytes());
    if draw > 1 {
        hasher.update(format!(",{draw}").as_bytes());
    }
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// The ascending ticket sequence of one id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TicketStream {
    /// `2^64 * (1 - ticket)`, in (0, 2^64].
    remaining: u128,
}

impl TicketStream {
    pub fn new() -> Self {
        Self { remaining: TWO_64 }
    }

    /// Move to the next ticket using uniform `u` (a fraction of 2^64).
    pub fn advance(&mut self, u: u64) {
        let step = (self.remaining * u128::from(u) + (TWO_64 - 1)) >> 64;
        self.remaining -= step;
    }

    pub fn ticket(&self) -> TicketNumber {
        let raw = (TWO_64 - self.remaining).min(TWO_64 - 1);
        TicketNumber::from_raw(raw as u64)
    }
}

impl Default for TicketStream {
    fn default() -> Self {
        Self::new()
    }
}
