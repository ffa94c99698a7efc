//! Margin calculator.
//!
//! Turns reported contest tallies into the per-candidate shares every audit
//! method starts from:
//! - `p` = votes / ballots cast
//! - `s` = votes / total candidate votes
//! - `swl` = each winner's share of the two-candidate vote against each loser

pub mod compute;

pub use compute::{compute_margins, contest_margins};
