//! Collapse per-hand gestures into the single cycle gesture.

use crate::types::GestureSymbol;

/// First hand's gesture if it has one, else the second hand's.
///
/// Detection order is whatever the estimator reports, which is not stable
/// across cycles. Two hands showing different gestures are not combined.
pub fn reduce(per_hand: &[GestureSymbol]) -> GestureSymbol {
    match per_hand {
        [] => GestureSymbol::None,
        [only] => *only,
        [first, second, ..] => {
            if !first.is_none() {
                *first
            } else {
                *second
            }
        }
    }
}
