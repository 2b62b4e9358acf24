//! Burn/keep split of a commission amount.

use serde::{Deserialize, Serialize};

use crate::units::{Amount, percentage_of};

/// Commission divided into the burned and the retained portion.
///
/// `burn + keep` always equals the input exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnSplit {
    pub burn: Amount,
    pub keep: Amount,
}

/// Split `total` under `burn_rate`.
///
/// The burn side is `floor(total * burn_rate)`; the keep side is the exact
/// remainder, so rounding never leaks value.
pub fn split(total: &Amount, burn_rate: f64) -> BurnSplit {
    if total.is_zero() {
        return BurnSplit {
            burn: Amount::zero(),
            keep: Amount::zero(),
        };
    }

    let burn = percentage_of(total, burn_rate).min(total.clone());
    let keep = total.checked_sub(&burn).unwrap_or_default();

    BurnSplit { burn, keep }
}
