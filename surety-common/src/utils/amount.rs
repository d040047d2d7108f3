/// Smallest unit of value moved by the ledger.
pub type Wei = u128;

pub const WEI_PER_ETHER: Wei = 1_000_000_000_000_000_000;

/// `n` whole ether expressed in wei.
pub const fn ether(n: u64) -> Wei {
    n as Wei * WEI_PER_ETHER
}

/// Applies a `numerator / denominator` multiplier, rounding down.
/// `None` when the product overflows or the denominator is zero.
pub fn scale(amount: Wei, numerator: u128, denominator: u128) -> Option<Wei> {
    amount.checked_mul(numerator)?.checked_div(denominator)
}
