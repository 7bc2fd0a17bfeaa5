//! Fee math mirroring the bridge contract.
//!
//! `fee = floor(amount * fee_bps / 10_000) + fixed_fee`. Kept in parity
//! with the contract so off-chain quotes match what bridging charges.

/// Basis point denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Compute the total fee for a gross amount.
///
/// `floor(a * b / c)` is computed as `(a / c) * b + (a % c) * b / c`,
/// which is exact and cannot overflow for `b <= c`.
pub fn calculate_fee(amount: u128, fee_bps: u32, fixed_fee: u128) -> u128 {
    let bps = fee_bps as u128;
    let percentage_fee =
        (amount / BPS_DENOMINATOR) * bps + (amount % BPS_DENOMINATOR) * bps / BPS_DENOMINATOR;
    percentage_fee + fixed_fee
}

/// Net amount after fees; `None` when the fee consumes the whole amount.
pub fn net_amount(amount: u128, fee_bps: u32, fixed_fee: u128) -> Option<u128> {
    let fee = calculate_fee(amount, fee_bps, fixed_fee);
    amount.checked_sub(fee).filter(|net| *net > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_percent_of_one_hundred() {
        assert_eq!(calculate_fee(100, 100, 0), 1);
        assert_eq!(net_amount(100, 100, 0), Some(99));
    }

    #[test]
    fn percentage_truncates() {
        // 0.5% of 101 = 0.505, truncated to 0
        assert_eq!(calculate_fee(101, 50, 0), 0);
    }

    #[test]
    fn fixed_fee_added_after_percentage() {
        assert_eq!(calculate_fee(1_000, 250, 7), 32);
    }

    #[test]
    fn fee_exceeding_amount_yields_no_net() {
        assert_eq!(net_amount(10, 0, 50), None);
        assert_eq!(net_amount(100, 10_000, 0), None);
    }

    #[test]
    fn split_formula_matches_naive_for_small_values() {
        for amount in [0u128, 1, 99, 100, 101, 9_999, 10_000, 10_001, 123_456] {
            for bps in [0u32, 1, 50, 100, 9_999, 10_000] {
                let naive = amount * bps as u128 / BPS_DENOMINATOR;
                assert_eq!(calculate_fee(amount, bps, 0), naive, "amount={amount} bps={bps}");
            }
        }
    }

    #[test]
    fn large_amounts_do_not_overflow() {
        let fee = calculate_fee(u128::MAX, 9_999, 0);
        assert!(fee < u128::MAX);
    }
}
