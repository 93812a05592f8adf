//! Valuation arithmetic.
//!
//! A stake is valued as `balance * price / 10^token_decimals`: the staked
//! token's own fixed-point scale is removed so the result is denominated in
//! the feed's price units. One whole 18-decimal token priced at 2000 is worth
//! 2000.

use odra::casper_types::U256;

/// Price reported by a token's feed, verbatim.
#[odra::odra_type]
pub struct TokenValue {
    pub price: U256,
    pub decimals: u8,
}

/// Value of `balance` base units of a token with `token_decimals` decimals,
/// rounded down. `None` only when the value itself does not fit in U256
/// (or, for tokens with more than 38 decimals, when `balance * price` does not).
pub fn stake_value(balance: U256, price: U256, token_decimals: u8) -> Option<U256> {
    if balance.is_zero() || price.is_zero() {
        return Some(U256::zero());
    }
    let scale = U256::from(10u64).checked_pow(U256::from(token_decimals))?;

    // balance = q * scale + r, price = p * scale + s
    // balance * price / scale = q * price + r * p + r * s / scale
    let (q, r) = (balance / scale, balance % scale);
    let (p, s) = (price / scale, price % scale);
    let whole = q.checked_mul(price)?;
    let cross = r.checked_mul(p)?;
    let fraction = r.checked_mul(s)? / scale;
    whole.checked_add(cross)?.checked_add(fraction)
}

/// Sum of per-token values. `None` on overflow.
pub fn total_value<I>(values: I) -> Option<U256>
where
    I: IntoIterator<Item = U256>,
{
    values
        .into_iter()
        .try_fold(U256::zero(), |acc, value| acc.checked_add(value))
}
