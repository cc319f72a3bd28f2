//! Excluded Mint Addresses
//!
//! Constants for the majors and stablecoins that act as payment currencies.
//! These are never reported as "purchased", and an outflow of any of them is
//! one of the signals that a wallet paid in a transaction.

/// Wrapped SOL
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Majors and stables excluded from acquisition results
pub const EXCLUDED_MINTS: &[&str] = &[
    // Wrapped SOL
    WSOL_MINT,
    // USDC
    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
    // USDT
    "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
    // mSOL (Marinade staked SOL)
    "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So",
    // JitoSOL
    "J1toso1uCk3RLmjorhTtrVwY9HJ7X8V9yYac6Y7kGCPn",
    // JUP
    "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN",
    // BONK
    "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
];

/// True when the mint is a payment-currency major/stable
pub fn is_excluded(mint: &str) -> bool {
    EXCLUDED_MINTS.contains(&mint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wsol_is_excluded() {
        assert!(is_excluded(WSOL_MINT));
    }

    #[test]
    fn test_usdc_is_excluded() {
        assert!(is_excluded("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"));
    }

    #[test]
    fn test_random_mint_is_not_excluded() {
        assert!(!is_excluded("Fh9X2kPvM1nQr7TdLbWc4jYs8uZaE3gB6tCmNxRiKoJD"));
        assert!(!is_excluded(""));
    }

    #[test]
    fn test_list_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for mint in EXCLUDED_MINTS {
            assert!(seen.insert(*mint), "duplicate excluded mint: {}", mint);
        }
    }
}
