//! Shared Token Aggregator
//!
//! Combines per-wallet acquisition sets into a ranked list of mints bought
//! by more than one wallet. Pure collection math: no I/O, inputs untouched,
//! the same mapping always produces the same ordered list.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::address::WalletAddress;

/// Maximum example transactions kept per shared token
pub const MAX_EXAMPLES: usize = 3;

/// Reference to a transaction in which an acquisition was seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxExample {
    pub signature: String,
    /// Unix seconds
    pub timestamp: i64,
}

/// One wallet's acquired mints, each with a few example transactions.
/// Built incrementally by the scanner; read-only once returned.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionSet {
    mints: BTreeMap<String, Vec<TxExample>>,
}

impl AcquisitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an acquisition of `mint` seen in `example`. Examples beyond
    /// the per-mint cap are dropped, not rotated.
    pub fn record(&mut self, mint: &str, example: TxExample) {
        let examples = self.mints.entry(mint.to_string()).or_default();
        if examples.len() < MAX_EXAMPLES && !examples.contains(&example) {
            examples.push(example);
        }
    }

    pub fn contains(&self, mint: &str) -> bool {
        self.mints.contains_key(mint)
    }

    pub fn mints(&self) -> impl Iterator<Item = &str> {
        self.mints.keys().map(String::as_str)
    }

    pub fn examples(&self, mint: &str) -> &[TxExample] {
        self.mints.get(mint).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.mints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mints.is_empty()
    }
}

/// How overlap between wallets is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationMode {
    /// Keep mints acquired by at least `min_wallets` distinct wallets
    Threshold { min_wallets: usize },
    /// Keep only mints acquired by every wallet in the input
    StrictIntersection,
}

impl Default for AggregationMode {
    fn default() -> Self {
        AggregationMode::Threshold { min_wallets: 2 }
    }
}

/// A mint shared across wallets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedToken {
    pub mint: String,
    /// Wallets holding this mint in their acquisition set, sorted
    pub wallets: Vec<WalletAddress>,
    /// Always equals `wallets.len()`
    pub count: usize,
    /// Up to [`MAX_EXAMPLES`] example transactions across wallets
    pub examples: Vec<TxExample>,
}

/// Aggregate per-wallet sets into a ranked shared-token list.
///
/// Ranking: wallet count descending, then mint address ascending.
pub fn aggregate(
    wallet_sets: &BTreeMap<WalletAddress, AcquisitionSet>,
    mode: AggregationMode,
) -> Vec<SharedToken> {
    let total_wallets = wallet_sets.len();

    // mint -> wallets that acquired it (BTree keeps both levels sorted)
    let mut by_mint: BTreeMap<&str, BTreeSet<&WalletAddress>> = BTreeMap::new();
    for (wallet, set) in wallet_sets {
        for mint in set.mints() {
            by_mint.entry(mint).or_default().insert(wallet);
        }
    }

    let mut shared: Vec<SharedToken> = by_mint
        .into_iter()
        .filter(|(_, wallets)| match mode {
            AggregationMode::Threshold { min_wallets } => wallets.len() >= min_wallets.max(2),
            AggregationMode::StrictIntersection => {
                total_wallets >= 2 && wallets.len() == total_wallets
            }
        })
        .map(|(mint, wallets)| {
            let mut examples = Vec::new();
            for wallet in &wallets {
                for example in wallet_sets[*wallet].examples(mint) {
                    if examples.len() >= MAX_EXAMPLES {
                        break;
                    }
                    if !examples.contains(example) {
                        examples.push(example.clone());
                    }
                }
            }
            SharedToken {
                mint: mint.to_string(),
                count: wallets.len(),
                wallets: wallets.into_iter().cloned().collect(),
                examples,
            }
        })
        .collect();

    shared.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.mint.cmp(&b.mint)));
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET_A: &str = "DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK";
    const WALLET_B: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const WALLET_C: &str = "7NsngNMtXJNdHgeK4znQDZ5PJ19ykVvQvEF7BT5KFjMv";

    fn addr(raw: &str) -> WalletAddress {
        WalletAddress::parse(raw).unwrap()
    }

    fn example(signature: &str) -> TxExample {
        TxExample {
            signature: signature.to_string(),
            timestamp: 1_700_000_000,
        }
    }

    fn set_of(mints: &[&str]) -> AcquisitionSet {
        let mut set = AcquisitionSet::new();
        for (i, mint) in mints.iter().enumerate() {
            set.record(mint, example(&format!("sig-{}-{}", mint, i)));
        }
        set
    }

    fn two_wallet_overlap() -> BTreeMap<WalletAddress, AcquisitionSet> {
        let mut sets = BTreeMap::new();
        sets.insert(addr(WALLET_A), set_of(&["MintX", "MintY"]));
        sets.insert(addr(WALLET_B), set_of(&["MintX", "MintZ"]));
        sets
    }

    #[test]
    fn test_threshold_keeps_shared_mint_only() {
        let shared = aggregate(&two_wallet_overlap(), AggregationMode::default());

        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].mint, "MintX");
        assert_eq!(shared[0].count, 2);
        assert_eq!(shared[0].wallets.len(), 2);
        assert!(shared[0].wallets.contains(&addr(WALLET_A)));
        assert!(shared[0].wallets.contains(&addr(WALLET_B)));
    }

    #[test]
    fn test_count_matches_wallet_list() {
        let shared = aggregate(&two_wallet_overlap(), AggregationMode::default());
        for token in &shared {
            assert_eq!(token.count, token.wallets.len());
        }
    }

    #[test]
    fn test_threshold_minimum_is_never_below_two() {
        // min_wallets of 1 must not report unshared mints
        let shared = aggregate(
            &two_wallet_overlap(),
            AggregationMode::Threshold { min_wallets: 1 },
        );
        assert_eq!(shared.len(), 1);
        assert!(shared.iter().all(|t| t.count >= 2));
    }

    #[test]
    fn test_strict_intersection_requires_all_wallets() {
        let mut sets = two_wallet_overlap();
        // C overlaps with nobody
        sets.insert(addr(WALLET_C), set_of(&["MintQ"]));

        let strict = aggregate(&sets, AggregationMode::StrictIntersection);
        assert!(strict.is_empty());

        // threshold over the same input still finds MintX
        let threshold = aggregate(&sets, AggregationMode::default());
        assert_eq!(threshold.len(), 1);
        assert_eq!(threshold[0].mint, "MintX");
        assert_eq!(threshold[0].count, 2);
    }

    #[test]
    fn test_strict_intersection_full_overlap() {
        let mut sets = BTreeMap::new();
        sets.insert(addr(WALLET_A), set_of(&["MintX", "MintY"]));
        sets.insert(addr(WALLET_B), set_of(&["MintX"]));
        sets.insert(addr(WALLET_C), set_of(&["MintX", "MintZ"]));

        let strict = aggregate(&sets, AggregationMode::StrictIntersection);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].mint, "MintX");
        assert_eq!(strict[0].count, 3);
    }

    #[test]
    fn test_ranking_count_desc_then_mint_asc() {
        let mut sets = BTreeMap::new();
        sets.insert(addr(WALLET_A), set_of(&["MintB", "MintA", "MintC"]));
        sets.insert(addr(WALLET_B), set_of(&["MintB", "MintA", "MintC"]));
        sets.insert(addr(WALLET_C), set_of(&["MintB"]));

        let shared = aggregate(&sets, AggregationMode::default());
        let order: Vec<&str> = shared.iter().map(|t| t.mint.as_str()).collect();
        // MintB has 3 wallets; MintA and MintC tie at 2, broken lexicographically
        assert_eq!(order, vec!["MintB", "MintA", "MintC"]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let sets = two_wallet_overlap();
        let first = aggregate(&sets, AggregationMode::default());
        let second = aggregate(&sets, AggregationMode::default());
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.mint, b.mint);
            assert_eq!(a.count, b.count);
            assert_eq!(a.wallets, b.wallets);
            assert_eq!(a.examples, b.examples);
        }
    }

    #[test]
    fn test_examples_capped_at_three() {
        let mut a = AcquisitionSet::new();
        for i in 0..5 {
            a.record("MintX", example(&format!("a{}", i)));
        }
        let mut b = AcquisitionSet::new();
        for i in 0..5 {
            b.record("MintX", example(&format!("b{}", i)));
        }

        assert_eq!(a.examples("MintX").len(), MAX_EXAMPLES);

        let mut sets = BTreeMap::new();
        sets.insert(addr(WALLET_A), a);
        sets.insert(addr(WALLET_B), b);
        let shared = aggregate(&sets, AggregationMode::default());
        assert_eq!(shared[0].examples.len(), MAX_EXAMPLES);
    }

    #[test]
    fn test_empty_input() {
        let sets = BTreeMap::new();
        assert!(aggregate(&sets, AggregationMode::default()).is_empty());
        assert!(aggregate(&sets, AggregationMode::StrictIntersection).is_empty());
    }

    #[test]
    fn test_acquisition_set_dedups_examples() {
        let mut set = AcquisitionSet::new();
        set.record("MintX", example("same"));
        set.record("MintX", example("same"));
        assert_eq!(set.examples("MintX").len(), 1);
        assert_eq!(set.len(), 1);
    }
}
