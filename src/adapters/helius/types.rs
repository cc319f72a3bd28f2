//! Enhanced Transaction Payload Types
//!
//! Raw serde shapes of the enhanced-transactions API response, and the
//! normalization step that maps them into the canonical domain model.
//! Heuristics downstream never branch on upstream field names; every
//! source-specific quirk is absorbed here.

use serde::Deserialize;

use crate::domain::{
    MintEvent, NativeTransfer, SwapEvent, TokenAmount, TokenTransfer, TransactionRecord, TxKind,
};

/// One transaction as returned by the enhanced-transactions endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub signature: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(rename = "type", default)]
    pub tx_type: Option<String>,
    #[serde(default)]
    pub fee_payer: Option<String>,
    #[serde(default)]
    pub token_transfers: Vec<RawTokenTransfer>,
    #[serde(default)]
    pub native_transfers: Vec<RawNativeTransfer>,
    #[serde(default)]
    pub events: RawEvents,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenTransfer {
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(default)]
    pub from_token_account: Option<String>,
    #[serde(default)]
    pub from_user_account: Option<String>,
    #[serde(default)]
    pub to_token_account: Option<String>,
    #[serde(default)]
    pub to_user_account: Option<String>,
    /// Display-unit amount, present on parsed transfers
    #[serde(default)]
    pub token_amount: Option<f64>,
    /// Base-unit amount, present on balance-change style payloads
    #[serde(default)]
    pub raw_token_amount: Option<RawTokenAmount>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenAmount {
    /// Base units as a decimal string
    pub token_amount: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNativeTransfer {
    #[serde(default)]
    pub from_user_account: Option<String>,
    #[serde(default)]
    pub to_user_account: Option<String>,
    #[serde(default)]
    pub amount: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvents {
    #[serde(default)]
    pub swap: Option<RawSwapEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSwapEvent {
    #[serde(default)]
    pub native_input: Option<RawNativeBalance>,
    #[serde(default)]
    pub native_output: Option<RawNativeBalance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNativeBalance {
    #[serde(default)]
    pub account: Option<String>,
}

/// Scale used when the source only reports a display-unit float
const DISPLAY_FALLBACK_DECIMALS: u32 = 9;

impl RawTokenTransfer {
    fn amount(&self) -> TokenAmount {
        if let Some(raw) = &self.raw_token_amount {
            let base_units = raw.token_amount.parse::<u128>().unwrap_or(0);
            return TokenAmount::new(base_units, raw.decimals);
        }
        // display float fallback, scaled at a fixed 9 decimals
        let display = self.token_amount.unwrap_or(0.0);
        if !display.is_finite() || display <= 0.0 {
            return TokenAmount::new(0, DISPLAY_FALLBACK_DECIMALS);
        }
        let scaled = display * 10f64.powi(DISPLAY_FALLBACK_DECIMALS as i32);
        TokenAmount::new(scaled.round() as u128, DISPLAY_FALLBACK_DECIMALS)
    }

    fn has_source(&self) -> bool {
        let some_nonempty = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        some_nonempty(&self.from_user_account) || some_nonempty(&self.from_token_account)
    }
}

impl RawTransaction {
    /// Map this payload into the canonical record.
    ///
    /// - the swap user is the swap's native-input account, else the fee payer
    /// - transfers with no source account are token creations landing
    ///   straight on the recipient, and normalize to mint events
    pub fn normalize(self) -> TransactionRecord {
        let kind = TxKind::from_tag(self.tx_type.as_deref());

        let swap = self.events.swap.as_ref().map(|raw_swap| SwapEvent {
            user: raw_swap
                .native_input
                .as_ref()
                .and_then(|input| input.account.clone())
                .or_else(|| self.fee_payer.clone()),
        });

        let mut token_transfers = Vec::new();
        let mut mint_events = Vec::new();
        for raw in &self.token_transfers {
            let Some(mint) = raw.mint.clone().filter(|m| !m.is_empty()) else {
                continue;
            };
            let amount = raw.amount();
            if raw.has_source() {
                token_transfers.push(TokenTransfer {
                    mint,
                    from_account: raw.from_token_account.clone(),
                    from_owner: raw.from_user_account.clone(),
                    to_account: raw.to_token_account.clone(),
                    to_owner: raw.to_user_account.clone(),
                    amount,
                });
            } else {
                mint_events.push(MintEvent {
                    mint,
                    to_account: raw.to_token_account.clone(),
                    to_owner: raw.to_user_account.clone(),
                    amount: Some(amount),
                });
            }
        }

        let native_transfers = self
            .native_transfers
            .iter()
            .map(|raw| NativeTransfer {
                from_account: raw.from_user_account.clone(),
                to_account: raw.to_user_account.clone(),
                lamports: raw.amount,
            })
            .collect();

        TransactionRecord {
            signature: self.signature,
            timestamp: self.timestamp,
            kind,
            token_transfers,
            native_transfers,
            swap,
            mint_events,
        }
    }
}
