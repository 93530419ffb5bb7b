//! TDEX v2 wire records.
//!
//! Field names follow the provider's camelCase JSON. Blinded transaction
//! material (transactions, amounts, blinders) is carried as opaque strings
//! and echoed back exactly as received.

use crate::market::TradeType;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// `{baseAsset, quoteAsset}` as sent to `/v2/market/price` and the trade endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDescriptor {
    pub base_asset: String,
    pub quote_asset: String,
}

/// Per-side fee values as strings, as echoed in previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFeePair {
    pub base_asset: String,
    pub quote_asset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPriceRequest {
    pub market: MarketDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTradeRequest {
    pub market: MarketDescriptor,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub amount: String,
    pub asset: String,
    pub fee_asset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewFee {
    pub percentage_fee: WireFeePair,
    pub fixed_fee: WireFeePair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPrice {
    pub base_price: f64,
    pub quote_price: f64,
}

/// One priced quote for a trade.
///
/// `amount`/`asset` is the counter-amount the provider offers for the
/// requested side; `fee_amount`/`fee_asset` is what it charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTradeResponse {
    pub amount: String,
    pub asset: String,
    pub fee: PreviewFee,
    pub fee_amount: String,
    pub fee_asset: String,
    pub price: PreviewPrice,
}

/// Opening data of a confidential input, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnblindedInput {
    pub index: u32,
    pub asset: String,
    pub amount: String,
    pub asset_blinder: String,
    pub amount_blinder: String,
}

/// Swap request: the user pays `amountP` of `assetP` to receive `amountR` of `assetR`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub id: String,
    pub amount_p: String,
    pub asset_p: String,
    pub amount_r: String,
    pub asset_r: String,
    pub transaction: String,
    pub unblinded_inputs: Vec<UnblindedInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeTradeRequest {
    pub fee_amount: String,
    pub fee_asset: String,
    pub market: MarketDescriptor,
    pub swap_request: TradeRequest,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapAccept {
    pub id: String,
    pub request_id: String,
    pub transaction: String,
    pub unblinded_inputs: Vec<UnblindedInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapFail {
    pub id: String,
    pub message_id: String,
    pub failure_code: i64,
    pub failure_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeTradeResponse {
    pub swap_accept: Option<SwapAccept>,
    pub swap_fail: Option<SwapFail>,
    pub expiry_time_unix: String,
}

impl ProposeTradeResponse {
    /// Deadline for completing the accepted swap.
    ///
    /// `None` when the provider sent a non-numeric expiry.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.expiry_time_unix.trim().parse().ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapComplete {
    pub accept_id: String,
    pub transaction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTradeRequest {
    pub swap_complete: SwapComplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTradeResponse {
    pub txid: Option<String>,
    pub swap_fail: Option<SwapFail>,
}

/// Error payload of a non-2xx provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderErrorBody {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preview_request_wire_shape() {
        let req = PreviewTradeRequest {
            market: MarketDescriptor {
                base_asset: "b".to_string(),
                quote_asset: "q".to_string(),
            },
            trade_type: TradeType::Sell,
            amount: "100".to_string(),
            asset: "b".to_string(),
            fee_asset: "q".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "market": {"baseAsset": "b", "quoteAsset": "q"},
                "type": 1,
                "amount": "100",
                "asset": "b",
                "feeAsset": "q"
            })
        );
    }

    #[test]
    fn test_trade_request_field_names() {
        let req = TradeRequest {
            id: "id".to_string(),
            amount_p: "1".to_string(),
            asset_p: "a".to_string(),
            amount_r: "2".to_string(),
            asset_r: "b".to_string(),
            transaction: "cHNldP8B".to_string(),
            unblinded_inputs: vec![UnblindedInput {
                index: 0,
                asset: "a".to_string(),
                amount: "1".to_string(),
                asset_blinder: "00ff".to_string(),
                amount_blinder: "ff00".to_string(),
            }],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["amountP"], "1");
        assert_eq!(value["assetR"], "b");
        assert_eq!(value["unblindedInputs"][0]["assetBlinder"], "00ff");
        assert_eq!(value["unblindedInputs"][0]["amountBlinder"], "ff00");
    }

    #[test]
    fn test_propose_expiry_parsing() {
        let resp = ProposeTradeResponse {
            swap_accept: None,
            swap_fail: None,
            expiry_time_unix: "1700000000".to_string(),
        };
        assert_eq!(resp.expiry().unwrap().timestamp(), 1_700_000_000);

        let garbled = ProposeTradeResponse {
            expiry_time_unix: "soon".to_string(),
            ..resp
        };
        assert!(garbled.expiry().is_none());
    }
}
