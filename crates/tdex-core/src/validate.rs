//! Structural validation of provider payloads.
//!
//! Every function here is total and pure: it inspects a `serde_json::Value`
//! and either returns the typed record or a `ShapeError` naming the first
//! violated constraint. Nothing received from a provider is used before it
//! has passed through one of these checks.

use crate::error::ShapeError;
use crate::market::{Balance, FeePair, Market, MarketPrice, Provider};
use crate::wire::{
    CompleteTradeResponse, PreviewFee, PreviewPrice, PreviewTradeResponse, ProposeTradeResponse,
    ProviderErrorBody, SwapAccept, SwapFail, UnblindedInput, WireFeePair,
};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

type Shape<T> = std::result::Result<T, ShapeError>;

fn object<'a>(kind: &'static str, value: &'a Value) -> Shape<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ShapeError::new(kind, "not an object"))
}

fn nested<'a>(
    kind: &'static str,
    obj: &'a Map<String, Value>,
    key: &str,
) -> Shape<&'a Map<String, Value>> {
    obj.get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| ShapeError::new(kind, format!("`{key}` is not an object")))
}

fn str_field<'a>(kind: &'static str, obj: &'a Map<String, Value>, key: &str) -> Shape<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ShapeError::new(kind, format!("`{key}` is not a string")))
}

fn non_empty_str_field<'a>(
    kind: &'static str,
    obj: &'a Map<String, Value>,
    key: &str,
) -> Shape<&'a str> {
    let s = str_field(kind, obj, key)?;
    if s.trim().is_empty() {
        return Err(ShapeError::new(kind, format!("`{key}` is empty")));
    }
    Ok(s)
}

fn num_field(kind: &'static str, obj: &Map<String, Value>, key: &str) -> Shape<f64> {
    obj.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ShapeError::new(kind, format!("`{key}` is not a number")))
}

/// Optional string field: absent and `null` are `Ok(None)`, any other
/// non-string is a shape error.
fn opt_str_field<'a>(
    kind: &'static str,
    obj: &'a Map<String, Value>,
    key: &str,
) -> Shape<Option<&'a str>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ShapeError::new(kind, format!("`{key}` is not a string"))),
    }
}

/// Decimal from a JSON string ("25") or number (25). Providers encode
/// 64-bit integers as strings, but both forms are accepted.
pub fn decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        _ => None,
    }
}

fn fee_pair(value: Option<&Value>) -> Option<FeePair> {
    let obj = value?.as_object()?;
    Some(FeePair::new(
        decimal_value(obj.get("baseAsset")?)?,
        decimal_value(obj.get("quoteAsset")?)?,
    ))
}

fn wire_fee_pair(kind: &'static str, obj: &Map<String, Value>, key: &str) -> Shape<WireFeePair> {
    let pair = nested(kind, obj, key)?;
    Ok(WireFeePair {
        base_asset: str_field(kind, pair, "baseAsset")?.to_string(),
        quote_asset: str_field(kind, pair, "quoteAsset")?.to_string(),
    })
}

/// A registry entry: non-empty `name` and `endpoint` strings.
pub fn validate_provider(value: &Value) -> Shape<Provider> {
    const KIND: &str = "provider";
    let obj = object(KIND, value)?;
    let name = non_empty_str_field(KIND, obj, "name")?;
    let endpoint = non_empty_str_field(KIND, obj, "endpoint")?;
    Ok(Provider::new(name.trim(), endpoint.trim().trim_end_matches('/')))
}

/// One element of a `/v2/markets` response:
/// `{market: {baseAsset, quoteAsset}, fee: {percentageFee, fixedFee}}`.
///
/// The asset pair and the `fee` object are required. A fee schedule that is
/// missing or not numeric leaves the corresponding field `None`.
pub fn validate_market_entry(value: &Value, provider: &Provider) -> Shape<Market> {
    const KIND: &str = "market";
    let obj = object(KIND, value)?;
    let market = nested(KIND, obj, "market")?;
    let base_asset = non_empty_str_field(KIND, market, "baseAsset")?;
    let quote_asset = non_empty_str_field(KIND, market, "quoteAsset")?;
    if base_asset == quote_asset {
        return Err(ShapeError::new(KIND, "base and quote asset are equal"));
    }
    let fee = nested(KIND, obj, "fee")?;

    let mut parsed = Market::new(provider.clone(), base_asset, quote_asset);
    parsed.percentage_fee = fee_pair(fee.get("percentageFee"));
    parsed.fixed_fee = fee_pair(fee.get("fixedFee"));
    Ok(parsed)
}

/// A `/v2/market/price` response: numeric `spotPrice` and string
/// `minTradableAmount`. A missing or garbled `balance` is kept as `None`.
pub fn validate_market_price(value: &Value) -> Shape<MarketPrice> {
    const KIND: &str = "market price";
    let obj = object(KIND, value)?;
    let spot_price = num_field(KIND, obj, "spotPrice")?;
    let min_tradable_amount = str_field(KIND, obj, "minTradableAmount")?.to_string();

    let balance = obj.get("balance").and_then(Value::as_object).and_then(|b| {
        Some(Balance {
            base_amount: decimal_value(b.get("baseAmount")?)?,
            quote_amount: decimal_value(b.get("quoteAmount")?)?,
        })
    });

    Ok(MarketPrice {
        spot_price,
        min_tradable_amount,
        balance,
    })
}

/// One element of a `/v2/trade/preview` response. Every field is required.
pub fn validate_preview_response(value: &Value) -> Shape<PreviewTradeResponse> {
    const KIND: &str = "preview";
    let obj = object(KIND, value)?;
    let fee = nested(KIND, obj, "fee")?;
    let price = nested(KIND, obj, "price")?;

    Ok(PreviewTradeResponse {
        amount: str_field(KIND, obj, "amount")?.to_string(),
        asset: str_field(KIND, obj, "asset")?.to_string(),
        fee: PreviewFee {
            percentage_fee: wire_fee_pair(KIND, fee, "percentageFee")?,
            fixed_fee: wire_fee_pair(KIND, fee, "fixedFee")?,
        },
        fee_amount: str_field(KIND, obj, "feeAmount")?.to_string(),
        fee_asset: str_field(KIND, obj, "feeAsset")?.to_string(),
        price: PreviewPrice {
            base_price: num_field(KIND, price, "basePrice")?,
            quote_price: num_field(KIND, price, "quotePrice")?,
        },
    })
}

/// Unblinded input descriptor. Values are copied verbatim.
pub fn validate_unblinded_input(value: &Value) -> Shape<UnblindedInput> {
    const KIND: &str = "unblinded input";
    let obj = object(KIND, value)?;
    let index = obj
        .get("index")
        .and_then(Value::as_u64)
        .and_then(|i| u32::try_from(i).ok())
        .ok_or_else(|| ShapeError::new(KIND, "`index` is not an unsigned integer"))?;

    Ok(UnblindedInput {
        index,
        asset: str_field(KIND, obj, "asset")?.to_string(),
        amount: str_field(KIND, obj, "amount")?.to_string(),
        asset_blinder: str_field(KIND, obj, "assetBlinder")?.to_string(),
        amount_blinder: str_field(KIND, obj, "amountBlinder")?.to_string(),
    })
}

fn unblinded_inputs(kind: &'static str, obj: &Map<String, Value>) -> Shape<Vec<UnblindedInput>> {
    match obj.get("unblindedInputs") {
        // Empty repeated fields are omitted by the provider's JSON encoder.
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(validate_unblinded_input).collect(),
        Some(_) => Err(ShapeError::new(kind, "`unblindedInputs` is not an array")),
    }
}

/// A provider's acceptance of a swap request.
pub fn validate_swap_accept(value: &Value) -> Shape<SwapAccept> {
    const KIND: &str = "swap accept";
    let obj = object(KIND, value)?;
    Ok(SwapAccept {
        id: non_empty_str_field(KIND, obj, "id")?.to_string(),
        request_id: str_field(KIND, obj, "requestId")?.to_string(),
        transaction: non_empty_str_field(KIND, obj, "transaction")?.to_string(),
        unblinded_inputs: unblinded_inputs(KIND, obj)?,
    })
}

/// A provider's rejection of a swap. Zero-valued fields may be omitted on
/// the wire and default accordingly.
pub fn validate_swap_fail(value: &Value) -> Shape<SwapFail> {
    const KIND: &str = "swap fail";
    let obj = object(KIND, value)?;
    let failure_code = match obj.get("failureCode") {
        None | Some(Value::Null) => 0,
        Some(v) => v
            .as_i64()
            .ok_or_else(|| ShapeError::new(KIND, "`failureCode` is not an integer"))?,
    };

    Ok(SwapFail {
        id: opt_str_field(KIND, obj, "id")?.unwrap_or_default().to_string(),
        message_id: opt_str_field(KIND, obj, "messageId")?
            .unwrap_or_default()
            .to_string(),
        failure_code,
        failure_message: opt_str_field(KIND, obj, "failureMessage")?
            .unwrap_or_default()
            .to_string(),
    })
}

fn opt_record<T>(
    obj: &Map<String, Value>,
    key: &str,
    validate: fn(&Value) -> Shape<T>,
) -> Shape<Option<T>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => validate(v).map(Some),
    }
}

/// A `/v2/trade/propose` response.
///
/// `expiryTimeUnix` must be a string; this is checked before anything else.
/// `swapAccept` and `swapFail` may both be null: such a response is
/// structurally valid and the negotiation decides what it means.
pub fn validate_propose_response(value: &Value) -> Shape<ProposeTradeResponse> {
    const KIND: &str = "propose response";
    let obj = object(KIND, value)?;
    let expiry_time_unix = str_field(KIND, obj, "expiryTimeUnix")?.to_string();

    Ok(ProposeTradeResponse {
        swap_accept: opt_record(obj, "swapAccept", validate_swap_accept)?,
        swap_fail: opt_record(obj, "swapFail", validate_swap_fail)?,
        expiry_time_unix,
    })
}

/// A `/v2/trade/complete` response: a string `txid`, a well-formed
/// `swapFail`, or both. At least one must be present.
pub fn validate_complete_response(value: &Value) -> Shape<CompleteTradeResponse> {
    const KIND: &str = "complete response";
    let obj = object(KIND, value)?;
    let txid = obj
        .get("txid")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let swap_fail = match obj.get("swapFail") {
        Some(v @ Value::Object(_)) => Some(validate_swap_fail(v)?),
        _ => None,
    };

    if txid.is_none() && swap_fail.is_none() {
        return Err(ShapeError::new(KIND, "neither `txid` nor `swapFail` present"));
    }
    Ok(CompleteTradeResponse { txid, swap_fail })
}

/// Error payload of a failed provider call: integer `code`, optional `message`.
pub fn validate_provider_error(value: &Value) -> Shape<ProviderErrorBody> {
    const KIND: &str = "provider error";
    let obj = object(KIND, value)?;
    let code = obj
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| ShapeError::new(KIND, "`code` is not an integer"))?;
    Ok(ProviderErrorBody {
        code,
        message: opt_str_field(KIND, obj, "message")?
            .unwrap_or_default()
            .to_string(),
    })
}
