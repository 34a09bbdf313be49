//! Open-position model as delivered by the position-list snapshot

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::calculation::PlCalculation;
use crate::error::ValuationError;

/// Trade direction; wire values 0=Buy, 1=Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Side {
    Buy,
    Sell,
}

impl TryFrom<u8> for Side {
    type Error = ValuationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Side::Buy),
            1 => Ok(Side::Sell),
            other => Err(ValuationError::InvalidSide(other)),
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        })
    }
}

/// One open trade. Snapshot fields are immutable; `closed_price`, `profit`
/// and the calculation's `exchange_rate` are derived and refreshed by the
/// valuation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub position_id: i64,
    pub symbol_name: String,
    #[serde(rename = "type")]
    pub side: Side,
    /// Traded volume in lots.
    pub volume: f64,
    pub contract_size: f64,
    pub open_price: f64,
    /// Current price used for the last valuation: bid for Buy, ask for Sell.
    /// `None` until the first tick for the symbol arrives.
    #[serde(default)]
    pub closed_price: Option<f64>,
    /// Price rounding digits of the instrument.
    pub digits: u8,
    /// Rounding digits of the account (profit) currency.
    pub digits_currency: u8,
    #[serde(default)]
    pub swap: f64,
    #[serde(default)]
    pub commission: f64,
    /// Floating profit in account currency. `None` is the single explicit
    /// "undefined" marker — the backend's `"NaN"` strings and numeric NaN
    /// both decode to it, and valuation errors reset to it.
    #[serde(default, deserialize_with = "deserialize_profit")]
    pub profit: Option<f64>,
    #[serde(default)]
    pub pl_calculation: Option<PlCalculation>,
    /// When the position was opened.
    #[serde(default)]
    pub action_time: Option<DateTime<Utc>>,
    /// Fixed margin requirements, when the instrument defines them.
    #[serde(default)]
    pub initial_margin: Option<f64>,
    #[serde(default)]
    pub maintenance_margin: Option<f64>,
}

impl Position {
    pub fn conversion_symbol(&self) -> Option<&str> {
        self.pl_calculation.as_ref()?.conversion_symbol.as_deref()
    }

    /// Display total for the position row: profit + swap + commission.
    /// Undefined while the profit is.
    pub fn total(&self) -> Option<f64> {
        self.profit.map(|p| p + self.swap + self.commission)
    }
}

// The legacy backend serializes an unvaluable profit as the string "NaN";
// numeric NaN and null show up as well. All of them collapse into None.
fn deserialize_profit<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Nothing(Option<()>),
    }

    let profit = match Raw::deserialize(deserializer)? {
        Raw::Number(value) if value.is_finite() => Some(value),
        Raw::Number(_) => None,
        Raw::Text(text) => text.parse::<f64>().ok().filter(|value| value.is_finite()),
        Raw::Nothing(_) => None,
    };
    Ok(profit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIRE: &str = r#"{
        "positionId": 505814,
        "symbolName": "JPYAUD",
        "type": 1,
        "volume": 0.5,
        "contractSize": 100000.0,
        "openPrice": 0.0102,
        "digits": 5,
        "digitsCurrency": 2,
        "swap": -1.25,
        "commission": -0.5,
        "profit": "NaN",
        "plCalculation": {
            "calculationMode": 1,
            "conversionSymbol": "AUDUSD_",
            "isReversed": false,
            "isForexProfitByMarket": true,
            "exchangeRate": 0.655
        }
    }"#;

    #[test]
    fn decodes_the_rest_payload() {
        let position: Position = serde_json::from_str(WIRE).unwrap();
        assert_eq!(position.position_id, 505814);
        assert_eq!(position.side, Side::Sell);
        assert_eq!(position.conversion_symbol(), Some("AUDUSD_"));
        assert_eq!(position.profit, None);
        assert!(position.closed_price.is_none());
    }

    #[test]
    fn nan_string_and_null_profit_decode_to_none() {
        for raw in [r#""NaN""#, "null", r#""nonsense""#] {
            let json = WIRE.replace(r#""NaN""#, raw);
            let position: Position = serde_json::from_str(&json).unwrap();
            assert_eq!(position.profit, None, "profit {raw} should be undefined");
        }
        let json = WIRE.replace(r#""NaN""#, "12.5");
        let position: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(position.profit, Some(12.5));
    }

    #[test]
    fn rejects_invalid_side() {
        let json = WIRE.replace(r#""type": 1"#, r#""type": 7"#);
        assert!(serde_json::from_str::<Position>(&json).is_err());
    }

    #[test]
    fn total_tracks_profit_definedness() {
        let mut position: Position = serde_json::from_str(WIRE).unwrap();
        assert_eq!(position.total(), None);
        position.profit = Some(10.0);
        assert_eq!(position.total(), Some(10.0 - 1.25 - 0.5));
    }
}
