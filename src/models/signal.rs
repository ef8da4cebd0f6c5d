use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete signal kinds emitted by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    #[serde(rename = "Buy")]
    Buy,
    #[serde(rename = "Sell")]
    Sell,
    #[serde(rename = "Potential Buy (oversold)")]
    PotentialBuyOversold,
    #[serde(rename = "Potential Sell (overbought)")]
    PotentialSellOverbought,
    #[serde(rename = "Potential Buy (MACD)")]
    PotentialBuyMacd,
    #[serde(rename = "Potential Sell (MACD)")]
    PotentialSellMacd,
}

impl SignalType {
    pub const ALL: [SignalType; 6] = [
        SignalType::Buy,
        SignalType::Sell,
        SignalType::PotentialBuyOversold,
        SignalType::PotentialSellOverbought,
        SignalType::PotentialBuyMacd,
        SignalType::PotentialSellMacd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "Buy",
            SignalType::Sell => "Sell",
            SignalType::PotentialBuyOversold => "Potential Buy (oversold)",
            SignalType::PotentialSellOverbought => "Potential Sell (overbought)",
            SignalType::PotentialBuyMacd => "Potential Buy (MACD)",
            SignalType::PotentialSellMacd => "Potential Sell (MACD)",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(
            self,
            SignalType::Buy | SignalType::PotentialBuyOversold | SignalType::PotentialBuyMacd
        )
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignalType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown signal type '{}'", s))
    }
}

/// A rule firing on a given date, before it is tied to a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedSignal {
    pub signal_type: SignalType,
    pub date: NaiveDate,
}

/// Persistable signal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub ticker: String,
    pub signal_type: SignalType,
    pub date: NaiveDate,
    pub stock_price: f64,
    pub volume: u64,
    pub stop_loss: f64,
    pub take_profit: f64,
}
