//! Unit tests for signal models

use stocksignal::models::signal::SignalType;

#[test]
fn test_display_names() {
    assert_eq!(SignalType::Buy.to_string(), "Buy");
    assert_eq!(SignalType::PotentialBuyOversold.to_string(), "Potential Buy (oversold)");
    assert_eq!(SignalType::PotentialSellOverbought.to_string(), "Potential Sell (overbought)");
    assert_eq!(SignalType::PotentialBuyMacd.to_string(), "Potential Buy (MACD)");
    assert_eq!(SignalType::PotentialSellMacd.to_string(), "Potential Sell (MACD)");
}

#[test]
fn test_parse_stored_names() {
    for kind in SignalType::ALL {
        assert_eq!(kind.as_str().parse::<SignalType>(), Ok(kind));
    }
    assert!("Strong Buy".parse::<SignalType>().is_err());
}

#[test]
fn test_serializes_as_display_name() {
    let json = serde_json::to_string(&SignalType::PotentialSellMacd).unwrap();
    assert_eq!(json, "\"Potential Sell (MACD)\"");
}

#[test]
fn test_buy_side() {
    let buys: Vec<_> = SignalType::ALL.iter().filter(|t| t.is_buy()).collect();
    assert_eq!(buys.len(), 3);
    assert!(!SignalType::Sell.is_buy());
}
