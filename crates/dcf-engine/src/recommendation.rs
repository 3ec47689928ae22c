use serde::{Deserialize, Serialize};
use valuation_core::Recommendation;

/// Upside strictly above this is a strong buy
pub const STRONG_BUY_ABOVE: f64 = 0.50;
/// Upside strictly above this is a buy
pub const BUY_ABOVE: f64 = 0.20;
/// Upside strictly below this is a sell
pub const SELL_BELOW: f64 = -0.20;
/// Upside strictly below this is a strong sell
pub const STRONG_SELL_BELOW: f64 = -0.50;

/// Whether buy ratings also require the price to clear the margin of safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPolicy {
    #[default]
    UpsideOnly,
    /// Buy ratings need `current_price <= buy_under_price`; otherwise HOLD
    RequireMarginOfSafety,
}

/// Map upside (a fraction, 0.25 = 25%) to a rating.
///
/// Boundaries: `u > 0.50` strong buy, `0.20 < u <= 0.50` buy,
/// `-0.20 <= u <= 0.20` hold, `-0.50 <= u < -0.20` sell, `u < -0.50` strong sell.
/// Each boundary value therefore lands on the side closer to HOLD.
pub fn classify(upside: f64) -> Recommendation {
    match upside {
        u if u > STRONG_BUY_ABOVE => Recommendation::StrongBuy,
        u if u > BUY_ABOVE => Recommendation::Buy,
        u if u >= SELL_BELOW => Recommendation::Hold,
        u if u >= STRONG_SELL_BELOW => Recommendation::Sell,
        u if u < STRONG_SELL_BELOW => Recommendation::StrongSell,
        // NaN
        _ => Recommendation::Hold,
    }
}

pub fn recommend(
    policy: RecommendationPolicy,
    upside: f64,
    current_price: f64,
    buy_under_price: f64,
) -> Recommendation {
    let rating = classify(upside);
    match policy {
        RecommendationPolicy::RequireMarginOfSafety
            if rating.is_bullish() && current_price > buy_under_price =>
        {
            Recommendation::Hold
        }
        _ => rating,
    }
}
