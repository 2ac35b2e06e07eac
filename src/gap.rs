//! Minimum spacing between the three price tiers.

use serde::{Deserialize, Serialize};

/// Default spacing, in the oracle's currency units
pub const DEFAULT_GAP: f64 = 500.0;

/// The three predicted prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    #[serde(rename = "Retail")]
    pub retail: f64,
    #[serde(rename = "Private")]
    pub private: f64,
    #[serde(rename = "Trade-In")]
    pub trade_in: f64,
}

impl PredictionSet {
    pub fn new(retail: f64, private: f64, trade_in: f64) -> Self {
        Self {
            retail,
            private,
            trade_in,
        }
    }

    /// Raise prices so that `trade_in + gap <= private` and `private + gap <= retail`.
    ///
    /// Private is raised first, then retail against the new private. Trade-in
    /// is never changed and no price is ever lowered.
    pub fn enforce_gaps(self, gap: f64) -> Self {
        let private = self.private.max(self.trade_in + gap);
        let retail = self.retail.max(private + gap);
        Self {
            retail,
            private,
            trade_in: self.trade_in,
        }
    }
}
