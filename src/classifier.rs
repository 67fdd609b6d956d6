//! Lead scoring and pool classification.
//!
//! A lead's heat is a linear score over its deal type and whether an area was
//! provided. The pool is a bucket over heat with inclusive lower bounds:
//!
//! | dealType | area      | heat | pool |
//! |----------|-----------|------|------|
//! | buy      | empty     | 20   | Warm |
//! | buy      | non-empty | 30   | Warm |
//! | sell     | empty     | 40   | Warm |
//! | sell     | non-empty | 50   | Hot  |
//! | other    | empty     | 0    | Cold |
//! | other    | non-empty | 10   | Cold |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Heat added when the lead wants to buy.
pub const BUY_HEAT: i32 = 20;
/// Heat added when the lead wants to sell.
pub const SELL_HEAT: i32 = 40;
/// Heat added when the lead named an area.
pub const AREA_HEAT: i32 = 10;
/// Lowest heat classified as `Warm`.
pub const WARM_THRESHOLD: i32 = 20;
/// Lowest heat classified as `Hot`.
pub const HOT_THRESHOLD: i32 = 50;

/// Categorical bucket derived from heat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Pool {
    Cold,
    Warm,
    Hot,
}

impl Pool {
    /// Buckets a heat score. Total over `i32`.
    pub fn from_heat(heat: i32) -> Self {
        if heat >= HOT_THRESHOLD {
            Pool::Hot
        } else if heat >= WARM_THRESHOLD {
            Pool::Warm
        } else {
            Pool::Cold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pool::Cold => "Cold",
            Pool::Warm => "Warm",
            Pool::Hot => "Hot",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cold" => Ok(Pool::Cold),
            "Warm" => Ok(Pool::Warm),
            "Hot" => Ok(Pool::Hot),
            other => Err(format!("unknown pool '{}'", other)),
        }
    }
}

/// Result of classifying a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub heat: i32,
    pub pool: Pool,
}

/// Computes the heat score for a deal type and area.
///
/// Deal type matching is exact and case-sensitive; anything other than
/// `"buy"` or `"sell"` contributes nothing. The area only counts when it is
/// non-empty (no trimming is applied).
pub fn heat_score(deal_type: &str, area: &str) -> i32 {
    let mut heat = 0;

    match deal_type {
        "buy" => heat += BUY_HEAT,
        "sell" => heat += SELL_HEAT,
        _ => {}
    }

    if !area.is_empty() {
        heat += AREA_HEAT;
    }

    heat
}

/// Scores and buckets a lead in one step.
pub fn classify(deal_type: &str, area: &str) -> Classification {
    let heat = heat_score(deal_type, area);
    Classification {
        heat,
        pool: Pool::from_heat(heat),
    }
}
