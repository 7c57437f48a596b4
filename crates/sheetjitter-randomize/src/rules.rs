use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Header that triggers the delivered-vs-sent cap.
pub const DELIVERED_HEADER: &str = "Delivered";
/// Header expected immediately left of [`DELIVERED_HEADER`].
pub const SENT_HEADER: &str = "Sent";

const LOW_COUNT_ZERO_KEEP: f64 = 0.95;
const LOW_COUNT_ONE_KEEP: f64 = 0.7;
const LOW_COUNT_ONE_DROP: f64 = 0.9;
const LOW_COUNT_MAX: u32 = 3;
const CLICK_ZERO_KEEP: f64 = 0.8;
const CLICK_BURST_MAX: u32 = 50;
const DELIVERED_CAP_FLOOR: f64 = 0.9;
const DELIVERED_CAP_SPAN: f64 = 0.1;

/// Randomization policy selected by a column's header name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Counters that are usually 0, 1 or a few units.
    LowCount,
    /// Click counters: wider noise, occasional bursts from zero.
    ClickLike,
    /// Send volumes; `Delivered` is capped by an adjacent `Sent`.
    VolumePaired,
    /// Proportional noise for any other numeric column.
    Default,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 4] = [
        RuleCategory::LowCount,
        RuleCategory::ClickLike,
        RuleCategory::VolumePaired,
        RuleCategory::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::LowCount => "low_count",
            RuleCategory::ClickLike => "click_like",
            RuleCategory::VolumePaired => "volume_paired",
            RuleCategory::Default => "default",
        }
    }
}

const BUILTIN_RULES: &[(&str, RuleCategory)] = &[
    ("Complaints", RuleCategory::LowCount),
    ("SoftBounces", RuleCategory::LowCount),
    ("HardBounces", RuleCategory::LowCount),
    ("Unique Views", RuleCategory::LowCount),
    ("Trackable Views", RuleCategory::LowCount),
    ("UniqueViews", RuleCategory::LowCount),
    ("TrackableViews", RuleCategory::LowCount),
    ("Unsubscriptions", RuleCategory::LowCount),
    ("Viewed", RuleCategory::LowCount),
    ("Deferred", RuleCategory::LowCount),
    ("UniqueClicks", RuleCategory::ClickLike),
    ("Clicks", RuleCategory::ClickLike),
    ("Clickers", RuleCategory::ClickLike),
    ("Delivered", RuleCategory::VolumePaired),
    ("Sent", RuleCategory::VolumePaired),
];

/// Exact, case-sensitive mapping from header name to rule category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: BTreeMap<String, RuleCategory>,
}

impl RuleTable {
    /// Mapping for the campaign statistics exported by the mailing platform.
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(name, category)| (name.to_string(), *category))
            .collect();
        Self { rules }
    }

    /// Add or replace entries; later entries win.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, RuleCategory)>,
    {
        self.rules.extend(overrides);
        self
    }

    /// Category for a header; unknown names use [`RuleCategory::Default`].
    pub fn category(&self, header: &str) -> RuleCategory {
        self.rules
            .get(header)
            .copied()
            .unwrap_or(RuleCategory::Default)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, RuleCategory)> {
        self.rules
            .iter()
            .map(|(name, category)| (name.as_str(), *category))
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Compute a replacement for a finite numeric cell.
///
/// The result is always a whole number `>= 0`.
pub fn apply_rule<R: Rng + ?Sized>(
    category: RuleCategory,
    value: f64,
    variation_factor: f64,
    rng: &mut R,
) -> f64 {
    match category {
        RuleCategory::LowCount => low_count(value, variation_factor, rng),
        RuleCategory::ClickLike => click_like(value, variation_factor, rng),
        RuleCategory::VolumePaired | RuleCategory::Default => {
            jitter(value, variation_factor * 2.0, rng)
        }
    }
}

/// Pull a delivered count back under `sent` when it overshoots.
///
/// Returns `None` when no cap is needed.
pub fn cap_delivered<R: Rng + ?Sized>(delivered: f64, sent: f64, rng: &mut R) -> Option<f64> {
    if delivered <= sent {
        return None;
    }
    let share = DELIVERED_CAP_FLOOR + rng.random::<f64>() * DELIVERED_CAP_SPAN;
    let capped = floor_at_zero(round_half_up(sent * share));
    // fractional Sent values can round above themselves
    Some(capped.min(floor_at_zero(sent.floor())))
}

fn low_count<R: Rng + ?Sized>(value: f64, variation_factor: f64, rng: &mut R) -> f64 {
    if value == 0.0 {
        if rng.random::<f64>() < LOW_COUNT_ZERO_KEEP {
            0.0
        } else {
            small_count(LOW_COUNT_MAX, rng)
        }
    } else if value == 1.0 {
        if rng.random::<f64>() < LOW_COUNT_ONE_KEEP {
            1.0
        } else if rng.random::<f64>() < LOW_COUNT_ONE_DROP {
            0.0
        } else {
            small_count(LOW_COUNT_MAX, rng)
        }
    } else {
        jitter(value, variation_factor * 2.0, rng)
    }
}

fn click_like<R: Rng + ?Sized>(value: f64, variation_factor: f64, rng: &mut R) -> f64 {
    if value == 0.0 {
        if rng.random::<f64>() < CLICK_ZERO_KEEP {
            0.0
        } else {
            small_count(CLICK_BURST_MAX, rng)
        }
    } else {
        jitter(value, variation_factor * 4.0, rng)
    }
}

fn small_count<R: Rng + ?Sized>(max: u32, rng: &mut R) -> f64 {
    f64::from(rng.random_range(1..=max))
}

/// `value * (1 + (u - 0.5) * spread)`, rounded and clamped to `[0, f64::MAX]`.
fn jitter<R: Rng + ?Sized>(value: f64, spread: f64, rng: &mut R) -> f64 {
    let noise = (rng.random::<f64>() - 0.5) * spread;
    floor_at_zero(round_half_up(value * (1.0 + noise))).min(f64::MAX)
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

// also maps -0.0 to 0.0
fn floor_at_zero(value: f64) -> f64 {
    if value > 0.0 { value } else { 0.0 }
}
