/// Scoring and leveling for ranked words.
///
/// Higher difficulty means harder. Rarer words, higher CEFR tiers and
/// longer words all push the score up.
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 50;

/// Zipf value at which a word counts as common regardless of its tier
pub const EASY_ZIPF: f64 = 4.8;

const RARITY_CEILING: f64 = 7.0;
const RARITY_WEIGHT: f64 = 1.2;
const TIER_WEIGHT: f64 = 0.9;
const LENGTH_BASELINE: u32 = 3;
const LENGTH_WEIGHT: f64 = 0.35;
const MAX_DIFFICULTY: f64 = 20.0;

/// Difficulty score from frequency, proficiency tier and word length.
///
/// An undefined (or NaN) zipf contributes no rarity. Tiers outside 1..=6
/// contribute nothing rather than failing.
pub fn score(zipf: Option<f64>, tier: Option<u8>, length: u32) -> f64 {
    let rarity = match zipf {
        Some(z) if !z.is_nan() => (RARITY_CEILING - z).max(0.0),
        _ => 0.0,
    };
    let proficiency = match tier {
        Some(t @ 1..=6) => f64::from(t - 1),
        _ => 0.0,
    };
    let length_component = f64::from(length.saturating_sub(LENGTH_BASELINE)) * LENGTH_WEIGHT;

    rarity * RARITY_WEIGHT + proficiency * TIER_WEIGHT + length_component
}

/// Bucket a difficulty into a game level in 1..=50.
///
/// Difficulty is clamped to [0, 20] and scaled onto 0..=49, rounding ties to
/// even, so 0 maps to level 1 and 20 to level 50.
pub fn assign_level(difficulty: f64) -> u8 {
    let d = if difficulty.is_nan() {
        0.0
    } else {
        difficulty.clamp(0.0, MAX_DIFFICULTY)
    };
    let steps = f64::from(MAX_LEVEL - MIN_LEVEL);
    let bucket = (d / MAX_DIFFICULTY * steps).round_ties_even();
    MIN_LEVEL + bucket as u8
}

pub fn is_easy(cefr_basic: bool, zipf: Option<f64>) -> bool {
    cefr_basic || zipf.is_some_and(|z| z >= EASY_ZIPF)
}
