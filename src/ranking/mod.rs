pub mod cefr;
pub mod difficulty;
pub mod normalize;
pub mod record;

// Re-export the main types for convenience
pub use cefr::CefrLevel;
pub use difficulty::{assign_level, is_easy, score, MAX_LEVEL, MIN_LEVEL};
pub use normalize::{is_valid, normalize};
pub use record::{LevelCount, RankedRow, WordRecord};
