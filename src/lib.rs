// Library surface for the batch job, the query service and integration tests.
// The binary in main.rs only parses flags and wires these together.
pub mod app_dirs;
pub mod builder;
pub mod config;
pub mod error;
pub mod frequency;
pub mod puzzle;
pub mod query;
pub mod ranking;
pub mod server;
pub mod store;

pub use error::{LexirankError, Result};
pub use puzzle::PuzzleView;
pub use query::{QueryService, StatsView, WordsParams};
pub use ranking::{CefrLevel, WordRecord};
