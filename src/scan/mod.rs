// Mon Feb 02 2026 - Alex

pub mod driver;
pub mod error;
pub mod planner;
pub mod session;

pub use driver::{MatchStream, RuleMatch, ScanDriver};
pub use error::ScanError;
pub use planner::{plan, ChunkPlan, ScanParameters, ScanUnit, SliceRequest};
pub use session::{LayerMatches, ScanSession};
