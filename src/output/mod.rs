// Wed Feb 04 2026 - Alex

pub mod json;
pub mod table;

pub use json::save_results;
pub use table::{AddressFormat, MatchTable};
