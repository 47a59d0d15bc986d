// Mon Feb 02 2026 - Alex

pub mod address;
pub mod error;
pub mod image;
pub mod process;
pub mod protection;
pub mod range;
pub mod region;
pub mod traits;

pub use address::Address;
pub use error::MemoryError;
pub use image::ImageMemory;
pub use process::{list_processes, select_processes, ProcessInfo, ProcessMemory};
pub use protection::Protection;
pub use range::MemoryRange;
pub use region::MemoryRegion;
pub use traits::MemoryReader;
