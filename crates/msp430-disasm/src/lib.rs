pub mod model;

// Re-export commonly used helpers for the binaries
pub use model::{hex_to_bytes, load_dump, parse_offset};
