pub mod blocks;
pub mod embed;
pub mod extract;
pub mod metadata;
pub mod transform;

pub use embed::{capacity_bits, try_embed};
pub use extract::extract;
pub use metadata::CriticalMetadata;
