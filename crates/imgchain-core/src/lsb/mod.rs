pub mod compress;
pub mod ecc;
pub mod embed;
pub mod extract;
pub mod frame;

pub use embed::{embed, required_bits};
pub use extract::{extract, LsbExtraction};
