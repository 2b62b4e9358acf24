mod cache;
mod chain_source;

pub use cache::*;
pub use chain_source::*;
