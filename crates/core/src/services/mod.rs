mod alerts;
mod period;
mod processor;
mod report;
mod split;

pub use alerts::*;
pub use period::*;
pub use processor::*;
pub use report::*;
pub use split::*;
