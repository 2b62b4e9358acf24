//! Domain models produced by the burn calculation engine.
//!
//! These models are transport-agnostic. They serialize with camelCase keys
//! because the dashboard consumes them as JSON without further mapping.

mod period;
mod report;
mod validator;

pub use period::*;
pub use report::*;
pub use validator::*;
