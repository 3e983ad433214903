pub mod metrics;
pub mod visitor;

pub use metrics::*;
pub use visitor::*;
