pub mod fabric_catalog;
pub mod gallery;
pub mod metrics;
pub mod rate_limiter;

pub use fabric_catalog::*;
pub use gallery::*;
pub use metrics::*;
pub use rate_limiter::*;
