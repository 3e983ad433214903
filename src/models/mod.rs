pub mod fabric;
pub mod gallery;
pub mod rate_limit;

pub use fabric::*;
pub use gallery::*;
pub use rate_limit::*;
