pub mod slug;
pub mod time;

pub use time::{Clock, SystemClock};
