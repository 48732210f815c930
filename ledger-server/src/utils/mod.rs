//! Utilities - logging and time

pub mod logger;
pub mod time;

pub use time::{Clock, ManualClock, SystemClock};
