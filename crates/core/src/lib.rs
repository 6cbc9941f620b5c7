#![forbid(unsafe_code)]

pub mod color;
pub mod email;
pub mod model;
pub mod stats;
pub mod time;

pub use time::Clock;
