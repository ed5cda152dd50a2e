pub mod catalog;
pub mod config;
pub mod rate;
pub mod types;

pub use catalog::default_tasks;
pub use rate::{safe_percent, safe_ratio};
pub use types::*;
