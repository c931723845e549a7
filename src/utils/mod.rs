pub mod logger;
pub mod profiler;

pub use rmistub_utils::{errors, suggest};
