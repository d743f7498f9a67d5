// Utils compartidos

pub mod constants;
pub mod format;
pub mod id;
pub mod perf;
pub mod storage;
pub mod time;

pub use format::{format_date, format_price};
pub use id::generate_id;
pub use time::Now;
