//! CLI command handlers. Each command is in its own file.

mod batch;
mod cache;

pub use batch::run_batch;
pub use cache::{run_cache_delete, run_cache_list};
