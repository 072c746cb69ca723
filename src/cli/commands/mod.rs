//! CLI command implementations.

mod ask;
mod config;
mod detect;
mod ingest;
mod list;
mod rank;
mod rechunk;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use detect::run_detect;
pub use ingest::run_ingest;
pub use list::run_list;
pub use rank::run_rank;
pub use rechunk::run_rechunk;
pub use serve::run_serve;
