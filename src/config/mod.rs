pub mod schema;

pub use schema::{Config, PruneAction, TimestampSource, expand_path};
