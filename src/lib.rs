pub mod config;
pub mod consolidate;
pub mod constants;
pub mod dates;
pub mod error;
pub mod extractors;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod schema;
pub mod table;
