pub mod config;
pub mod cursor;
pub mod error;
pub mod fetch;
pub mod history;
pub mod job;
pub mod publish;
pub mod stats;

pub use error::Error;
