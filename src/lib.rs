pub mod analyzers;
pub mod archive;
pub mod cli;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod readers;
pub mod retrieval;
pub mod settings;
pub mod utils;
pub mod writers;

pub use error::{ProcessingError, Result};
