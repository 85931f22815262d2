//! Batch ETL from the flat job-postings dataset into a star-schema warehouse.
//!
//! The run is a fixed sequence of stages (see [`pipeline`]): six independent
//! dimension loads, a natural-key cache built from the loaded tables, fact
//! resolution against that cache, the fact load, and the post-load measures.
//! Storage goes through [`jobmart_core::store::Warehouse`].

pub mod cache;
pub mod config;
pub mod error;
pub mod load;
pub mod measure;
pub mod pipeline;
pub mod resolve;
pub mod source;

pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineOptions, RunSummary};
pub use source::CsvSource;
