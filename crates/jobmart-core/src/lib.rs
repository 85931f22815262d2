//! Core types and trait definitions for the jobmart star-schema warehouse.
//!
//! This crate is free of database and file-format dependencies. It describes
//! the six dimensions, the fact row, the measures, and the [`Warehouse`]
//! contract that storage backends implement.
//!
//! [`Warehouse`]: store::Warehouse

// Native `async fn` in traits; `Send` bounds are spelled out in the signatures.
#![allow(async_fn_in_trait)]

pub mod dimension;
pub mod error;
pub mod fact;
pub mod record;
pub mod store;
pub mod value;

pub use error::{Error, Result};
