//! # Stowage Core
//!
//! Core types and traits for Stowage storage engines.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of Stowage.**
//!
//! Users should depend on the main [`stowage`](https://crates.io/crates/stowage) crate
//! instead, which provides the stable public API.
//!
//! ---
//!
//! - [`StorageKey`]: keys wrapping one raw scalar, convertible across key
//!   types that share a raw kind
//! - [`StorageEngine`]: the async key-value contract with batch defaults
//! - [`MemoryEngine`]: an in-memory backend
//! - [`KeyErasingEngine`]: presents an engine under another key type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod engine;
pub mod error;
pub mod key;
pub mod memory;

pub use adapter::KeyErasingEngine;
pub use engine::StorageEngine;
pub use error::{Error, Result};
pub use key::{CacheKey, Identifier, IntKey, RawKey, StorageKey};
pub use memory::MemoryEngine;
