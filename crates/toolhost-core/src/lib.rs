//! Core abstractions for toolhost
//!
//! Defines the [`Agent`] trait implemented by every agent host, the per-run
//! [`Context`] bag, and the [`Error`] type the other crates convert into.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::{Context, RunUsage};
pub use error::{Error, Result};
