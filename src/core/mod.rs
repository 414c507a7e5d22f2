//! Core library components.
//!
//! This module contains the copy engine: the job file model, the store
//! abstraction and its implementations, and the freshness-driven copy logic.

pub mod constants;
pub mod copy;
pub mod domain;
pub mod job;
pub mod spec;
pub mod store;
pub mod types;
