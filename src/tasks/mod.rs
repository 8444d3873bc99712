//! Background Tasks Module
//!
//! Contains background tasks for the in-process backend.
//!
//! # Tasks
//! - TTL Purge: Removes expired entries at configured intervals

mod purge;

pub use purge::spawn_purge_task;
