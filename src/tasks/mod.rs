//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: Removes expired in-process cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
