//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Time is a signed f64 number of seconds since an arbitrary epoch
//! - `TickTime` quantizes it to a fixed tick rate; the tick index is the
//!   shared vocabulary between the synchronizer, the scheduler and the
//!   snapshot interpolator

mod config;
mod error;
mod event;
mod tick_time;

pub use config::*;
pub use error::*;
pub use event::*;
pub use tick_time::TickTime;
