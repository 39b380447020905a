//! The contract between the runtime and user programs.

mod app;

pub use app::{AppControl, Sketch};
