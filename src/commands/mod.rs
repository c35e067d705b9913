//! Command handlers.
//!
//! This module contains handlers for the generate, plan, check and verify
//! commands.

pub mod check;
pub mod generate;
pub mod plan;
pub mod verify;

pub use check::run_check;
pub use generate::{run_generate, GenerateArgs};
pub use plan::{run_plan, PlanArgs};
pub use verify::{run_verify, VerifyArgs};
