//! Configuration helpers for the command line.

pub mod duration;
