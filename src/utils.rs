//! Utilities that are used across the `recipes` subcommands.

pub mod args;
pub mod collections;
pub mod display;
pub mod expression;
pub mod formats;
pub mod interact;
pub mod metrics;
pub mod pathbuf;
