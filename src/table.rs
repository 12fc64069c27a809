//! Statistics and plots over sample-by-feature abundance tables.

pub mod abundance;
pub mod command;
pub mod plot;
pub mod stats;
