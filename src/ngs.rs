//! Functionality related to the `recipes ngs` subcommand: small tools for
//! next-generation sequencing files.

pub mod assembly;
pub mod command;
pub mod lines;
pub mod paired;
pub mod records;
pub mod samples;
