//! Functionality related to the `recipes cooccur` subcommand: permutation
//! tests for co-occurrence and mutual exclusivity of two features.

pub mod command;
pub mod compute;
