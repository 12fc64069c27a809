//! Functionality related to the `recipes distance` subcommand: permutation
//! tests comparing two groups of pairwise distances.

pub mod command;
pub mod compute;
pub mod matrix;
