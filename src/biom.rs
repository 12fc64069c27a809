//! Functionality related to the `recipes biom` subcommand: manipulation of
//! BIOM (Biological Observation Matrix) tables.

pub mod command;
pub mod seqs;
pub mod table;
