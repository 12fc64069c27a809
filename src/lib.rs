//! `recipes` is a collection of small bioinformatics tools: permutation tests
//! on distance matrices, co-occurrence statistics, BIOM table manipulation,
//! sequence file handling, job-array script generation for the PBS scheduler
//! and abundance plots. This package is composed of both a library crate, as
//! well as a binary crate.
//!
//! Each module holds the functionality behind one `recipes` subcommand, with
//! the command line handling itself kept in its `command` submodule.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod biom;
pub mod cooccur;
pub mod distance;
pub mod ngs;
pub mod pbs;
pub mod research;
pub mod splitter;
pub mod table;
pub mod utils;
