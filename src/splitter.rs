//! Splitting line-oriented files into multi-line entries.
//!
//! Many bioinformatics formats are a sequence of entries, each spanning
//! several lines. How an entry boundary is spotted differs from format to
//! format: FASTA entries begin with a `>` header, GenBank entries end with a
//! `//` line and GFF lines belong to the same entry as long as their first
//! column is unchanged. An [`EntryBoundary`] captures one such rule and a
//! [`Splitter`] applies it to a reader.
//!
//! ```
//! use recipes::splitter::{Splitter, StartsWith};
//!
//! let data = ">seq1\nATGC\n>seq2\nA\t\n\nT\n";
//! let entries: Vec<Vec<String>> = Splitter::new(StartsWith::new(">"))
//!     .construct(|line| line.trim().to_string())
//!     .entries(data.as_bytes())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(entries, vec![vec![">seq1", "ATGC"], vec![">seq2", "A", "", "T"]]);
//! ```

pub mod boundary;
pub mod command;

pub use boundary::EntryBoundary;
pub use boundary::EntryId;
pub use boundary::EntryTail;
pub use boundary::Matches;
pub use boundary::StartsWith;

use std::io::BufRead;

type Construct = Box<dyn Fn(&str) -> String>;
type Ignore = Box<dyn Fn(&str) -> bool>;

/// Reads entries from line-oriented input according to an [`EntryBoundary`].
pub struct Splitter<B> {
    boundary: B,
    construct: Option<Construct>,
    ignore: Option<Ignore>,
}

impl<B> Splitter<B>
where
    B: EntryBoundary,
{
    /// Creates a splitter that starts a new entry wherever `boundary` says so.
    pub fn new(boundary: B) -> Self {
        Self {
            boundary,
            construct: None,
            ignore: None,
        }
    }

    /// Transforms every kept line with `f` before it is added to an entry.
    /// The boundary still sees the untransformed line.
    pub fn construct<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + 'static,
    {
        self.construct = Some(Box::new(f));
        self
    }

    /// Drops every line for which `f` returns `true`, before boundary
    /// detection.
    pub fn ignore<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        self.ignore = Some(Box::new(f));
        self
    }

    /// Returns an iterator over the entries of `reader`. Lines are passed on
    /// without their line terminator.
    pub fn entries<R>(self, reader: R) -> Entries<R, B>
    where
        R: BufRead,
    {
        Entries {
            splitter: self,
            lines: reader.lines(),
            pending: Vec::new(),
            done: false,
        }
    }
}

/// An iterator over the entries of a reader. See [`Splitter::entries`].
pub struct Entries<R, B> {
    splitter: Splitter<B>,
    lines: std::io::Lines<R>,
    pending: Vec<String>,
    done: bool,
}

impl<R, B> Iterator for Entries<R, B>
where
    R: BufRead,
    B: EntryBoundary,
{
    type Item = std::io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return match self.pending.is_empty() {
                        true => None,
                        false => Some(Ok(std::mem::take(&mut self.pending))),
                    };
                }
            };

            if let Some(ignore) = &self.splitter.ignore {
                if ignore(&line) {
                    continue;
                }
            }

            let finished = match self.splitter.boundary.is_another(&line) {
                true if !self.pending.is_empty() => Some(std::mem::take(&mut self.pending)),
                _ => None,
            };

            let line = match &self.splitter.construct {
                Some(construct) => construct(&line),
                None => line,
            };
            self.pending.push(line);

            if let Some(entry) = finished {
                return Some(Ok(entry));
            }
        }
    }
}
