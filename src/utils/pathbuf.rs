//! Extensions to and utilities concerning [`PathBuf`]s.
//!
//! # Overview
//!
//! Many `recipes` subcommands take an output _prefix_ rather than a full
//! output path and derive several sibling files from it (for example, the
//! four files written when splitting paired-end reads). A prefix may include
//! directories and dots of its own, so [`Path::with_extension`] is the wrong
//! tool: it replaces whatever follows the last dot. This module provides
//! [`AppendSuffix`], which appends dot-separated components to the final
//! path component verbatim.
//!
//! ```
//! use std::path::PathBuf;
//! // Trait must be in scope to use it.
//! use recipes::utils::pathbuf::AppendSuffix;
//!
//! assert_eq!(
//!     PathBuf::from("out/sample.v2").append_suffix(["r1", "fq", "gz"]),
//!     PathBuf::from("out/sample.v2.r1.fq.gz")
//! )
//! ```

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

/// A trait that adds an [`append_suffix`][AppendSuffix::append_suffix]
/// method to paths.
pub trait AppendSuffix {
    /// Appends each of `parts`, each preceded by a `.`, to the final
    /// component of the path.
    ///
    /// ```
    /// use std::path::Path;
    /// use recipes::utils::pathbuf::AppendSuffix;
    ///
    /// let chunk = Path::new("/tmp/genes").append_suffix(["0", "gff"]);
    /// assert_eq!(chunk.file_name().unwrap(), "genes.0.gff");
    /// ```
    fn append_suffix<I, S>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;
}

impl AppendSuffix for Path {
    fn append_suffix<I, S>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut name: OsString = self.as_os_str().to_os_string();

        for part in parts {
            name.push(".");
            name.push(part.as_ref());
        }

        PathBuf::from(name)
    }
}

impl AppendSuffix for PathBuf {
    fn append_suffix<I, S>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.as_path().append_suffix(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_suffix_keeps_existing_dots() {
        let path = PathBuf::from("a.b/c.d");
        assert_eq!(path.append_suffix(["e"]), PathBuf::from("a.b/c.d.e"));
    }

    #[test]
    fn test_append_nothing() {
        let path = PathBuf::from("prefix");
        assert_eq!(path.append_suffix(Vec::<String>::new()), path);
    }
}
