//! Rules deciding where a new entry starts.

use regex::Regex;

/// Decides, one line at a time, whether a line starts a new entry.
pub trait EntryBoundary {
    /// Returns `true` when `line` is the first line of a new entry.
    fn is_another(&mut self, line: &str) -> bool;
}

impl<B> EntryBoundary for Box<B>
where
    B: EntryBoundary + ?Sized,
{
    fn is_another(&mut self, line: &str) -> bool {
        (**self).is_another(line)
    }
}

/// A new entry starts at each line beginning with a fixed prefix.
pub struct StartsWith(String);

impl StartsWith {
    /// Creates a boundary for lines beginning with `prefix`.
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self(prefix.into())
    }
}

impl EntryBoundary for StartsWith {
    fn is_another(&mut self, line: &str) -> bool {
        line.starts_with(&self.0)
    }
}

/// A new entry starts at each line matching a regex.
pub struct Matches(Regex);

impl Matches {
    /// Creates a boundary for lines matching `re`.
    pub fn new(re: Regex) -> Self {
        Self(re)
    }
}

impl EntryBoundary for Matches {
    fn is_another(&mut self, line: &str) -> bool {
        self.0.is_match(line)
    }
}

/// For formats whose entries end with a terminating line (such as the `//`
/// of GenBank). The line after a tail starts a new entry.
pub struct EntryTail<F> {
    is_tail: F,
    after_tail: bool,
}

impl<F> EntryTail<F>
where
    F: FnMut(&str) -> bool,
{
    /// Creates a boundary from a predicate recognising the tail line.
    pub fn new(is_tail: F) -> Self {
        Self {
            is_tail,
            after_tail: false,
        }
    }
}

impl<F> EntryBoundary for EntryTail<F>
where
    F: FnMut(&str) -> bool,
{
    fn is_another(&mut self, line: &str) -> bool {
        if (self.is_tail)(line) {
            self.after_tail = true;
            return false;
        }

        std::mem::replace(&mut self.after_tail, false)
    }
}

/// For formats carrying an entry id on every line (such as the first column
/// of GFF). A change of id starts a new entry.
pub struct EntryId<F, K> {
    identify: F,
    current: Option<K>,
}

impl<F, K> EntryId<F, K>
where
    F: FnMut(&str) -> K,
    K: PartialEq,
{
    /// Creates a boundary from a function extracting the id of a line.
    pub fn new(identify: F) -> Self {
        Self {
            identify,
            current: None,
        }
    }
}

impl<F, K> EntryBoundary for EntryId<F, K>
where
    F: FnMut(&str) -> K,
    K: PartialEq,
{
    fn is_another(&mut self, line: &str) -> bool {
        let id = (self.identify)(line);

        match &self.current {
            Some(current) if *current == id => false,
            _ => {
                self.current = Some(id);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_resets_after_new_entry() {
        let mut b = EntryTail::new(|l: &str| l == "//");
        assert!(!b.is_another("a"));
        assert!(!b.is_another("//"));
        assert!(b.is_another("b"));
        assert!(!b.is_another("c"));
    }

    #[test]
    fn test_id_change() {
        let mut b = EntryId::new(|l: &str| l.chars().next());
        assert!(b.is_another("a1"));
        assert!(!b.is_another("a2"));
        assert!(b.is_another("b1"));
    }

    #[test]
    fn test_matches() {
        let mut b = Matches::new(Regex::new("^LOCUS").unwrap());
        assert!(b.is_another("LOCUS  x"));
        assert!(!b.is_another("  LOCUS"));
    }
}
