//! Helpers for nested and two-dimensional collections.

/// A value that is either a single item or an arbitrarily nested list of
/// further values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Nested<T> {
    /// A single item.
    Item(T),

    /// A list of nested values.
    List(Vec<Nested<T>>),
}

impl<T> From<T> for Nested<T> {
    fn from(item: T) -> Self {
        Nested::Item(item)
    }
}

/// Flattens any nesting into a single list, preserving order.
///
/// ```
/// use recipes::utils::collections::{flatten, Nested};
///
/// let nested = vec![
///     Nested::Item(1),
///     Nested::List(vec![Nested::Item(2), Nested::List(vec![Nested::Item(3)])]),
///     Nested::Item(4),
/// ];
/// assert_eq!(flatten(nested), vec![1, 2, 3, 4]);
/// ```
pub fn flatten<T>(items: Vec<Nested<T>>) -> Vec<T> {
    let mut result = Vec::new();
    let mut stack: Vec<std::vec::IntoIter<Nested<T>>> = vec![items.into_iter()];

    while let Some(iter) = stack.last_mut() {
        match iter.next() {
            Some(Nested::Item(item)) => result.push(item),
            Some(Nested::List(list)) => stack.push(list.into_iter()),
            None => {
                stack.pop();
            }
        }
    }

    result
}

/// Returns the `(row, column)` position of every cell for which `select`
/// returns true, in row-major order.
pub fn which<T, F>(rows: &[Vec<T>], select: F) -> Vec<(usize, usize)>
where
    F: Fn(&T) -> bool,
{
    let mut found = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            if select(cell) {
                found.push((i, j));
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_deeply_nested() {
        let nested = vec![
            Nested::List(vec![
                Nested::List(vec![1.into(), 2.into(), 3.into()]),
                Nested::List(vec![42.into()]),
            ]),
            Nested::List(vec![4.into(), 5.into()]),
            Nested::List(vec![6.into()]),
            7.into(),
            Nested::List(vec![8.into(), 9.into(), 10.into()]),
        ];
        assert_eq!(flatten(nested), vec![1, 2, 3, 42, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_flatten_empty() {
        let nested: Vec<Nested<u8>> = vec![Nested::List(vec![])];
        assert!(flatten(nested).is_empty());
    }

    #[test]
    fn test_which_finds_matching_cells() {
        let rows = vec![vec![true, false], vec![false, true]];
        let found = which(&rows, |x| *x);
        assert_eq!(found, vec![(0, 0), (1, 1)]);
    }
}
