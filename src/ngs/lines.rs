//! Line counting for plain and gzipped files.

use std::io::BufRead;
use std::path::Path;

use anyhow::Context;

use crate::utils::formats::open_maybe_gzipped;

/// Counts the lines of `path`, decompressing it first when its name ends in
/// `.gz`. A final line without a trailing newline is counted.
pub fn count_lines<P>(path: P) -> anyhow::Result<usize>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let reader = open_maybe_gzipped(path)
        .with_context(|| format!("opening file: {}", path.display()))?;
    count_lines_from(reader).with_context(|| format!("reading file: {}", path.display()))
}

/// Counts the lines produced by any buffered reader.
pub fn count_lines_from<R>(mut reader: R) -> std::io::Result<usize>
where
    R: BufRead,
{
    let mut count = 0;
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer)? {
            0 => break,
            _ => count += 1,
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;

    #[test]
    fn test_count_without_trailing_newline() {
        assert_eq!(count_lines_from(&b"a\nb\nc"[..]).unwrap(), 3);
        assert_eq!(count_lines_from(&b"a\nb\nc\n"[..]).unwrap(), 3);
        assert_eq!(count_lines_from(&b""[..]).unwrap(), 0);
    }

    #[test]
    fn test_count_plain_and_gzipped_files() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("a.txt");
        std::fs::write(&plain, "1\n2\n3\n4\n").unwrap();
        assert_eq!(count_lines(&plain).unwrap(), 4);

        let gzipped = dir.path().join("a.txt.gz");
        let mut encoder = GzEncoder::new(
            std::fs::File::create(&gzipped).unwrap(),
            Compression::default(),
        );
        encoder.write_all(b"1\n2\n").unwrap();
        encoder.finish().unwrap();
        assert_eq!(count_lines(&gzipped).unwrap(), 2);
    }
}
