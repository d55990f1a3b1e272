// ============================================================
// Data — GloVe Table
// ============================================================
// Loads a GloVe text-format table into memory and serves it
// through the StaticLookup trait.
//
// File format (one entry per line, separated by ASCII spaces):
//
//   the 0.418 0.24968 -0.41242 ...
//   . . . 0.013441 0.23682 -0.16899 ...
//
// The last `dim` fields are the vector and everything before them
// is the token, so tokens may contain spaces or U+00A0 (both occur
// in the Common Crawl tables). Blank lines are skipped, and a
// leading word2vec-style header line "<count> <dim>" is tolerated.
// Duplicate tokens keep their first vector.
//
// Storage is one flat Vec<f32> plus a token → row index, so a
// lookup is a hash probe and a slice, without per-row allocation.
//
// Reference: Pennington et al. (2014) GloVe
//            Rust Book §8 (Hash Maps), §12 (Reading a File)

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::domain::traits::StaticLookup;
use crate::error::TextCnnError;

/// An in-memory static embedding table.
#[derive(Debug, Clone)]
pub struct GloveTable {
    dim:     usize,
    index:   HashMap<String, usize>,
    vectors: Vec<f32>,
}

impl GloveTable {
    /// Load a table of width `dim` from a GloVe text file.
    ///
    /// Fails with TextCnnError::ResourceLoad when the file is missing,
    /// unreadable, malformed, or empty.
    pub fn from_file(path: impl AsRef<Path>, dim: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| TextCnnError::resource(path, e.to_string()))
            .with_context(|| "Cannot open GloVe table")?;

        let table = Self::from_reader(BufReader::new(file), dim, path)?;
        tracing::info!(
            "Loaded GloVe table '{}': {} tokens x {} dims",
            path.display(),
            table.len(),
            dim,
        );
        Ok(table)
    }

    /// Parse a table from any buffered reader.
    /// `origin` is only used in error messages.
    pub fn from_reader<R: BufRead>(reader: R, dim: usize, origin: &Path) -> Result<Self> {
        let mut index   = HashMap::new();
        let mut vectors = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| TextCnnError::resource(origin, e.to_string()))?;
            let line = line.trim_end_matches(['\r', ' ']);
            if line.trim().is_empty() {
                continue;
            }
            if line_no == 0 && is_header(line, dim) {
                tracing::debug!("Skipping header line in '{}'", origin.display());
                continue;
            }

            let (token, values) = split_entry(line, dim).ok_or_else(|| {
                TextCnnError::resource(
                    origin,
                    format!(
                        "line {}: expected {} values after the token, found {}",
                        line_no + 1,
                        dim,
                        line.split(' ').count() - 1,
                    ),
                )
            })?;
            if index.contains_key(token) {
                continue;
            }

            let row = index.len();
            for raw in values {
                let value: f32 = raw.parse().map_err(|_| {
                    TextCnnError::resource(
                        origin,
                        format!("line {}: '{}' is not a number", line_no + 1, raw),
                    )
                })?;
                vectors.push(value);
            }
            index.insert(token.to_string(), row);
        }

        if index.is_empty() {
            return Err(TextCnnError::resource(origin, "table contains no vectors").into());
        }

        Ok(Self { dim, index, vectors })
    }

    /// Build a table from in-memory entries. Every vector must have length `dim`.
    pub fn from_entries<I>(dim: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut index   = HashMap::new();
        let mut vectors = Vec::new();

        for (token, vector) in entries {
            if vector.len() != dim {
                return Err(TextCnnError::shape(format!(
                    "vector for '{token}' has {} values, table width is {dim}",
                    vector.len(),
                ))
                .into());
            }
            if index.contains_key(&token) {
                continue;
            }
            index.insert(token, index.len());
            vectors.extend(vector);
        }

        Ok(Self { dim, index, vectors })
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }
}

impl StaticLookup for GloveTable {
    fn dim(&self) -> usize {
        self.dim
    }

    fn vector(&self, token: &str) -> Option<&[f32]> {
        self.index
            .get(token)
            .map(|&row| &self.vectors[row * self.dim..(row + 1) * self.dim])
    }
}

/// Split a line into its token and its last `dim` fields.
///
/// None when the line has too few fields, or when the token itself
/// ends in numeric fields, which means the row is wider than `dim`.
fn split_entry(line: &str, dim: usize) -> Option<(&str, Vec<&str>)> {
    let mut fields: Vec<&str> = line.rsplitn(dim + 1, ' ').collect();
    if fields.len() != dim + 1 {
        return None;
    }
    let token = fields.pop()?;
    if token.is_empty() {
        return None;
    }
    if let Some((_, tail)) = token.rsplit_once(' ') {
        if tail.parse::<f32>().is_ok() {
            return None;
        }
    }
    fields.reverse();
    Some((token, fields))
}

/// word2vec text files start with "<vocab_size> <dim>".
fn is_header(line: &str, dim: usize) -> bool {
    let fields: Vec<&str> = line.split(' ').collect();
    fields.len() == 2
        && fields[0].parse::<usize>().is_ok()
        && fields[1].parse::<usize>().map_or(false, |d| d == dim)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn parse(text: &str, dim: usize) -> Result<GloveTable> {
        GloveTable::from_reader(Cursor::new(text), dim, Path::new("inline"))
    }

    fn is_resource_error(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<TextCnnError>(),
            Some(TextCnnError::ResourceLoad { .. })
        )
    }

    #[test]
    fn test_lookup() {
        let table = parse("the 0.1 0.2 0.3\ncat 1 2 3\n", 3).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.vector("cat"), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(table.vector("dog"), None);
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let table = parse("a 1 1\na 2 2\n", 2).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.vector("a"), Some(&[1.0, 1.0][..]));
    }

    #[test]
    fn test_header_and_blank_lines_skipped() {
        let table = parse("2 2\n\nx 0 1\ny 1 0\n", 2).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains("y"));
    }

    #[test]
    fn test_wrong_width_is_resource_error() {
        let err = parse("the 0.1 0.2\n", 3).unwrap_err();
        assert!(is_resource_error(&err));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_wider_row_is_resource_error() {
        let err = parse("the 0.1 0.2 0.3\n", 2).unwrap_err();
        assert!(is_resource_error(&err));
    }

    #[test]
    fn test_tokens_with_spaces() {
        let table = parse("the 0.1 0.2\n. . . 0.3 0.4\na\u{a0}b 0.5 0.6\n", 2).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.vector(". . ."), Some(&[0.3, 0.4][..]));
        assert_eq!(table.vector("a\u{a0}b"), Some(&[0.5, 0.6][..]));
        assert_eq!(table.vector("the"), Some(&[0.1, 0.2][..]));
    }

    #[test]
    fn test_trailing_space_and_crlf() {
        let table = parse("x 1 2 \r\ny 3 4\r\n", 2).unwrap();
        assert_eq!(table.vector("x"), Some(&[1.0, 2.0][..]));
        assert_eq!(table.vector("y"), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn test_bad_number_is_resource_error() {
        let err = parse("the 0.1 abc\n", 2).unwrap_err();
        assert!(is_resource_error(&err));
    }

    #[test]
    fn test_empty_file_is_resource_error() {
        let err = parse("\n\n", 4).unwrap_err();
        assert!(is_resource_error(&err));
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let err = GloveTable::from_file("/definitely/not/here/glove.txt", 50).unwrap_err();
        assert!(is_resource_error(&err));
    }

    #[test]
    fn test_from_file() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "hello 0.5 -0.5").unwrap();
        writeln!(f, "world 0.25 0.75").unwrap();

        let table = GloveTable::from_file(f.path(), 2).unwrap();
        assert_eq!(table.dim(), 2);
        assert_eq!(table.vector("world"), Some(&[0.25, 0.75][..]));
    }

    #[test]
    fn test_from_entries_checks_width() {
        let ok = GloveTable::from_entries(2, vec![("a".to_string(), vec![1.0, 2.0])]);
        assert!(ok.is_ok());

        let bad = GloveTable::from_entries(2, vec![("a".to_string(), vec![1.0])]);
        assert!(bad.is_err());
    }
}
