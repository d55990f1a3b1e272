// ============================================================
// Domain — TokenBatch
// ============================================================
// An ordered list of sentences, each an ordered list of token
// strings. Tokenisation happens upstream; the model only reads
// the batch.
//
// Sentences may have different lengths. Embedding providers pad
// the short ones with zero rows up to the longest sentence, and
// the convolution bank checks the SHORTEST one against its
// widest kernel.

use anyhow::Result;

use crate::error::TextCnnError;

/// A read-only batch of tokenised sentences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBatch {
    sentences: Vec<Vec<String>>,
}

impl TokenBatch {
    /// Wrap already tokenised sentences.
    pub fn new(sentences: Vec<Vec<String>>) -> Self {
        Self { sentences }
    }

    /// Build a batch from string slices.
    ///
    /// Example:
    ///   let batch = TokenBatch::from_tokens(&[&["a", "good", "film"]]);
    pub fn from_tokens<S: AsRef<str>>(sentences: &[&[S]]) -> Self {
        Self {
            sentences: sentences
                .iter()
                .map(|s| s.iter().map(|t| t.as_ref().to_string()).collect())
                .collect(),
        }
    }

    pub fn sentences(&self) -> &[Vec<String>] {
        &self.sentences
    }

    /// Number of sentences
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Token count of every sentence, in batch order
    pub fn lengths(&self) -> Vec<usize> {
        self.sentences.iter().map(Vec::len).collect()
    }

    /// Length of the longest sentence (0 for an empty batch)
    pub fn max_len(&self) -> usize {
        self.sentences.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Length of the shortest sentence (0 for an empty batch)
    pub fn min_len(&self) -> usize {
        self.sentences.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Reject batches no tensor can be built from:
    /// an empty batch, or any empty sentence.
    pub fn ensure_non_empty(&self) -> Result<()> {
        if self.sentences.is_empty() {
            return Err(TextCnnError::shape("token batch contains no sentences").into());
        }
        if let Some(i) = self.sentences.iter().position(Vec::is_empty) {
            return Err(TextCnnError::shape(format!("sentence {i} has no tokens")).into());
        }
        Ok(())
    }
}

impl From<Vec<Vec<String>>> for TokenBatch {
    fn from(sentences: Vec<Vec<String>>) -> Self {
        Self::new(sentences)
    }
}
