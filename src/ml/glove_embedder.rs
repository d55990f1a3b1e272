// ============================================================
// ML — GloVe Embedding Provider
// ============================================================
// Looks every token up in a StaticLookup table and stacks the
// vectors into a [batch, max_len, glove_dim] tensor. Positions
// past the end of a short sentence stay zero.
//
// Out-of-vocabulary tokens follow the configured OovPolicy:
//   Zero           → zero vector
//   Unknown(tok)   → the vector of `tok`, which is checked to
//                    exist when the provider is built

use anyhow::Result;
use burn::{prelude::*, tensor::TensorData};
use std::{borrow::Cow, fmt};

use crate::data::glove::GloveTable;
use crate::domain::{
    embedding::{GloveSpec, OovPolicy},
    token_batch::TokenBatch,
    traits::StaticLookup,
};
use crate::error::TextCnnError;

pub struct GloveEmbedder {
    table:     Box<dyn StaticLookup>,
    /// Vector for OOV tokens; None means zero
    unknown:   Option<Vec<f32>>,
    lowercase: bool,
}

impl GloveEmbedder {
    /// Load the table named by `spec` and build the provider.
    pub fn open(spec: &GloveSpec) -> Result<Self> {
        let table = GloveTable::from_file(&spec.file, spec.dim)?;
        Self::new(Box::new(table), spec.dim, &spec.oov, spec.lowercase)
    }

    /// Wrap any lookup table. `dim` is the configured glove_dim and
    /// must match the table.
    pub fn new(
        table:     Box<dyn StaticLookup>,
        dim:       usize,
        oov:       &OovPolicy,
        lowercase: bool,
    ) -> Result<Self> {
        if table.dim() != dim {
            return Err(TextCnnError::config(format!(
                "GloVe table is {}-wide, glove_dim is {dim}",
                table.dim(),
            ))
            .into());
        }

        let unknown = match oov {
            OovPolicy::Zero => None,
            OovPolicy::Unknown(token) => {
                let v = table.vector(token).ok_or_else(|| {
                    TextCnnError::config(format!("unknown token '{token}' is not in the GloVe table"))
                })?;
                Some(v.to_vec())
            }
        };

        Ok(Self { table, unknown, lowercase })
    }

    pub fn dim(&self) -> usize {
        self.table.dim()
    }

    /// [batch, max_len, glove_dim]
    pub fn embed<B: Backend>(&self, batch: &TokenBatch, device: &B::Device) -> Result<Tensor<B, 3>> {
        let dim     = self.dim();
        let max_len = batch.max_len();
        let mut flat = vec![0.0f32; batch.len() * max_len * dim];
        let mut oov  = 0usize;

        for (s, sentence) in batch.sentences().iter().enumerate() {
            for (t, token) in sentence.iter().enumerate() {
                let start = (s * max_len + t) * dim;
                let vector = match self.known(token) {
                    Some(v) => Some(v),
                    None    => {
                        oov += 1;
                        self.unknown.as_deref()
                    }
                };
                if let Some(v) = vector {
                    if v.len() != dim {
                        return Err(TextCnnError::shape(format!(
                            "GloVe vector for '{token}' has {} values, expected {dim}",
                            v.len(),
                        ))
                        .into());
                    }
                    flat[start..start + dim].copy_from_slice(v);
                }
            }
        }

        let total = batch.lengths().iter().sum::<usize>();
        if oov > 0 {
            tracing::debug!("GloVe: {oov} of {total} tokens out of vocabulary");
        }
        if total > 0 && oov * 2 > total {
            tracing::warn!("GloVe: more than half the batch is out of vocabulary ({oov}/{total})");
        }

        Ok(Tensor::from_data(TensorData::new(flat, [batch.len(), max_len, dim]), device))
    }

    /// The table vector of `token`, after optional lowercasing.
    fn known(&self, token: &str) -> Option<&[f32]> {
        let token: Cow<'_, str> = if self.lowercase {
            Cow::Owned(token.to_lowercase())
        } else {
            Cow::Borrowed(token)
        };
        self.table.vector(&token)
    }
}

impl fmt::Debug for GloveEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GloveEmbedder")
            .field("dim", &self.dim())
            .field("lowercase", &self.lowercase)
            .field("has_unknown", &self.unknown.is_some())
            .finish()
    }
}
