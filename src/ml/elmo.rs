// ============================================================
// ML — ELMo Embedding Provider
// ============================================================
// ELMo itself (character CNN + two-layer biLM + scalar mix) is
// not implemented here. The integration supplies it as a
// ContextualEncoder, loaded from the files ElmoResources has
// already checked. This provider:
//
//   1. maps tokens to character ids (data::char_ids)
//   2. builds the [batch, max_len, 50] Int tensor on the model device
//   3. calls the encoder
//   4. keeps the FIRST output representation, verbatim
//
// Contract checked at construction: the encoder's output width
// equals the configured elmo_dim (config error).
// Contract checked per call: the representation has shape
// [batch, max_len, elmo_dim] (shape error).

use anyhow::Result;
use burn::{prelude::*, tensor::TensorData};
use std::fmt;

use crate::data::char_ids::batch_to_ids;
use crate::domain::token_batch::TokenBatch;
use crate::error::TextCnnError;
use crate::infra::elmo_resources::ElmoResources;

// ─── ContextualEncoder ────────────────────────────────────────────────────────
/// A pretrained contextual embedding function over character ids.
pub trait ContextualEncoder<B: Backend> {
    /// Width of every output representation
    fn output_dim(&self) -> usize;

    /// char_ids: [batch, max_len, 50], 0 on padded token positions.
    /// Returns one or more representations, each [batch, max_len, output_dim].
    fn encode(&self, char_ids: Tensor<B, 3, Int>) -> Result<Vec<Tensor<B, 3>>>;
}

/// Loader for models that never use ELMo. Fails if it is ever called.
pub fn no_contextual_encoder<B: Backend>(
    resources: &ElmoResources,
) -> Result<Box<dyn ContextualEncoder<B>>> {
    Err(TextCnnError::config(format!(
        "no ELMo encoder available for weights '{}'",
        resources.weight_file().display(),
    ))
    .into())
}

// ─── ElmoEmbedder ─────────────────────────────────────────────────────────────
pub struct ElmoEmbedder<B: Backend> {
    encoder: Box<dyn ContextualEncoder<B>>,
    dim:     usize,
}

impl<B: Backend> ElmoEmbedder<B> {
    pub fn new(encoder: Box<dyn ContextualEncoder<B>>, dim: usize) -> Result<Self> {
        if encoder.output_dim() != dim {
            return Err(TextCnnError::config(format!(
                "ELMo encoder produces {}-wide vectors, elmo_dim is {dim}",
                encoder.output_dim(),
            ))
            .into());
        }
        Ok(Self { encoder, dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// [batch, max_len, elmo_dim]
    pub fn embed(&self, batch: &TokenBatch, device: &B::Device) -> Result<Tensor<B, 3>> {
        let (ids, shape) = batch_to_ids(batch.sentences());
        let char_ids     = Tensor::<B, 3, Int>::from_data(TensorData::new(ids, shape), device);

        let representation = self
            .encoder
            .encode(char_ids)?
            .into_iter()
            .next()
            .ok_or_else(|| TextCnnError::shape("ELMo encoder returned no representations"))?;

        let expected = [batch.len(), batch.max_len(), self.dim];
        if representation.dims() != expected {
            return Err(TextCnnError::shape(format!(
                "ELMo representation has shape {:?}, expected {:?}",
                representation.dims(),
                expected,
            ))
            .into());
        }
        Ok(representation)
    }
}

impl<B: Backend> fmt::Debug for ElmoEmbedder<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElmoEmbedder").field("dim", &self.dim).finish_non_exhaustive()
    }
}

// ─── Test helpers ─────────────────────────────────────────────────────────────
/// Deterministic stand-in for a pretrained ELMo: each token's vector is
/// its (scaled) character ids, tiled to `dim`. Padded positions stay zero.
#[cfg(test)]
pub(crate) struct CharIdEncoder {
    pub dim: usize,
}

#[cfg(test)]
impl<B: Backend> ContextualEncoder<B> for CharIdEncoder {
    fn output_dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, char_ids: Tensor<B, 3, Int>) -> Result<Vec<Tensor<B, 3>>> {
        let [batch, len, chars] = char_ids.dims();
        let tiles = self.dim.div_ceil(chars);
        let x = char_ids
            .float()
            .div_scalar(261.0)
            .repeat_dim(2, tiles)
            .slice([0..batch, 0..len, 0..self.dim]);
        Ok(vec![x])
    }
}
