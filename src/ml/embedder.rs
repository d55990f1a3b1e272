// ============================================================
// ML — Word Embedder (provider fusion)
// ============================================================
// One variant per embedding method, each holding only the
// providers it uses:
//
//   Elmo       → ElmoEmbedder
//   Glove      → GloveEmbedder
//   ElmoGlove  → both, concatenated as [elmo | glove] on the
//                last axis
//
// from_spec() opens every resource the spec names (GloVe table,
// ELMo options and weights) and asks the injected loader for the
// contextual encoder, so all resource failures happen here,
// at construction.
//
// ElmoGlove computes both embeddings on every call; nothing is
// cached between calls.

use anyhow::Result;
use burn::prelude::*;
use std::fmt;

use crate::domain::{
    embedding::{EmbeddingMethod, EmbeddingSpec},
    token_batch::TokenBatch,
};
use crate::infra::elmo_resources::ElmoResources;
use crate::ml::{
    elmo::{ContextualEncoder, ElmoEmbedder},
    glove_embedder::GloveEmbedder,
    network::EmbeddedBatch,
};

pub enum WordEmbedder<B: Backend> {
    Elmo(ElmoEmbedder<B>),
    Glove(GloveEmbedder),
    ElmoGlove {
        elmo:  ElmoEmbedder<B>,
        glove: GloveEmbedder,
    },
}

impl<B: Backend> WordEmbedder<B> {
    /// Open the resources of `spec` and build the matching providers.
    ///
    /// `load_elmo` is only called for methods that use ELMo; pass
    /// `ml::elmo::no_contextual_encoder` for GloVe-only models.
    pub fn from_spec<F>(spec: &EmbeddingSpec, load_elmo: F) -> Result<Self>
    where
        F: FnOnce(&ElmoResources) -> Result<Box<dyn ContextualEncoder<B>>>,
    {
        spec.validate()?;

        let embedder = match spec {
            EmbeddingSpec::Elmo { elmo } => {
                let resources = ElmoResources::open(elmo)?;
                Self::Elmo(ElmoEmbedder::new(load_elmo(&resources)?, elmo.dim)?)
            }
            EmbeddingSpec::Glove { glove } => Self::Glove(GloveEmbedder::open(glove)?),
            EmbeddingSpec::ElmoGlove { elmo, glove } => {
                let resources = ElmoResources::open(elmo)?;
                Self::ElmoGlove {
                    elmo:  ElmoEmbedder::new(load_elmo(&resources)?, elmo.dim)?,
                    glove: GloveEmbedder::open(glove)?,
                }
            }
        };

        tracing::info!(
            "Built {} embedder ({} dims per token)",
            embedder.method(),
            embedder.dim(),
        );
        Ok(embedder)
    }

    pub fn method(&self) -> EmbeddingMethod {
        match self {
            Self::Elmo(_)           => EmbeddingMethod::Elmo,
            Self::Glove(_)          => EmbeddingMethod::Glove,
            Self::ElmoGlove { .. }  => EmbeddingMethod::ElmoGlove,
        }
    }

    /// Width of the fused per-token vector
    pub fn dim(&self) -> usize {
        match self {
            Self::Elmo(elmo)               => elmo.dim(),
            Self::Glove(glove)             => glove.dim(),
            Self::ElmoGlove { elmo, glove } => elmo.dim() + glove.dim(),
        }
    }

    /// Embed a batch on `device`: [batch, max_len, dim] plus sentence lengths.
    pub fn embed(&self, batch: &TokenBatch, device: &B::Device) -> Result<EmbeddedBatch<B>> {
        batch.ensure_non_empty()?;

        let embeddings = match self {
            Self::Elmo(elmo)   => elmo.embed(batch, device)?,
            Self::Glove(glove) => glove.embed(batch, device)?,
            Self::ElmoGlove { elmo, glove } => {
                let glove = glove.embed(batch, device)?;
                let elmo  = elmo.embed(batch, device)?;
                Tensor::cat(vec![elmo, glove], 2)
            }
        };

        tracing::debug!("Embedded batch -> {:?}", embeddings.dims());
        Ok(EmbeddedBatch::new(embeddings, batch.lengths()))
    }
}

impl<B: Backend> fmt::Debug for WordEmbedder<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elmo(elmo)   => f.debug_tuple("Elmo").field(elmo).finish(),
            Self::Glove(glove) => f.debug_tuple("Glove").field(glove).finish(),
            Self::ElmoGlove { elmo, glove } => f
                .debug_struct("ElmoGlove")
                .field("elmo", elmo)
                .field("glove", glove)
                .finish(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::glove::GloveTable;
    use crate::domain::embedding::{ElmoSpec, GloveSpec, OovPolicy};
    use crate::error::TextCnnError;
    use crate::ml::elmo::{no_contextual_encoder, CharIdEncoder};
    use burn::backend::NdArray;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    type TestBackend = NdArray;

    fn glove_embedder(dim: usize) -> GloveEmbedder {
        let entries = ["a", "fine", "film", "dull"]
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), vec![i as f32 + 1.0; dim]));
        let table = GloveTable::from_entries(dim, entries).unwrap();
        GloveEmbedder::new(Box::new(table), dim, &OovPolicy::Zero, false).unwrap()
    }

    fn elmo_embedder(dim: usize) -> ElmoEmbedder<TestBackend> {
        ElmoEmbedder::new(Box::new(CharIdEncoder { dim }), dim).unwrap()
    }

    fn write_resources(dir: &Path, projection_dim: usize, glove_dim: usize) -> (ElmoSpec, GloveSpec) {
        let options = dir.join("options.json");
        let weights = dir.join("weights.hdf5");
        let table   = dir.join("glove.txt");
        fs::write(&options, format!(r#"{{"lstm": {{"projection_dim": {projection_dim}}}}}"#)).unwrap();
        fs::write(&weights, b"weights").unwrap();
        let row = vec!["0.1"; glove_dim].join(" ");
        fs::write(&table, format!("a {row}\nfilm {row}\n")).unwrap();

        (
            ElmoSpec { options_file: options, weight_file: weights, dim: 2 * projection_dim },
            GloveSpec { file: table, dim: glove_dim, oov: OovPolicy::Zero, lowercase: true },
        )
    }

    fn batch() -> TokenBatch {
        TokenBatch::from_tokens(&[&["a", "fine", "film"][..], &["dull"][..]])
    }

    #[test]
    fn test_fused_width_is_178() {
        let device   = Default::default();
        let embedder = WordEmbedder::ElmoGlove { elmo: elmo_embedder(128), glove: glove_embedder(50) };
        assert_eq!(embedder.dim(), 178);

        let out = embedder.embed(&batch(), &device).unwrap();
        assert_eq!(out.embeddings.dims(), [2, 3, 178]);
        assert_eq!(out.lengths, vec![3, 1]);
    }

    #[test]
    fn test_fusion_order_is_elmo_then_glove() {
        let device   = Default::default();
        let embedder = WordEmbedder::ElmoGlove { elmo: elmo_embedder(4), glove: glove_embedder(3) };
        let out      = embedder.embed(&batch(), &device).unwrap().embeddings;

        // First token "a" has GloVe vector [1, 1, 1] in the last three columns
        let glove_part = out.clone().slice([0..1, 0..1, 4..7]).into_data().to_vec::<f32>().unwrap();
        assert_eq!(glove_part, vec![1.0, 1.0, 1.0]);

        // ELMo part of "a" starts with the BOW character id (259) / 261
        let elmo_first = out.slice([0..1, 0..1, 0..1]).into_data().to_vec::<f32>().unwrap();
        assert!((elmo_first[0] - 259.0 / 261.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let device   = Default::default();
        let embedder = WordEmbedder::<TestBackend>::Glove(glove_embedder(2));
        let err      = embedder.embed(&TokenBatch::new(Vec::new()), &device).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TextCnnError>(),
            Some(TextCnnError::Shape { .. })
        ));
    }

    #[test]
    fn test_from_spec_elmo_glove() {
        let dir: TempDir = tempfile::tempdir().unwrap();
        let (elmo, glove) = write_resources(dir.path(), 64, 50);
        let spec = EmbeddingSpec::ElmoGlove { elmo, glove };

        let embedder = WordEmbedder::<TestBackend>::from_spec(&spec, |res| {
            Ok(Box::new(CharIdEncoder { dim: res.output_dim() }) as Box<dyn ContextualEncoder<TestBackend>>)
        })
        .unwrap();

        assert_eq!(embedder.method(), EmbeddingMethod::ElmoGlove);
        assert_eq!(embedder.dim(), 178);
    }

    #[test]
    fn test_from_spec_glove_never_calls_loader() {
        let dir: TempDir = tempfile::tempdir().unwrap();
        let (_, glove) = write_resources(dir.path(), 64, 8);
        let spec = EmbeddingSpec::Glove { glove };

        let embedder = WordEmbedder::<TestBackend>::from_spec(&spec, no_contextual_encoder).unwrap();
        assert_eq!(embedder.dim(), 8);
    }

    #[test]
    fn test_from_spec_missing_table_fails() {
        let dir: TempDir = tempfile::tempdir().unwrap();
        let (_, mut glove) = write_resources(dir.path(), 64, 8);
        glove.file = dir.path().join("absent.txt");

        let err = WordEmbedder::<TestBackend>::from_spec(
            &EmbeddingSpec::Glove { glove },
            no_contextual_encoder,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TextCnnError>(),
            Some(TextCnnError::ResourceLoad { .. })
        ));
    }
}
