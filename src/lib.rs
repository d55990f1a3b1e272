// ============================================================
// elmo-textcnn
// ============================================================
// A TextCNN sentence classifier over pretrained word
// embeddings (ELMo, GloVe, or both concatenated).
//
// Layers, leaf to root:
//
//   domain/  — token batches, embedding specs, lookup trait
//   data/    — GloVe table loading, ELMo character ids
//   infra/   — options file, ELMo resource handles, devices
//   ml/      — Burn model: providers, conv bank, head, TextCnn
//
// Typical use:
//
//   let options = ModelOptions::from_file("textcnn.json")?;
//   let config  = options.into_config()?;
//   let device  = config.placement.wgpu_device();
//   let model   = TextCnn::<Wgpu>::from_config(config, load_elmo, &device)?;
//   let logits  = model.forward(&batch, Mode::Inference)?;
//
// The crate does not install a tracing subscriber; the
// application embedding it decides where logs go.

#![recursion_limit = "256"]

pub mod error;

pub mod domain;

pub mod data;

pub mod infra;

pub mod ml;

pub use domain::{
    embedding::{ElmoSpec, EmbeddingMethod, EmbeddingSpec, GloveSpec, OovPolicy},
    token_batch::TokenBatch,
    traits::StaticLookup,
};
pub use error::TextCnnError;
pub use infra::{device::DevicePlacement, elmo_resources::ElmoResources, options::ModelOptions};
pub use ml::{
    elmo::{no_contextual_encoder, ContextualEncoder},
    embedder::WordEmbedder,
    mode::Mode,
    network::{EmbeddedBatch, TextCnnNetwork, TextCnnNetworkConfig},
    textcnn::{TextCnn, TextCnnConfig},
};
