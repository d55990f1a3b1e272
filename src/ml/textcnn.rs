// ============================================================
// ML — TextCnn (full classifier)
// ============================================================
// Ties the frozen embedding providers to the trainable network:
//
//   TokenBatch
//       │  WordEmbedder::embed        [batch, max_len, word_dim]
//       ▼
//   TextCnnNetwork
//       │  conv bank → ReLU → max over time → concat
//       │  dropout (Mode::Train) → Linear
//       ▼
//   logits [batch, num_labels]
//
// Construction order:
//   1. validate the configuration         (config errors)
//   2. open resources, build providers    (resource / config errors)
//   3. check providers against the config (config errors)
//   4. initialise parameters
//
// so every configuration or resource problem surfaces before the
// first forward call.
//
// Reference: Kim (2014) Convolutional Neural Networks for Sentence Classification

use anyhow::Result;
use burn::prelude::*;

use crate::domain::{embedding::EmbeddingSpec, token_batch::TokenBatch};
use crate::error::TextCnnError;
use crate::infra::{device::DevicePlacement, elmo_resources::ElmoResources};
use crate::ml::{
    elmo::ContextualEncoder,
    embedder::WordEmbedder,
    mode::Mode,
    network::{EmbeddedBatch, TextCnnNetwork, TextCnnNetworkConfig},
};

// ─── Configuration ────────────────────────────────────────────────────────────
// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct TextCnnConfig {
    pub embedding:     EmbeddingSpec,
    /// Convolution kernel widths, in order
    pub kernel_widths: Vec<usize>,
    pub num_filters:   usize,
    pub num_labels:    usize,
    pub dropout:       f64,
    pub placement:     DevicePlacement,
}

impl TextCnnConfig {
    /// Width of the per-token vector entering the convolutions
    pub fn word_dim(&self) -> usize {
        self.embedding.word_dim()
    }

    /// The configuration of the trainable part
    pub fn network(&self) -> TextCnnNetworkConfig {
        TextCnnNetworkConfig::new(
            self.word_dim(),
            self.kernel_widths.clone(),
            self.num_filters,
            self.num_labels,
            self.dropout,
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.embedding.validate()?;
        self.network().validate()
    }
}

// ─── TextCnn ──────────────────────────────────────────────────────────────────
#[derive(Debug)]
pub struct TextCnn<B: Backend> {
    config:   TextCnnConfig,
    embedder: WordEmbedder<B>,
    network:  TextCnnNetwork<B>,
    device:   B::Device,
}

impl<B: Backend> TextCnn<B> {
    /// Build the classifier, loading every resource the config names.
    ///
    /// `load_elmo` turns checked ELMo resources into an encoder; it is
    /// not called for GloVe-only configurations.
    pub fn from_config<F>(config: TextCnnConfig, load_elmo: F, device: &B::Device) -> Result<Self>
    where
        F: FnOnce(&ElmoResources) -> Result<Box<dyn ContextualEncoder<B>>>,
    {
        config.validate()?;
        let embedder = WordEmbedder::from_spec(&config.embedding, load_elmo)?;
        Self::new(config, embedder, device)
    }

    /// Build the classifier around an already constructed embedder.
    pub fn new(config: TextCnnConfig, embedder: WordEmbedder<B>, device: &B::Device) -> Result<Self> {
        config.validate()?;

        if embedder.method() != config.embedding.method() {
            return Err(TextCnnError::config(format!(
                "configured for '{}' embeddings but given a '{}' embedder",
                config.embedding.method(),
                embedder.method(),
            ))
            .into());
        }
        if embedder.dim() != config.word_dim() {
            return Err(TextCnnError::config(format!(
                "embedder produces {}-wide vectors, word_dim is {}",
                embedder.dim(),
                config.word_dim(),
            ))
            .into());
        }

        let network = config.network().init(device)?;

        tracing::info!(
            "TextCNN ready: method={}, word_dim={}, kernels={:?}, filters={}, labels={}, dropout={}",
            config.embedding.method(),
            config.word_dim(),
            config.kernel_widths,
            config.num_filters,
            config.num_labels,
            config.dropout,
        );

        Ok(Self { config, embedder, network, device: device.clone() })
    }

    /// Logits [batch, num_labels] for a batch of tokenised sentences.
    pub fn forward(&self, batch: &TokenBatch, mode: Mode) -> Result<Tensor<B, 2>> {
        let embedded = self.embed(batch)?;
        self.network.forward(&embedded, mode)
    }

    /// Pooled features before dropout: [batch, num_filters × |k|].
    pub fn features(&self, batch: &TokenBatch) -> Result<Tensor<B, 2>> {
        let embedded = self.embed(batch)?;
        self.network.features(&embedded)
    }

    /// Embeddings as fed to the convolutions.
    pub fn embed(&self, batch: &TokenBatch) -> Result<EmbeddedBatch<B>> {
        let embedded = self.embedder.embed(batch, &self.device)?;
        if embedded.word_dim() != self.config.word_dim() {
            return Err(TextCnnError::shape(format!(
                "embedded width is {}, word_dim is {}",
                embedded.word_dim(),
                self.config.word_dim(),
            ))
            .into());
        }
        Ok(embedded)
    }

    pub fn config(&self) -> &TextCnnConfig {
        &self.config
    }

    pub fn embedder(&self) -> &WordEmbedder<B> {
        &self.embedder
    }

    pub fn network(&self) -> &TextCnnNetwork<B> {
        &self.network
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Swap in updated parameters, e.g. after an optimiser step or
    /// after loading a record.
    pub fn with_network(mut self, network: TextCnnNetwork<B>) -> Result<Self> {
        if network.word_dim() != self.config.word_dim() {
            return Err(TextCnnError::shape(format!(
                "network expects {}-wide embeddings, word_dim is {}",
                network.word_dim(),
                self.config.word_dim(),
            ))
            .into());
        }
        self.network = network;
        Ok(self)
    }
}
