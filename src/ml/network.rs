// ============================================================
// ML — TextCNN Network (trainable part)
// ============================================================
// The conv bank and the classification head, composed. This is
// the only part of the classifier that holds trainable
// parameters; the embedding providers are frozen and live
// outside the Module (see textcnn.rs).
//
// Being a plain Burn Module, the network can be moved to an
// Autodiff backend, optimised, recorded and restored by an
// outside training loop like any other Burn model.

use anyhow::Result;
use burn::prelude::*;

use crate::error::TextCnnError;
use crate::ml::{
    conv_bank::{ConvBank, ConvBankConfig},
    head::{max_over_time, ClassifierHead, ClassifierHeadConfig},
    mode::Mode,
};

// ─── EmbeddedBatch ────────────────────────────────────────────────────────────
/// Output of an embedding provider.
#[derive(Debug, Clone)]
pub struct EmbeddedBatch<B: Backend> {
    /// [batch, max_len, word_dim]; rows past a sentence's end are zero
    pub embeddings: Tensor<B, 3>,
    /// Real token count of every sentence
    pub lengths:    Vec<usize>,
}

impl<B: Backend> EmbeddedBatch<B> {
    pub fn new(embeddings: Tensor<B, 3>, lengths: Vec<usize>) -> Self {
        Self { embeddings, lengths }
    }

    /// Every sentence has the full padded length.
    pub fn dense(embeddings: Tensor<B, 3>) -> Self {
        let [batch, len, _] = embeddings.dims();
        Self { embeddings, lengths: vec![len; batch] }
    }

    pub fn word_dim(&self) -> usize {
        self.embeddings.dims()[2]
    }

    pub fn shortest(&self) -> usize {
        self.lengths.iter().copied().min().unwrap_or(0)
    }
}

// ─── Config ───────────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct TextCnnNetworkConfig {
    pub word_dim:      usize,
    pub kernel_widths: Vec<usize>,
    pub num_filters:   usize,
    pub num_labels:    usize,
    pub dropout:       f64,
}

impl TextCnnNetworkConfig {
    /// Width of the pooled feature vector
    pub fn total_filters(&self) -> usize {
        self.num_filters * self.kernel_widths.len()
    }

    /// Kernel widths must be a non-empty set of positive integers;
    /// every count must be positive; dropout must lie in [0, 1).
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(TextCnnError::config(msg).into()) };

        if self.word_dim == 0 {
            return fail("word_dim must be positive".into());
        }
        if self.kernel_widths.is_empty() {
            return fail("at least one kernel width is required".into());
        }
        if self.kernel_widths.contains(&0) {
            return fail(format!("kernel widths must be positive, got {:?}", self.kernel_widths));
        }
        for (i, k) in self.kernel_widths.iter().enumerate() {
            if self.kernel_widths[..i].contains(k) {
                return fail(format!("kernel width {k} is listed twice"));
            }
        }
        if self.num_filters == 0 {
            return fail("num_filters must be positive".into());
        }
        if self.num_labels == 0 {
            return fail("num_labels must be positive".into());
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return fail(format!("dropout must be in [0, 1), got {}", self.dropout));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<TextCnnNetwork<B>> {
        self.validate()?;

        let conv_bank = ConvBankConfig::new(self.word_dim, self.kernel_widths.clone(), self.num_filters)
            .init(device);
        let head = ClassifierHeadConfig::new(self.total_filters(), self.num_labels, self.dropout)
            .init(device);

        tracing::debug!(
            "Initialised TextCNN network: word_dim={}, kernels={:?}, filters={}, labels={}",
            self.word_dim,
            self.kernel_widths,
            self.num_filters,
            self.num_labels,
        );
        Ok(TextCnnNetwork { conv_bank, head })
    }
}

// ─── Network ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct TextCnnNetwork<B: Backend> {
    pub conv_bank: ConvBank<B>,
    pub head:      ClassifierHead<B>,
}

impl<B: Backend> TextCnnNetwork<B> {
    pub fn word_dim(&self) -> usize {
        self.conv_bank.word_dim()
    }

    /// Activated convolution output per kernel width.
    pub fn feature_maps(&self, batch: &EmbeddedBatch<B>) -> Result<Vec<Tensor<B, 3>>> {
        self.conv_bank.forward(batch.embeddings.clone(), batch.shortest())
    }

    /// Pooled features before dropout: [batch, num_filters × |k|].
    pub fn features(&self, batch: &EmbeddedBatch<B>) -> Result<Tensor<B, 2>> {
        Ok(max_over_time(self.feature_maps(batch)?))
    }

    /// Logits [batch, num_labels].
    pub fn forward(&self, batch: &EmbeddedBatch<B>, mode: Mode) -> Result<Tensor<B, 2>> {
        let features = self.features(batch)?;
        Ok(self.head.forward(features, mode))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    fn config(word_dim: usize, kernels: Vec<usize>, filters: usize, labels: usize) -> TextCnnNetworkConfig {
        TextCnnNetworkConfig::new(word_dim, kernels, filters, labels, 0.0)
    }

    fn random_batch(batch: usize, len: usize, dim: usize) -> EmbeddedBatch<TestBackend> {
        let device = Default::default();
        EmbeddedBatch::dense(Tensor::random([batch, len, dim], Distribution::Normal(0.0, 1.0), &device))
    }

    #[test]
    fn test_output_shapes() {
        let device = Default::default();
        let net: TextCnnNetwork<TestBackend> =
            config(50, vec![2, 3, 4], 4, 3).init(&device).unwrap();
        let batch = random_batch(2, 5, 50);

        let maps = net.feature_maps(&batch).unwrap();
        let dims: Vec<[usize; 3]> = maps.iter().map(|m| m.dims()).collect();
        assert_eq!(dims, vec![[2, 4, 4], [2, 4, 3], [2, 4, 2]]);

        assert_eq!(net.features(&batch).unwrap().dims(), [2, 12]);
        assert_eq!(net.forward(&batch, Mode::Inference).unwrap().dims(), [2, 3]);
    }

    #[test]
    fn test_ragged_batch_shapes() {
        let device = Default::default();
        let net: TextCnnNetwork<TestBackend> =
            config(50, vec![2, 3, 4], 4, 2).init(&device).unwrap();

        // Lengths [5, 7] padded to 7
        let batch = EmbeddedBatch::new(
            Tensor::random([2, 7, 50], Distribution::Normal(0.0, 1.0), &device),
            vec![5, 7],
        );
        assert_eq!(net.features(&batch).unwrap().dims(), [2, 12]);
        assert_eq!(net.forward(&batch, Mode::Inference).unwrap().dims(), [2, 2]);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let device = Default::default();
        let net: TextCnnNetwork<TestBackend> = TextCnnNetworkConfig::new(16, vec![2, 3], 5, 4, 0.5)
            .init(&device)
            .unwrap();
        let batch = random_batch(3, 6, 16);

        let a = net.forward(&batch, Mode::Inference).unwrap().into_data().to_vec::<f32>().unwrap();
        let b = net.forward(&batch, Mode::Inference).unwrap().into_data().to_vec::<f32>().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_inference_logits_are_linear_of_features() {
        let device = Default::default();
        let net: TextCnnNetwork<TestBackend> = TextCnnNetworkConfig::new(8, vec![1, 2], 3, 2, 0.3)
            .init(&device)
            .unwrap();
        let batch = random_batch(2, 4, 8);

        let features = net.features(&batch).unwrap();
        let expected = net.head.linear.forward(features).into_data().to_vec::<f32>().unwrap();
        let logits   = net.forward(&batch, Mode::Inference).unwrap().into_data().to_vec::<f32>().unwrap();
        assert_eq!(logits, expected);
    }

    #[test]
    fn test_zero_dropout_modes_agree() {
        let device = Default::default();
        let net: TextCnnNetwork<TestBackend> = config(8, vec![2], 3, 2).init(&device).unwrap();
        let batch = random_batch(2, 4, 8);

        let train = net.forward(&batch, Mode::Train).unwrap().into_data().to_vec::<f32>().unwrap();
        let infer = net.forward(&batch, Mode::Inference).unwrap().into_data().to_vec::<f32>().unwrap();
        assert_eq!(train, infer);
    }

    #[test]
    fn test_invalid_configs() {
        let is_config = |c: TextCnnNetworkConfig| {
            matches!(
                c.validate().unwrap_err().downcast_ref::<TextCnnError>(),
                Some(TextCnnError::Config { .. })
            )
        };
        assert!(is_config(config(8, vec![], 3, 2)));
        assert!(is_config(config(8, vec![0, 2], 3, 2)));
        assert!(is_config(config(8, vec![2, 2], 3, 2)));
        assert!(is_config(config(8, vec![2], 0, 2)));
        assert!(is_config(config(8, vec![2], 3, 0)));
        assert!(is_config(TextCnnNetworkConfig::new(8, vec![2], 3, 2, 1.0)));
    }

    #[test]
    fn test_too_short_batch_fails() {
        let device = Default::default();
        let net: TextCnnNetwork<TestBackend> = config(8, vec![2, 3, 4], 3, 2).init(&device).unwrap();
        let batch = EmbeddedBatch::new(Tensor::zeros([2, 7, 8], &device), vec![3, 7]);

        let err = net.forward(&batch, Mode::Inference).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TextCnnError>(),
            Some(TextCnnError::KernelTooWide { .. })
        ));
    }
}
