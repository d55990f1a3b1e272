// ============================================================
// ML — Convolutional Feature Extractor
// ============================================================
// One Conv2d per kernel width k, all reading the same input:
//
//   embeddings  [batch, len, word_dim]
//       │  unsqueeze → one input channel
//       ▼
//   [batch, 1, len, word_dim]
//       │  Conv2d, kernel (k × word_dim), num_filters channels
//       ▼
//   [batch, num_filters, len - k + 1, 1]
//       │  ReLU, drop the unit width axis
//       ▼
//   [batch, num_filters, len - k + 1]
//
// The kernel spans the whole embedding width, so each filter
// slides along the time axis only. No padding is added: every
// sentence in the batch must be at least as long as the widest
// kernel.
//
// Initialisation: Xavier-normal weights, zero bias.
//
// Reference: Kim (2014) Convolutional Neural Networks for Sentence Classification
//            Glorot & Bengio (2010)

use anyhow::Result;
use burn::{
    module::Param,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        Initializer,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::error::TextCnnError;

#[derive(Config, Debug)]
pub struct ConvBankConfig {
    /// Width of the per-token vectors entering the bank
    pub word_dim:      usize,
    /// One convolution per entry, in this order
    pub kernel_widths: Vec<usize>,
    /// Output channels of every convolution
    pub num_filters:   usize,
}

impl ConvBankConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvBank<B> {
        let convs = self
            .kernel_widths
            .iter()
            .map(|&k| {
                let mut conv = Conv2dConfig::new([1, self.num_filters], [k, self.word_dim])
                    .with_initializer(Initializer::XavierNormal { gain: 1.0 })
                    .init(device);
                conv.bias = Some(Param::from_tensor(Tensor::zeros([self.num_filters], device)));
                conv
            })
            .collect();

        ConvBank {
            convs,
            word_dim:    self.word_dim,
            num_filters: self.num_filters,
        }
    }
}

#[derive(Module, Debug)]
pub struct ConvBank<B: Backend> {
    pub convs:   Vec<Conv2d<B>>,
    word_dim:    usize,
    num_filters: usize,
}

impl<B: Backend> ConvBank<B> {
    pub fn word_dim(&self) -> usize {
        self.word_dim
    }

    pub fn num_filters(&self) -> usize {
        self.num_filters
    }

    /// Kernel widths in convolution order
    pub fn kernel_widths(&self) -> Vec<usize> {
        self.convs.iter().map(|c| c.kernel_size[0]).collect()
    }

    pub fn widest_kernel(&self) -> usize {
        self.kernel_widths().into_iter().max().unwrap_or(0)
    }

    /// Run every convolution over `embeddings` [batch, len, word_dim].
    ///
    /// `shortest` is the length of the shortest real sentence in the
    /// batch (padding rows do not count).
    ///
    /// Returns one ReLU-activated map per kernel, each
    /// [batch, num_filters, len - k + 1].
    pub fn forward(&self, embeddings: Tensor<B, 3>, shortest: usize) -> Result<Vec<Tensor<B, 3>>> {
        let [batch, len, width] = embeddings.dims();

        if width != self.word_dim {
            return Err(TextCnnError::shape(format!(
                "embedding width is {width}, convolutions expect {}",
                self.word_dim,
            ))
            .into());
        }

        let widest = self.widest_kernel();
        if shortest < widest || len < widest {
            return Err(TextCnnError::KernelTooWide {
                kernel:   widest,
                shortest: shortest.min(len),
            }
            .into());
        }

        // [batch, 1, len, word_dim]
        let x = embeddings.unsqueeze_dim::<4>(1);

        let maps = self
            .convs
            .iter()
            .map(|conv| {
                let steps = len - conv.kernel_size[0] + 1;
                relu(conv.forward(x.clone())).reshape([batch, self.num_filters, steps])
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Conv bank: input [{}, {}, {}] -> {:?}",
            batch, len, width,
            maps.iter().map(|m| m.dims()).collect::<Vec<_>>(),
        );
        Ok(maps)
    }
}
