// ============================================================
// ML — Pooling & Classification Head
// ============================================================
//   per-kernel maps  [batch, num_filters, time_k]   (one per k)
//       │  max over time
//       ▼
//   [batch, num_filters]                            (one per k)
//       │  concatenate in kernel order
//       ▼
//   [batch, num_filters * |k|]
//       │  dropout (Mode::Train only)
//       ▼
//       │  Linear
//       ▼
//   logits [batch, num_labels]
//
// The output is raw logits; softmax and the loss belong to the
// caller.
//
// Initialisation: Xavier-uniform weight, zero bias.

use burn::{
    module::Param,
    nn::{Dropout, DropoutConfig, Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::Distribution,
};

use crate::ml::mode::Mode;

/// Max-over-time pooling of every map, concatenated along the filter axis.
pub fn max_over_time<B: Backend>(maps: Vec<Tensor<B, 3>>) -> Tensor<B, 2> {
    let pooled = maps
        .into_iter()
        .map(|m| {
            let [batch, filters, _] = m.dims();
            m.max_dim(2).reshape([batch, filters])
        })
        .collect::<Vec<_>>();
    Tensor::cat(pooled, 1)
}

#[derive(Config, Debug)]
pub struct ClassifierHeadConfig {
    /// num_filters × number of kernel widths
    pub d_input:    usize,
    pub num_labels: usize,
    pub dropout:    f64,
}

impl ClassifierHeadConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ClassifierHead<B> {
        let mut linear = LinearConfig::new(self.d_input, self.num_labels)
            .with_initializer(Initializer::XavierUniform { gain: 1.0 })
            .init(device);
        linear.bias = Some(Param::from_tensor(Tensor::zeros([self.num_labels], device)));

        ClassifierHead {
            linear,
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct ClassifierHead<B: Backend> {
    pub linear:  Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> ClassifierHead<B> {
    /// features: [batch, d_input] → logits [batch, num_labels]
    pub fn forward(&self, features: Tensor<B, 2>, mode: Mode) -> Tensor<B, 2> {
        let x = match mode {
            Mode::Train     => self.drop(features),
            Mode::Inference => features,
        };
        self.linear.forward(x)
    }

    /// Inverted dropout: zero each activation with probability p and
    /// scale the survivors by 1 / (1 - p), so no rescaling is needed
    /// at inference.
    fn drop(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let prob = self.dropout.prob;
        if prob == 0.0 {
            return x;
        }
        let keep = 1.0 - prob;
        let mask = x.random_like(Distribution::Bernoulli(keep));
        (x * mask).mul_scalar(1.0 / keep)
    }
}
