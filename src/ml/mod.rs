// ============================================================
// ML Layer (Burn)
// ============================================================
// All Burn tensor code lives in this layer.
//
//   mode.rs           — Train / Inference flag passed to forward
//   elmo.rs           — ContextualEncoder seam + ELMo provider
//   glove_embedder.rs — GloVe provider (table → tensor)
//   embedder.rs       — WordEmbedder: Elmo | Glove | ElmoGlove
//   conv_bank.rs      — one Conv2d per kernel width, ReLU
//   head.rs           — max-over-time pooling, dropout, Linear
//   network.rs        — conv bank + head as one Burn Module
//   textcnn.rs        — TextCnnConfig and the full classifier
//
// Only network.rs and below hold trainable parameters; the
// embedding providers are frozen.
//
// Reference: Burn Book §3 (Building Blocks)
//            Kim (2014) Convolutional Neural Networks for Sentence Classification

/// Explicit training / inference mode
pub mod mode;

/// ELMo embedding provider over an injected encoder
pub mod elmo;

/// GloVe embedding provider
pub mod glove_embedder;

/// Closed set of embedding strategies
pub mod embedder;

/// Multi-width convolution bank
pub mod conv_bank;

/// Pooling and classification head
pub mod head;

/// Trainable network (conv bank + head)
pub mod network;

/// Complete classifier and its configuration
pub mod textcnn;
