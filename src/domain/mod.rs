// ============================================================
// Domain Layer
// ============================================================
// Plain Rust types that describe what the classifier works on:
//
//   token_batch.rs — the sentences handed to a forward call
//   embedding.rs   — which embeddings feed the model, and their
//                    resources (closed enum, one variant per method)
//   traits.rs      — the static lookup abstraction GloVe tables
//                    implement
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain structs, enums and traits
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

/// A batch of tokenised sentences
pub mod token_batch;

/// Embedding method and per-method resource specs
pub mod embedding;

/// Static vocabulary-to-vector lookup abstraction
pub mod traits;
