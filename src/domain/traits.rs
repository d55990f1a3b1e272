// ============================================================
// Domain — Core Traits
// ============================================================
// StaticLookup is the seam between the model and any
// vocabulary-to-vector table. GloveTable implements it for the
// text-format files; tests implement it with a few hand-written
// vectors, so the embedding code never needs a real download.
//
// The contextual (ELMo) seam lives in ml::elmo because its
// inputs and outputs are Burn tensors.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

// ─── StaticLookup ─────────────────────────────────────────────────────────────
/// A fixed token → vector table.
///
/// Implementations:
///   - GloveTable → loaded from a GloVe text file
pub trait StaticLookup {
    /// Width of every vector in the table
    fn dim(&self) -> usize;

    /// The vector of `token`, or None when it is out of vocabulary.
    /// Returned slices always have length `dim()`.
    fn vector(&self, token: &str) -> Option<&[f32]>;
}
