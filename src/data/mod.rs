// ============================================================
// Data Layer
// ============================================================
// Turns the external embedding resources and raw tokens into
// plain Rust buffers the ML layer can build tensors from.
//
//   glove.rs     — GloVe text table → in-memory StaticLookup
//   char_ids.rs  — tokens → ELMo character-id rows
//
// Nothing here touches Burn; tensors are built in ml/.
//
// Reference: Rust Book §8 (Collections), §12 (I/O)

/// GloVe text-format table loading
pub mod glove;

/// ELMo character-id mapping (batch_to_ids)
pub mod char_ids;
