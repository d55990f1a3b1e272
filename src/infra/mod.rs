// ============================================================
// Infrastructure Layer
// ============================================================
// Everything that touches the outside world at construction
// time:
//
//   options.rs        — flat JSON options file → TextCnnConfig
//   elmo_resources.rs — opens and checks the ELMo options and
//                       weight files before the model is built
//   device.rs         — use_gpu / device_index → WGPU device
//
// Every failure here surfaces as a TextCnnError::ResourceLoad or
// TextCnnError::Config, before any forward call.
//
// Reference: Rust Book §9 (Error Handling), serde_json docs

/// Model options file loading and validation
pub mod options;

/// ELMo options / weights handles
pub mod elmo_resources;

/// Accelerator placement
pub mod device;
