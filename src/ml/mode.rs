// ============================================================
// ML — Forward Mode
// ============================================================
// Every forward call states whether it is a training step or an
// inference call. The only behaviour that depends on it is the
// dropout in the classification head.

use burn::prelude::*;

/// Training or inference; passed to every forward call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dropout active
    Train,
    /// Dropout is the identity
    Inference,
}

impl Mode {
    /// Train on autodiff backends, Inference otherwise.
    ///
    /// Matches how a Burn training loop works: the model is trained on
    /// Autodiff<B> and validated on B after `model.valid()`.
    pub fn for_backend<B: Backend>() -> Self {
        if B::ad_enabled() {
            Self::Train
        } else {
            Self::Inference
        }
    }

    pub fn is_train(self) -> bool {
        self == Self::Train
    }
}
