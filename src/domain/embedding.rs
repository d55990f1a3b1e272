// ============================================================
// Domain — Embedding Method and Resource Specs
// ============================================================
// Three ways of turning tokens into vectors:
//
//   Elmo       — contextual vectors from a pretrained biLM
//   Glove      — static vectors from a lookup table
//   ElmoGlove  — both, concatenated along the embedding axis
//                as [elmo | glove]
//
// EmbeddingSpec is a closed enum: each variant carries only the
// resources its method needs, so e.g. a GloVe-only model cannot
// hold a dangling ELMo weight path. The method NAME only exists
// in the flat options file and is parsed exactly once, through
// EmbeddingMethod::from_str.
//
// Reference: Peters et al. (2018) Deep contextualized word representations
//            Pennington et al. (2014) GloVe

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

use crate::error::TextCnnError;

// ─── EmbeddingMethod ──────────────────────────────────────────────────────────
/// The name of an embedding strategy, as written in an options file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingMethod {
    Elmo,
    Glove,
    ElmoGlove,
}

impl FromStr for EmbeddingMethod {
    type Err = TextCnnError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "elmo"       => Ok(Self::Elmo),
            "glove"      => Ok(Self::Glove),
            "elmo_glove" => Ok(Self::ElmoGlove),
            other => Err(TextCnnError::config(format!(
                "unknown embedding method '{other}' (expected elmo, glove or elmo_glove)"
            ))),
        }
    }
}

impl fmt::Display for EmbeddingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Elmo      => "elmo",
            Self::Glove     => "glove",
            Self::ElmoGlove => "elmo_glove",
        })
    }
}

// ─── Per-method resources ─────────────────────────────────────────────────────
/// Pretrained ELMo handles and the width of the representation it yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElmoSpec {
    /// AllenNLP options JSON (architecture descriptor)
    pub options_file: PathBuf,
    /// Learned biLM weights
    pub weight_file:  PathBuf,
    /// Width of one output representation
    pub dim:          usize,
}

/// What a static lookup returns for a token missing from the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OovPolicy {
    /// An all-zero vector
    Zero,
    /// The vector of this designated token, which must be in the table
    Unknown(String),
}

/// GloVe table location, width, and lookup behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GloveSpec {
    /// Text-format table: `token v1 v2 ... vd` per line
    pub file:      PathBuf,
    pub dim:       usize,
    pub oov:       OovPolicy,
    /// Lowercase tokens before lookup (uncased tables such as glove.6B)
    pub lowercase: bool,
}

// ─── EmbeddingSpec ────────────────────────────────────────────────────────────
/// The embedding configuration of a model, one variant per method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum EmbeddingSpec {
    Elmo      { elmo: ElmoSpec },
    Glove     { glove: GloveSpec },
    ElmoGlove { elmo: ElmoSpec, glove: GloveSpec },
}

impl EmbeddingSpec {
    pub fn method(&self) -> EmbeddingMethod {
        match self {
            Self::Elmo { .. }      => EmbeddingMethod::Elmo,
            Self::Glove { .. }     => EmbeddingMethod::Glove,
            Self::ElmoGlove { .. } => EmbeddingMethod::ElmoGlove,
        }
    }

    /// Width of the fused per-token vector fed to the convolutions.
    pub fn word_dim(&self) -> usize {
        match self {
            Self::Elmo { elmo }             => elmo.dim,
            Self::Glove { glove }           => glove.dim,
            Self::ElmoGlove { elmo, glove } => elmo.dim + glove.dim,
        }
    }

    pub fn elmo(&self) -> Option<&ElmoSpec> {
        match self {
            Self::Elmo { elmo } | Self::ElmoGlove { elmo, .. } => Some(elmo),
            Self::Glove { .. } => None,
        }
    }

    pub fn glove(&self) -> Option<&GloveSpec> {
        match self {
            Self::Glove { glove } | Self::ElmoGlove { glove, .. } => Some(glove),
            Self::Elmo { .. } => None,
        }
    }

    /// Reject zero widths and an empty unknown-token name.
    pub fn validate(&self) -> Result<()> {
        if let Some(elmo) = self.elmo() {
            if elmo.dim == 0 {
                return Err(TextCnnError::config("elmo_dim must be positive").into());
            }
        }
        if let Some(glove) = self.glove() {
            if glove.dim == 0 {
                return Err(TextCnnError::config("glove_dim must be positive").into());
            }
            if matches!(&glove.oov, OovPolicy::Unknown(tok) if tok.is_empty()) {
                return Err(TextCnnError::config("glove_unk_token must not be empty").into());
            }
        }
        Ok(())
    }
}
