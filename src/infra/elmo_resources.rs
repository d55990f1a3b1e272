// ============================================================
// Infrastructure — ELMo Resource Handles
// ============================================================
// A pretrained ELMo model ships as two files:
//
//   options.json  — architecture descriptor (AllenNLP layout)
//   weights.hdf5  — the learned biLM parameters
//
// This module opens both at model construction so a missing or
// corrupt resource fails before the first forward call. It reads
// only what the classifier depends on:
//
//   lstm.projection_dim              → representation width is
//                                      2 * projection_dim
//   char_cnn.max_characters_per_token → must equal the width of
//                                      the character-id rows (50)
//
// The weights themselves are handed, by path, to whichever
// ContextualEncoder loader the integration supplies.
//
// Reference: Peters et al. (2018), AllenNLP ELMo options format

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::char_ids::MAX_CHARS_PER_TOKEN;
use crate::domain::embedding::ElmoSpec;
use crate::error::TextCnnError;

#[derive(Debug, Deserialize)]
struct OptionsFile {
    lstm:     LstmOptions,
    #[serde(default)]
    char_cnn: Option<CharCnnOptions>,
}

#[derive(Debug, Deserialize)]
struct LstmOptions {
    projection_dim: usize,
    #[serde(default)]
    n_layers:       Option<usize>,
}

#[derive(Debug, Deserialize)]
struct CharCnnOptions {
    #[serde(default)]
    max_characters_per_token: Option<usize>,
}

/// Validated handles to a pretrained ELMo model.
#[derive(Debug, Clone)]
pub struct ElmoResources {
    options_file:   PathBuf,
    weight_file:    PathBuf,
    projection_dim: usize,
    n_layers:       Option<usize>,
}

impl ElmoResources {
    /// Open and check the files named by `spec`.
    ///
    /// Errors:
    ///   - ResourceLoad when either file is missing or the options
    ///     JSON cannot be parsed
    ///   - Config when the options disagree with `spec.dim` or with
    ///     the character-id width
    pub fn open(spec: &ElmoSpec) -> Result<Self> {
        let options = read_options(&spec.options_file)?;
        check_weight_file(&spec.weight_file)?;

        let resources = Self {
            options_file:   spec.options_file.clone(),
            weight_file:    spec.weight_file.clone(),
            projection_dim: options.lstm.projection_dim,
            n_layers:       options.lstm.n_layers,
        };

        if resources.output_dim() != spec.dim {
            return Err(TextCnnError::config(format!(
                "elmo_dim is {} but '{}' describes {}-wide representations",
                spec.dim,
                spec.options_file.display(),
                resources.output_dim(),
            ))
            .into());
        }

        if let Some(max_chars) = options.char_cnn.and_then(|c| c.max_characters_per_token) {
            if max_chars != MAX_CHARS_PER_TOKEN {
                return Err(TextCnnError::config(format!(
                    "ELMo options expect {max_chars} characters per token, \
                     character ids are {MAX_CHARS_PER_TOKEN} wide"
                ))
                .into());
            }
        }

        tracing::info!(
            "Opened ELMo resources: options='{}', weights='{}', dim={}",
            resources.options_file.display(),
            resources.weight_file.display(),
            resources.output_dim(),
        );
        Ok(resources)
    }

    /// Width of one output representation (forward + backward LSTM)
    pub fn output_dim(&self) -> usize {
        2 * self.projection_dim
    }

    pub fn projection_dim(&self) -> usize {
        self.projection_dim
    }

    pub fn n_layers(&self) -> Option<usize> {
        self.n_layers
    }

    pub fn options_file(&self) -> &Path {
        &self.options_file
    }

    pub fn weight_file(&self) -> &Path {
        &self.weight_file
    }
}

fn read_options(path: &Path) -> Result<OptionsFile> {
    let json = fs::read_to_string(path)
        .map_err(|e| TextCnnError::resource(path, e.to_string()))
        .with_context(|| "Cannot read ELMo options file")?;

    let options = serde_json::from_str(&json)
        .map_err(|e| TextCnnError::resource(path, format!("invalid options JSON: {e}")))?;
    Ok(options)
}

fn check_weight_file(path: &Path) -> Result<()> {
    let meta = fs::metadata(path)
        .map_err(|e| TextCnnError::resource(path, e.to_string()))
        .with_context(|| "Cannot open ELMo weight file")?;

    if !meta.is_file() {
        return Err(TextCnnError::resource(path, "not a regular file").into());
    }
    Ok(())
}
