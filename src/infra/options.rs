// ============================================================
// Infrastructure — Model Options File
// ============================================================
// Hyperparameters arrive as one flat JSON object, e.g.
//
//   {
//     "emb_method":        "elmo_glove",
//     "elmo_dim":          1024,
//     "elmo_options_file": "elmo/options.json",
//     "elmo_weight_file":  "elmo/weights.hdf5",
//     "glove_dim":         300,
//     "glove_file":        "glove/glove.840B.300d.txt",
//     "glove_unk_token":   null,
//     "glove_lowercase":   false,
//     "k":                 [3, 4, 5],
//     "num_filters":       100,
//     "num_labels":        2,
//     "dropout":           0.5,
//     "use_gpu":           false,
//     "device_index":      0
//   }
//
// ModelOptions mirrors that object. into_config() turns it into
// a validated TextCnnConfig:
//   - `emb_method` is parsed into the EmbeddingSpec enum; an
//     unknown name is a configuration error right here
//   - the resource fields the method needs must be present
//   - unknown keys are rejected when the file is parsed
//
// Hyperparameters have no defaults. The per-method fields are
// Options only because each method needs a different subset.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::domain::embedding::{
    ElmoSpec, EmbeddingMethod, EmbeddingSpec, GloveSpec, OovPolicy,
};
use crate::error::TextCnnError;
use crate::infra::device::DevicePlacement;
use crate::ml::textcnn::TextCnnConfig;

/// Flat hyperparameter set as written in an options file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelOptions {
    pub emb_method:        String,
    pub elmo_dim:          Option<usize>,
    pub elmo_options_file: Option<PathBuf>,
    pub elmo_weight_file:  Option<PathBuf>,
    pub glove_dim:         Option<usize>,
    pub glove_file:        Option<PathBuf>,
    /// Token whose vector stands in for out-of-vocabulary words;
    /// null means OOV words get a zero vector
    pub glove_unk_token:   Option<String>,
    pub glove_lowercase:   Option<bool>,
    /// Convolution kernel widths, in order
    pub k:                 Vec<usize>,
    pub num_filters:       usize,
    pub num_labels:        usize,
    pub dropout:           f64,
    pub use_gpu:           bool,
    pub device_index:      usize,
}

impl ModelOptions {
    /// Read options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| TextCnnError::resource(path, e.to_string()))
            .with_context(|| "Cannot read model options")?;

        let options: Self = serde_json::from_str(&json)
            .map_err(|e| TextCnnError::resource(path, format!("invalid options JSON: {e}")))?;

        tracing::debug!("Loaded model options from '{}'", path.display());
        Ok(options)
    }

    /// Build the typed embedding spec for `emb_method`.
    pub fn embedding_spec(&self) -> Result<EmbeddingSpec> {
        let method: EmbeddingMethod = self.emb_method.parse()?;
        let spec = match method {
            EmbeddingMethod::Elmo      => EmbeddingSpec::Elmo { elmo: self.elmo_spec(method)? },
            EmbeddingMethod::Glove     => EmbeddingSpec::Glove { glove: self.glove_spec(method)? },
            EmbeddingMethod::ElmoGlove => EmbeddingSpec::ElmoGlove {
                elmo:  self.elmo_spec(method)?,
                glove: self.glove_spec(method)?,
            },
        };
        Ok(spec)
    }

    /// Validate and convert into the model configuration.
    pub fn into_config(self) -> Result<TextCnnConfig> {
        let embedding = self.embedding_spec()?;
        let config = TextCnnConfig::new(
            embedding,
            self.k,
            self.num_filters,
            self.num_labels,
            self.dropout,
            DevicePlacement {
                use_gpu:      self.use_gpu,
                device_index: self.device_index,
            },
        );
        config.validate()?;
        Ok(config)
    }

    fn elmo_spec(&self, method: EmbeddingMethod) -> Result<ElmoSpec> {
        Ok(ElmoSpec {
            options_file: required(&self.elmo_options_file, "elmo_options_file", method)?,
            weight_file:  required(&self.elmo_weight_file, "elmo_weight_file", method)?,
            dim:          required(&self.elmo_dim, "elmo_dim", method)?,
        })
    }

    fn glove_spec(&self, method: EmbeddingMethod) -> Result<GloveSpec> {
        let oov = match &self.glove_unk_token {
            Some(token) => OovPolicy::Unknown(token.clone()),
            None        => OovPolicy::Zero,
        };
        Ok(GloveSpec {
            file:      required(&self.glove_file, "glove_file", method)?,
            dim:       required(&self.glove_dim, "glove_dim", method)?,
            oov,
            lowercase: required(&self.glove_lowercase, "glove_lowercase", method)?,
        })
    }
}

impl TryFrom<ModelOptions> for TextCnnConfig {
    type Error = anyhow::Error;

    fn try_from(options: ModelOptions) -> Result<Self> {
        options.into_config()
    }
}

fn required<T: Clone>(value: &Option<T>, field: &str, method: EmbeddingMethod) -> Result<T> {
    value.clone().ok_or_else(|| {
        TextCnnError::config(format!("'{field}' is required when emb_method is '{method}'")).into()
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn glove_options() -> ModelOptions {
        ModelOptions {
            emb_method:        "glove".to_string(),
            elmo_dim:          None,
            elmo_options_file: None,
            elmo_weight_file:  None,
            glove_dim:         Some(50),
            glove_file:        Some("glove.6B.50d.txt".into()),
            glove_unk_token:   None,
            glove_lowercase:   Some(true),
            k:                 vec![2, 3, 4],
            num_filters:       4,
            num_labels:        3,
            dropout:           0.5,
            use_gpu:           false,
            device_index:      0,
        }
    }

    fn is_config_error(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<TextCnnError>(), Some(TextCnnError::Config { .. }))
    }

    #[test]
    fn test_glove_options_convert() {
        let cfg = glove_options().into_config().unwrap();
        assert_eq!(cfg.word_dim(), 50);
        assert_eq!(cfg.kernel_widths, vec![2, 3, 4]);
        assert_eq!(cfg.embedding.method(), EmbeddingMethod::Glove);
        assert!(!cfg.placement.use_gpu);
    }

    #[test]
    fn test_unknown_method_fails_at_conversion() {
        let mut opts = glove_options();
        opts.emb_method = "word2vec".to_string();
        let err = TextCnnConfig::try_from(opts).unwrap_err();
        assert!(is_config_error(&err));
    }

    #[test]
    fn test_elmo_glove_requires_both_resources() {
        let mut opts = glove_options();
        opts.emb_method = "elmo_glove".to_string();
        let err = opts.into_config().unwrap_err();
        assert!(is_config_error(&err));
        assert!(err.to_string().contains("elmo_options_file"));
    }

    #[test]
    fn test_elmo_glove_width() {
        let mut opts = glove_options();
        opts.emb_method        = "elmo_glove".to_string();
        opts.elmo_dim          = Some(128);
        opts.elmo_options_file = Some("options.json".into());
        opts.elmo_weight_file  = Some("weights.hdf5".into());
        let cfg = opts.into_config().unwrap();
        assert_eq!(cfg.word_dim(), 178);
    }

    #[test]
    fn test_unk_token_sets_policy() {
        let mut opts = glove_options();
        opts.glove_unk_token = Some("<unk>".to_string());
        let spec = opts.embedding_spec().unwrap();
        assert_eq!(spec.glove().unwrap().oov, OovPolicy::Unknown("<unk>".to_string()));
    }

    #[test]
    fn test_bad_hyperparameters_rejected() {
        let mut opts = glove_options();
        opts.k = Vec::new();
        assert!(is_config_error(&opts.into_config().unwrap_err()));

        let mut opts = glove_options();
        opts.dropout = 1.0;
        assert!(is_config_error(&opts.into_config().unwrap_err()));
    }

    #[test]
    fn test_from_file() {
        let json = serde_json::to_string(&glove_options()).unwrap();
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();

        let opts = ModelOptions::from_file(f.path()).unwrap();
        assert_eq!(opts.emb_method, "glove");
        assert_eq!(opts.k, vec![2, 3, 4]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(br#"{"emb_method": "glove", "learning_rate": 0.1}"#).unwrap();
        let err = ModelOptions::from_file(f.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TextCnnError>(),
            Some(TextCnnError::ResourceLoad { .. })
        ));
    }
}
