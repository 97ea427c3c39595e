//! Model configuration structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Repository of the fine-tuned job recommendation model
pub const DEFAULT_MODEL_REPO: &str = "Apizhai/Albert-IT-JobRecommendation";

/// Repository whose `tokenizer.json` is used when the model repo ships only
/// a SentencePiece vocabulary
pub const DEFAULT_TOKENIZER_REPO: &str = "albert-base-v2";

/// Configuration for the job classification model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name used in logs; derived from the source when empty
    #[serde(default)]
    pub name: String,

    /// Where to load weights, config and tokenizer from
    #[serde(default)]
    pub source: ModelSource,

    /// Fallback Hugging Face repo for `tokenizer.json`
    #[serde(default = "default_tokenizer_repo")]
    pub tokenizer_repo: Option<String>,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceType,

    /// Maximum sequence length in tokens; longer inputs are truncated
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_tokenizer_repo() -> Option<String> {
    Some(DEFAULT_TOKENIZER_REPO.to_string())
}

fn default_max_length() -> usize {
    512
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            source: ModelSource::default(),
            tokenizer_repo: default_tokenizer_repo(),
            device: DeviceType::default(),
            max_length: default_max_length(),
        }
    }
}

impl ModelConfig {
    /// Configuration for a Hugging Face model repository
    pub fn from_hf(repo: impl Into<String>) -> Self {
        Self {
            source: ModelSource::HuggingFace {
                repo: repo.into(),
                revision: default_revision(),
            },
            ..Default::default()
        }
    }

    /// Configuration for a local model directory
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::Local { path: path.into() },
            ..Default::default()
        }
    }

    /// Interpret a CLI `--model` value: an existing directory is a local
    /// model, anything else a Hugging Face repo id.
    pub fn from_model_arg(model: &str) -> Self {
        let path = PathBuf::from(model);
        if path.is_dir() {
            Self::from_local(path)
        } else {
            Self::from_hf(model)
        }
    }

    /// Name to report in logs
    pub fn resolved_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        match &self.source {
            ModelSource::HuggingFace { repo, .. } => repo.clone(),
            ModelSource::Local { path } => path.display().to_string(),
        }
    }
}

/// Model source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Directory holding `config.json`, weights and `tokenizer.json`
    Local { path: PathBuf },

    /// Download from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

fn default_revision() -> String {
    "main".to_string()
}

impl Default for ModelSource {
    fn default() -> Self {
        Self::HuggingFace {
            repo: DEFAULT_MODEL_REPO.to_string(),
            revision: default_revision(),
        }
    }
}

/// Device type for inference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceType {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize),
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl FromStr for DeviceType {
    type Err = String;

    /// Accepts `cpu`, `cuda`, `cuda:N`, `metal`, `metal:N` and `mps`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (kind, index) = match lower.split_once(':') {
            Some((kind, idx)) => {
                let idx = idx
                    .parse::<usize>()
                    .map_err(|_| format!("invalid device index in '{}'", s))?;
                (kind.to_string(), idx)
            }
            None => (lower, 0),
        };

        match kind.as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda(index)),
            "metal" | "mps" => Ok(Self::Metal(index)),
            other => Err(format!(
                "unknown device '{}' (expected cpu, cuda[:N] or metal[:N])",
                other
            )),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(idx) => write!(f, "cuda:{}", idx),
            Self::Metal(idx) => write!(f, "metal:{}", idx),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceType> for String {
    fn from(device: DeviceType) -> Self {
        device.to_string()
    }
}
