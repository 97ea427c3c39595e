//! Model loading for the Candle-based job classifier
//!
//! Everything here is synchronous and may download from the Hugging Face
//! Hub; async callers should run it on the blocking pool.

use crate::albert::{AlbertConfig, AlbertForSequenceClassification};
use crate::albert_classifier::AlbertSequenceClassifier;
use crate::model_config::{DeviceType, ModelConfig, ModelSource};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use jobrec_core::{Error, Result};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

/// Weight file names, in order of preference
const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];

const CLASSIFIER_WEIGHT: &str = "classifier.weight";

/// Where model files come from
enum ModelRepo {
    Local(PathBuf),
    Hub { id: String, repo: ApiRepo },
}

impl ModelRepo {
    fn open(source: &ModelSource) -> Result<Self> {
        match source {
            ModelSource::Local { path } => {
                if !path.is_dir() {
                    return Err(Error::config(format!(
                        "Model directory not found: {}",
                        path.display()
                    )));
                }
                Ok(Self::Local(path.clone()))
            }
            ModelSource::HuggingFace { repo, revision } => Self::hub(repo, revision),
        }
    }

    fn hub(repo_id: &str, revision: &str) -> Result<Self> {
        let api = Api::new()
            .map_err(|e| Error::config(format!("Failed to initialize HF API: {}", e)))?;

        let repo = api.repo(Repo::with_revision(
            repo_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        Ok(Self::Hub {
            id: repo_id.to_string(),
            repo,
        })
    }

    fn describe(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Hub { id, .. } => id.clone(),
        }
    }

    /// Locate a file, downloading it into the HF cache if needed
    fn fetch(&self, filename: &str) -> Result<PathBuf> {
        match self {
            Self::Local(dir) => {
                let path = dir.join(filename);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(Error::config(format!(
                        "{} not found in {}",
                        filename,
                        dir.display()
                    )))
                }
            }
            Self::Hub { id, repo } => repo.get(filename).map_err(|e| {
                Error::config(format!("Failed to download {} from {}: {}", filename, id, e))
            }),
        }
    }

    fn try_fetch(&self, filename: &str) -> Option<PathBuf> {
        match self.fetch(filename) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        }
    }
}

/// Load the configured model and check it scores `expected_labels` classes.
///
/// A label-count disagreement, whether declared in `config.json` or found in
/// the classification head's weights, is reported before any request is
/// served.
pub fn load_classifier(
    config: &ModelConfig,
    expected_labels: usize,
) -> Result<AlbertSequenceClassifier> {
    let name = config.resolved_name();
    tracing::info!("Loading model '{}' on {}", name, config.device);

    let repo = ModelRepo::open(&config.source)?;

    let config_path = repo.fetch("config.json")?;
    let albert_config = load_albert_config(&config_path)?;
    check_label_count(expected_labels, albert_config.declared_num_labels())?;

    let weights_path = find_weights(&repo)?;
    let device = create_device(config.device)?;
    let vb = load_var_builder(&weights_path, &device)?;
    check_head_width(&vb, expected_labels)?;

    let tokenizer = load_tokenizer(&repo, config.tokenizer_repo.as_deref())?;

    let model = AlbertForSequenceClassification::load(vb, &albert_config, expected_labels)
        .map_err(|e| {
            Error::classifier(format!(
                "Failed to build ALBERT classifier with {} labels from {}: {}",
                expected_labels,
                weights_path.display(),
                e
            ))
        })?;

    let max_length = config
        .max_length
        .min(albert_config.max_position_embeddings);

    tracing::info!(
        "Loaded ALBERT classifier '{}' (hidden_size={}, layers={}, labels={}, max_length={})",
        name,
        albert_config.hidden_size,
        albert_config.num_hidden_layers,
        expected_labels,
        max_length
    );

    AlbertSequenceClassifier::new(name, tokenizer, model, device, max_length)
}

/// Compare the label count a checkpoint declares with the category list
pub fn check_label_count(expected: usize, declared: Option<usize>) -> Result<()> {
    match declared {
        Some(actual) if actual != expected => Err(Error::LabelMismatch { expected, actual }),
        Some(_) => Ok(()),
        None => {
            tracing::warn!(
                "Model config declares no labels; relying on classifier head shape for {} categories",
                expected
            );
            Ok(())
        }
    }
}

/// Compare the stored classification head's row count with the category list
fn check_head_width(vb: &VarBuilder, expected: usize) -> Result<()> {
    if !vb.contains_tensor(CLASSIFIER_WEIGHT) {
        // Reported by the model builder with the full tensor name
        return Ok(());
    }

    let rows = vb
        .get_unchecked_dtype(CLASSIFIER_WEIGHT, DType::F32)
        .and_then(|w| w.dim(0))
        .map_err(|e| Error::classifier(format!("Failed to read {}: {}", CLASSIFIER_WEIGHT, e)))?;

    if rows != expected {
        return Err(Error::LabelMismatch {
            expected,
            actual: rows,
        });
    }
    Ok(())
}

fn load_albert_config(config_path: &Path) -> Result<AlbertConfig> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        Error::config(format!(
            "Failed to read config {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&config_str).map_err(|e| {
        Error::config(format!(
            "Failed to parse config {}: {}",
            config_path.display(),
            e
        ))
    })
}

fn find_weights(repo: &ModelRepo) -> Result<PathBuf> {
    for filename in WEIGHT_FILES {
        if let Some(path) = repo.try_fetch(filename) {
            tracing::debug!("Found weight file: {}", path.display());
            return Ok(path);
        }
    }

    Err(Error::config(format!(
        "No model weights found in {} (tried {})",
        repo.describe(),
        WEIGHT_FILES.join(", ")
    )))
}

fn load_tokenizer(repo: &ModelRepo, fallback_repo: Option<&str>) -> Result<Tokenizer> {
    let tokenizer_path = match repo.try_fetch("tokenizer.json") {
        Some(path) => path,
        None => {
            let fallback = fallback_repo.ok_or_else(|| {
                Error::config(format!(
                    "No tokenizer.json in {} and no tokenizer_repo configured",
                    repo.describe()
                ))
            })?;
            tracing::info!(
                "No tokenizer.json in {}, using tokenizer from {}",
                repo.describe(),
                fallback
            );
            ModelRepo::hub(fallback, "main")?.fetch("tokenizer.json")?
        }
    };

    Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| Error::classifier(format!("Failed to load tokenizer: {}", e)))
}

/// Create Candle device from device type
pub fn create_device(device_type: DeviceType) -> Result<Device> {
    match device_type {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| Error::classifier(format!("Failed to create CUDA device: {}", e))),
        DeviceType::Metal(idx) => Device::new_metal(idx)
            .map_err(|e| Error::classifier(format!("Failed to create Metal device: {}", e))),
    }
}

fn load_var_builder(weights_path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let is_safetensors = weights_path
        .extension()
        .is_some_and(|ext| ext == "safetensors");

    if is_safetensors {
        // SAFETY: the mmap'd file lives in the model cache and is not
        // modified while the process runs.
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
            .map_err(|e| Error::classifier(format!("Failed to load SafeTensors: {}", e)))
    } else {
        VarBuilder::from_pth(weights_path, DType::F32, device)
            .map_err(|e| Error::classifier(format!("Failed to load PyTorch weights: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, id2label: &[&str]) {
        let labels: serde_json::Map<String, serde_json::Value> = id2label
            .iter()
            .enumerate()
            .map(|(i, l)| (i.to_string(), serde_json::Value::from(*l)))
            .collect();
        let config = serde_json::json!({
            "vocab_size": 32,
            "embedding_size": 8,
            "hidden_size": 16,
            "num_hidden_layers": 2,
            "num_attention_heads": 4,
            "intermediate_size": 32,
            "id2label": labels,
        });
        std::fs::write(dir.join("config.json"), config.to_string()).unwrap();
    }

    #[test]
    fn test_check_label_count() {
        assert!(check_label_count(14, Some(14)).is_ok());
        assert!(check_label_count(14, None).is_ok());
        assert!(matches!(
            check_label_count(14, Some(2)),
            Err(Error::LabelMismatch {
                expected: 14,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_missing_local_directory() {
        let config = ModelConfig::from_local("/definitely/not/a/model/dir");
        let err = load_classifier(&config, 14).err().unwrap();
        assert!(matches!(err, Error::Config(_)), "{}", err);
    }

    #[test]
    fn test_label_mismatch_fails_before_weights() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), &["negative", "positive"]);

        let config = ModelConfig::from_local(dir.path());
        let err = load_classifier(&config, 14).err().unwrap();
        assert!(
            matches!(err, Error::LabelMismatch { expected: 14, actual: 2 }),
            "{}",
            err
        );
    }

    #[test]
    fn test_head_width_mismatch_without_declared_labels() {
        use candle_nn::VarMap;

        let dir = tempfile::tempdir().unwrap();
        let config = serde_json::json!({
            "vocab_size": 32,
            "embedding_size": 8,
            "hidden_size": 16,
            "num_hidden_layers": 2,
            "num_attention_heads": 4,
            "intermediate_size": 32,
        });
        std::fs::write(dir.path().join("config.json"), config.to_string()).unwrap();

        let albert_config: AlbertConfig = serde_json::from_value(config).unwrap();
        assert_eq!(albert_config.declared_num_labels(), None);

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        AlbertForSequenceClassification::load(vb, &albert_config, 2).unwrap();
        varmap.save(dir.path().join("model.safetensors")).unwrap();

        let err = load_classifier(&ModelConfig::from_local(dir.path()), 14)
            .err()
            .unwrap();
        assert!(
            matches!(err, Error::LabelMismatch { expected: 14, actual: 2 }),
            "{}",
            err
        );
    }

    #[test]
    fn test_missing_weights() {
        let dir = tempfile::tempdir().unwrap();
        let labels: Vec<String> = (0..14).map(|i| format!("LABEL_{}", i)).collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        write_config(dir.path(), &labels);

        let config = ModelConfig::from_local(dir.path());
        let err = load_classifier(&config, 14).err().unwrap();
        assert!(err.to_string().contains("No model weights found"), "{}", err);
    }

    #[test]
    fn test_cpu_device() {
        assert!(matches!(create_device(DeviceType::Cpu), Ok(Device::Cpu)));
    }
}
