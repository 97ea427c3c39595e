//! Tokenizer + ALBERT network behind the [`SequenceClassifier`] trait

use crate::albert::AlbertForSequenceClassification;
use crate::classifier::SequenceClassifier;
use candle_core::{Device, Tensor};
use jobrec_core::{Error, Result};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// ALBERT sequence classifier over raw text
pub struct AlbertSequenceClassifier {
    name: String,
    tokenizer: Tokenizer,
    model: AlbertForSequenceClassification,
    device: Device,
}

impl AlbertSequenceClassifier {
    /// Wrap a loaded network and tokenizer.
    ///
    /// The tokenizer is configured to truncate to `max_length` tokens and to
    /// pad to the longest sequence in a batch.
    pub fn new(
        name: impl Into<String>,
        mut tokenizer: Tokenizer,
        model: AlbertForSequenceClassification,
        device: Device,
        max_length: usize,
    ) -> Result<Self> {
        if max_length == 0 {
            return Err(Error::config("max_length must be at least 1"));
        }

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| Error::classifier(format!("Failed to configure truncation: {}", e)))?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        Ok(Self {
            name: name.into(),
            tokenizer,
            model,
            device,
        })
    }

    fn row_tensor(&self, values: &[u32], what: &str) -> Result<Tensor> {
        Tensor::new(values, &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::classifier(format!("Failed to create {} tensor: {}", what, e)))
    }
}

impl SequenceClassifier for AlbertSequenceClassifier {
    fn predict_logits(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::classifier(format!("Tokenization failed: {}", e)))?;

        if encoding.get_ids().is_empty() {
            return Err(Error::classifier("Tokenizer produced no tokens"));
        }

        tracing::trace!(tokens = encoding.get_ids().len(), "Encoded input");

        let input_ids = self.row_tensor(encoding.get_ids(), "input id")?;
        let token_type_ids = self.row_tensor(encoding.get_type_ids(), "token type")?;
        let attention_mask = self.row_tensor(encoding.get_attention_mask(), "attention mask")?;

        let logits = self
            .model
            .forward(&input_ids, &token_type_ids, &attention_mask)
            .map_err(|e| Error::classifier(format!("Model forward pass failed: {}", e)))?;

        logits
            .squeeze(0)
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| Error::classifier(format!("Failed to read logits: {}", e)))
    }

    fn num_labels(&self) -> usize {
        self.model.num_labels()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
