//! Job recommendation service: text pair in, ranked categories out

use crate::categories::{combine_text, default_categories};
use crate::classifier::SequenceClassifier;
use crate::ranking::{rank, softmax};
use jobrec_core::{Error, Recommendations, Result};
use std::sync::Arc;
use std::time::Instant;

/// Ranks job categories for a (profile, job description) pair.
///
/// Cheap to clone; clones share the same loaded classifier.
#[derive(Clone)]
pub struct JobRecommender {
    classifier: Arc<dyn SequenceClassifier>,
    categories: Arc<[String]>,
}

impl JobRecommender {
    /// Recommender over the standard job categories
    pub fn new(classifier: Arc<dyn SequenceClassifier>) -> Result<Self> {
        Self::with_categories(classifier, default_categories())
    }

    /// Recommender over a custom category list.
    ///
    /// Fails if the classifier's output width differs from the number of
    /// categories.
    pub fn with_categories(
        classifier: Arc<dyn SequenceClassifier>,
        categories: Vec<String>,
    ) -> Result<Self> {
        if classifier.num_labels() != categories.len() {
            return Err(Error::LabelMismatch {
                expected: categories.len(),
                actual: classifier.num_labels(),
            });
        }

        Ok(Self {
            classifier,
            categories: categories.into(),
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Score every category, highest probability first.
    ///
    /// Inference runs on the blocking thread pool.
    pub async fn classify(
        &self,
        user_profile: &str,
        job_description: &str,
    ) -> Result<Recommendations> {
        let text = combine_text(user_profile, job_description);
        let this = self.clone();

        tokio::task::spawn_blocking(move || this.classify_text(&text))
            .await
            .map_err(|e| Error::internal(format!("Inference task failed: {}", e)))?
    }

    /// Synchronous variant of [`classify`](Self::classify)
    pub fn classify_blocking(
        &self,
        user_profile: &str,
        job_description: &str,
    ) -> Result<Recommendations> {
        self.classify_text(&combine_text(user_profile, job_description))
    }

    fn classify_text(&self, text: &str) -> Result<Recommendations> {
        let start = Instant::now();

        let logits = self.classifier.predict_logits(text)?;
        if logits.len() != self.categories.len() {
            return Err(Error::LabelMismatch {
                expected: self.categories.len(),
                actual: logits.len(),
            });
        }

        let probabilities = softmax(&logits)?;
        let recommendations = rank(&self.categories, &probabilities)?;

        let elapsed_us = start.elapsed().as_micros() as f64;
        metrics::histogram!("jobrec_inference_latency_us").record(elapsed_us);

        if let Some((label, score)) = recommendations.top() {
            tracing::debug!(
                model = self.classifier.name(),
                top = label,
                score,
                latency_us = elapsed_us,
                "Classified text pair"
            );
        }

        Ok(recommendations)
    }
}
