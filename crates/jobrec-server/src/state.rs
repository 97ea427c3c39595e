use jobrec_classifiers::{load_classifier, JobRecommender, ModelConfig, JOB_CATEGORIES};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded model behind the ranking service; never mutated after startup
    pub recommender: JobRecommender,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    pub fn new(recommender: JobRecommender, metrics_handle: PrometheusHandle) -> Self {
        Self {
            recommender,
            metrics_handle,
        }
    }

    /// Load the model described by `config` and build the state around it.
    ///
    /// Loading may download weights and is CPU heavy, so it runs on the
    /// blocking pool. Any failure here should abort startup.
    pub async fn load(config: ModelConfig, metrics_handle: PrometheusHandle) -> anyhow::Result<Self> {
        let classifier = tokio::task::spawn_blocking(move || {
            load_classifier(&config, JOB_CATEGORIES.len())
        })
        .await??;

        let recommender = JobRecommender::new(Arc::new(classifier))?;
        tracing::info!(
            "Model '{}' ready with {} categories",
            recommender.classifier_name(),
            recommender.categories().len()
        );

        Ok(Self::new(recommender, metrics_handle))
    }
}
