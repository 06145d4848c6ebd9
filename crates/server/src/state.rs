use crate::config::ServerConfig;
use crate::error::ServerResult;
use matcher::Searcher;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Search pipeline (shared across requests, never mutated)
    pub searcher: Searcher,

    /// Bounds concurrent model inference
    pub inference: Arc<Semaphore>,

    pub started_at: Instant,
}

impl ServerState {
    pub fn new(config: ServerConfig, searcher: Searcher) -> Self {
        let permits = config.max_concurrent_inference.max(1);
        Self {
            config: Arc::new(config),
            searcher,
            inference: Arc::new(Semaphore::new(permits)),
            started_at: Instant::now(),
        }
    }

    /// Build the search pipeline named by `config.pipeline_config` (or the
    /// defaults) and wrap it in server state.
    pub async fn load(config: ServerConfig) -> ServerResult<Self> {
        let pipeline = match &config.pipeline_config {
            Some(path) => vibecheck::VibeCheckConfig::from_file(path)
                .map_err(vibecheck::PipelineError::from)?,
            None => vibecheck::VibeCheckConfig::default(),
        };
        let searcher = vibecheck::build_searcher(&pipeline).await?;
        Ok(Self::new(config, searcher))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
