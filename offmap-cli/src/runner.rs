//! Shared setup for commands that need the service.

use std::future::Future;

use offmap::config::ConfigFile;
use offmap::logging::WorkerGuard;
use offmap::provider::ReqwestClient;
use offmap::OfflineMapService;

use crate::error::CliError;

/// Loaded config, logging, and a Tokio runtime.
pub struct CliRunner {
    config: ConfigFile,
    runtime: tokio::runtime::Runtime,
    /// Keeps the file log writer flushing until the runner is dropped.
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    /// Load config (defaults if absent), start logging, build the runtime.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let log_dir = config.cache.directory.join("logs");
        let log_guard = offmap::logging::init(Some(&log_dir));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        Ok(Self {
            config,
            runtime,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn runtime(&self) -> &tokio::runtime::Runtime {
        &self.runtime
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn log_startup(&self, command: &str) {
        tracing::info!(
            version = offmap::VERSION,
            command,
            cache_dir = %self.config.cache.directory.display(),
            "offmap starting"
        );
    }

    /// Build and initialize the service from the loaded config.
    pub fn create_service(&self) -> Result<OfflineMapService<ReqwestClient>, CliError> {
        let service = OfflineMapService::from_config(self.config.clone())?;
        service.initialize()?;
        Ok(service)
    }
}
