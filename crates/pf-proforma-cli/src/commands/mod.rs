pub mod db;
pub mod model;
pub mod pipeline;
pub mod sensitivity;

use pf_proforma_core::proforma::ModelConfig;
use pf_proforma_core::store::{ProjectStore, StoreLocation};
use std::path::{Path, PathBuf};

use crate::config::Settings;

/// Resolved settings shared by every subcommand.
pub struct RunContext {
    pub model: ModelConfig,
    pub store: StoreLocation,
    pub reports_dir: PathBuf,
}

impl RunContext {
    pub fn new(
        settings: Settings,
        db_flag: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let store = settings.resolve_store(db_flag)?;
        tracing::debug!(store = %store, "Store location resolved");
        Ok(Self {
            model: settings.model,
            store,
            reports_dir: settings.reports.dir,
        })
    }

    pub fn open_store(&self) -> Result<Box<dyn ProjectStore>, Box<dyn std::error::Error>> {
        Ok(self.store.open()?)
    }

    /// `--out-dir` if given, otherwise the configured reports directory.
    pub fn out_dir<'a>(&'a self, flag: Option<&'a Path>) -> &'a Path {
        flag.unwrap_or(self.reports_dir.as_path())
    }
}
