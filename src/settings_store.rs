use crate::types::NetworkConfig;
use anyhow::{Context, Result};
use log::{info, warn};
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use std::{
    fs::{self, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

/// Process-wide source of truth for the committed network configuration
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait SettingsStore: Send + Sync {
    fn current(&self) -> NetworkConfig;
    fn set_committed(&self, config: NetworkConfig) -> Result<()>;
}

/// Settings store persisted as JSON
///
/// The in-memory copy is updated only after the file was written, so a failed
/// write leaves both unchanged.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    current: RwLock<NetworkConfig>,
}

impl FileSettingsStore {
    /// Open the store at `path`, starting from defaults if the file does not
    /// exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let current = Self::load(&path)?;

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<NetworkConfig> {
        let file = match OpenOptions::new().read(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no network config at {path:?}, using defaults");
                return Ok(NetworkConfig::defaults());
            }
            Err(e) => return Err(e).context(format!("failed to open network config: {path:?}")),
        };

        let config: NetworkConfig = serde_json::from_reader(file)
            .context(format!("failed to deserialize network config: {path:?}"))?;

        if let Err(e) = config.check() {
            warn!("stored network config is invalid, using defaults: {e:#}");
            return Ok(NetworkConfig::defaults());
        }

        Ok(config)
    }

    fn write(&self, config: &NetworkConfig) -> Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context(format!("failed to create {parent:?}"))?;
        }

        serde_json::to_writer_pretty(
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)
                .context(format!("failed to open network config for write: {tmp_path:?}"))?,
            config,
        )
        .context(format!("failed to serialize network config: {tmp_path:?}"))?;

        fs::rename(&tmp_path, &self.path)
            .context(format!("failed to rename {tmp_path:?} to {:?}", self.path))
    }
}

impl SettingsStore for FileSettingsStore {
    fn current(&self) -> NetworkConfig {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_committed(&self, config: NetworkConfig) -> Result<()> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        self.write(&config)?;
        info!("committed network config written to {:?}", self.path);
        *current = config;

        Ok(())
    }
}
