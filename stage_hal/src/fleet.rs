//! Axis fleet construction.
//!
//! `AxisFleet` is the set of axes (and their controller channel) a process
//! works with. It is built from a `fleet.toml` through a
//! [`DriverRegistry`], and resolves operator-selected axis ids into the
//! typed handles the motion cores accept.
//!
//! ```toml
//! driver = "simulation"
//! log_dir = "logs"
//!
//! [shared]
//! service_name = "cycle-tester"
//!
//! [[axes]]
//! id = 1
//! name = "x"
//! min_limit = 0.0
//! max_limit = 250.0
//! ```

use crate::driver::HalError;
use crate::driver_registry::DriverRegistry;
use serde::{Deserialize, Serialize};
use stage_common::config::{ConfigLoader, SharedConfig};
use stage_common::hal::axis::AxisHandle;
use stage_common::hal::channel::SharedChannel;
use stage_common::hal::config::AxisSettings;
use stage_common::hal::consts::LOG_DIR_NAME;
use stage_common::hal::types::AxisId;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::info;

fn default_driver() -> String {
    "simulation".to_string()
}

/// Fleet configuration loaded from `fleet.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Common service settings.
    pub shared: SharedConfig,

    /// Backend driver name.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Directory receiving per-axis position logs.
    /// Relative paths are resolved against the config file's directory.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Axis settings.
    #[serde(default)]
    pub axes: Vec<AxisSettings>,
}

impl FleetConfig {
    /// Validate the fleet configuration.
    ///
    /// # Validation Rules
    /// 1. `shared` valid
    /// 2. every axis valid
    /// 3. axis ids unique
    /// 4. axis names unique
    pub fn validate(&self) -> Result<(), HalError> {
        self.shared.validate()?;

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for axis in &self.axes {
            axis.validate()?;
            if !ids.insert(axis.id) {
                return Err(HalError::ConfigError(format!("Duplicate axis id: {}", axis.id)));
            }
            if !names.insert(axis.name.as_str()) {
                return Err(HalError::ConfigError(format!(
                    "Duplicate axis name: {}",
                    axis.name
                )));
            }
        }
        Ok(())
    }
}

/// Built set of axes plus their shared controller channel.
pub struct AxisFleet {
    config: FleetConfig,
    log_dir: PathBuf,
    channel: SharedChannel,
    axes: BTreeMap<AxisId, AxisHandle>,
}

impl AxisFleet {
    /// Load a fleet configuration from a TOML file.
    pub fn load_config(config_path: &Path) -> Result<FleetConfig, HalError> {
        info!("Loading fleet configuration from {:?}", config_path);

        let mut config = FleetConfig::load(config_path).map_err(|e| {
            HalError::ConfigError(format!("{:?}: {}", config_path, e))
        })?;

        let base = config_path.parent().unwrap_or(Path::new("."));
        config.log_dir = config.log_dir.map(|dir| resolve_path(base, &dir));

        info!(
            "Loaded fleet config: driver={}, {} axes",
            config.driver,
            config.axes.len()
        );
        Ok(config)
    }

    /// Build the fleet: create the driver, open its channel, create every axis.
    ///
    /// # Errors
    /// Returns error if validation fails, the driver is unknown, or the
    /// driver cannot create an axis.
    pub fn build(config: FleetConfig, registry: &DriverRegistry) -> Result<Self, HalError> {
        config.validate()?;

        let mut driver = registry.create_driver(&config.driver)?;
        info!("Created driver: {} v{}", driver.name(), driver.version());

        let channel = driver.open_channel()?;

        let mut axes = BTreeMap::new();
        for settings in &config.axes {
            let axis = driver.create_axis(settings)?;
            info!("  Axis {}: {}", settings.id, axis.name());
            axes.insert(settings.id, axis);
        }

        let log_dir = config.log_dir.clone().unwrap_or_else(default_log_dir);
        info!("Fleet ready: {} axes, logs in {:?}", axes.len(), log_dir);

        Ok(Self {
            config,
            log_dir,
            channel,
            axes,
        })
    }

    /// Fleet configuration.
    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Directory receiving per-axis position logs.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Shared controller channel.
    pub fn channel(&self) -> SharedChannel {
        self.channel.clone()
    }

    /// Look up one axis.
    pub fn get(&self, id: AxisId) -> Option<AxisHandle> {
        self.axes.get(&id).cloned()
    }

    /// Resolve a selection of ids into handles, keeping the selection order.
    ///
    /// # Errors
    /// Returns `HalError::UnknownAxis` for the first id not in the fleet.
    pub fn resolve(&self, ids: &[AxisId]) -> Result<Vec<AxisHandle>, HalError> {
        ids.iter()
            .map(|id| self.get(*id).ok_or(HalError::UnknownAxis(*id)))
            .collect()
    }

    /// All axis ids in ascending order.
    pub fn ids(&self) -> Vec<AxisId> {
        self.axes.keys().copied().collect()
    }

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// True if the fleet has no axes.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

/// `{directory of the running executable}/logs`, or `./logs` if unknown.
pub fn default_log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(LOG_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(LOG_DIR_NAME))
}

/// Resolve a possibly relative path against a base directory.
fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
