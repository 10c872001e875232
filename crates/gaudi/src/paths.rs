use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "GAUDI_CONFIG_DIR";
pub const ENV_DATA_DIR: &str = "GAUDI_DATA_DIR";

pub const SHOW_FILE: &str = "show.toml";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Gaudi";
const APPLICATION: &str = "GaudiInMotion";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        let config_override = env_override(ENV_CONFIG_DIR);
        let data_override = env_override(ENV_DATA_DIR);
        if let (Some(config_dir), Some(data_dir)) = (&config_override, &data_override) {
            return Ok(Self {
                config_dir: config_dir.clone(),
                data_dir: data_dir.clone(),
            });
        }

        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;

        let config_dir = resolve_dir(config_override, project_dirs.config_dir());
        let data_dir = resolve_dir(data_override, project_dirs.data_dir());

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The user's show file; may not exist yet.
    pub fn show_file(&self) -> PathBuf {
        self.config_dir.join(SHOW_FILE)
    }

    /// Where replay scripts are looked up when given by bare name.
    pub fn scripts_dir(&self) -> PathBuf {
        self.data_dir.join("scripts")
    }
}

#[cfg(test)]
impl AppPaths {
    pub fn from_raw(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            config_dir,
            data_dir,
        }
    }
}

fn resolve_dir(value: Option<PathBuf>, default: &Path) -> PathBuf {
    value.unwrap_or_else(|| default.to_path_buf())
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.as_os_str().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}
