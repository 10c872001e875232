use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use deckconfig::ShowConfig;
use tracing::{debug, info};

use crate::paths::AppPaths;

pub const BUILTIN_SHOW: &str = include_str!("../defaults/show.toml");
pub const BUILTIN_TOUR: &str = include_str!("../defaults/tour.gaudi");

const TOUR_FILE: &str = "tour.gaudi";

/// Where the show being played came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowSource {
    Explicit(PathBuf),
    User(PathBuf),
    Builtin,
}

impl fmt::Display for ShowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowSource::Explicit(path) | ShowSource::User(path) => {
                write!(f, "{}", path.display())
            }
            ShowSource::Builtin => f.write_str("(built-in show)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedShow {
    pub config: ShowConfig,
    pub source: ShowSource,
}

pub fn builtin_show() -> Result<ShowConfig> {
    ShowConfig::from_toml_str(BUILTIN_SHOW).context("bundled show failed to load")
}

/// `--config` wins, then the user's `show.toml`, then the bundled show.
pub fn resolve_show(explicit: Option<&Path>, paths: &AppPaths) -> Result<LoadedShow> {
    if let Some(path) = explicit {
        let config = load_show_file(path)?;
        return Ok(LoadedShow {
            config,
            source: ShowSource::Explicit(path.to_path_buf()),
        });
    }

    let user = paths.show_file();
    if user.is_file() {
        let config = load_show_file(&user)?;
        return Ok(LoadedShow {
            config,
            source: ShowSource::User(user),
        });
    }

    debug!(path = %user.display(), "no user show file; using bundled show");
    Ok(LoadedShow {
        config: builtin_show()?,
        source: ShowSource::Builtin,
    })
}

fn load_show_file(path: &Path) -> Result<ShowConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read show config {}", path.display()))?;
    ShowConfig::from_toml_str(&raw)
        .with_context(|| format!("invalid show config {}", path.display()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    pub dry_run: bool,
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct DefaultCopy {
    pub name: &'static str,
    pub target: PathBuf,
    pub replaced: bool,
}

#[derive(Debug, Default)]
pub struct InstallReport {
    pub copied: Vec<DefaultCopy>,
    pub skipped: Vec<PathBuf>,
}

impl InstallReport {
    pub fn copied_any(&self) -> bool {
        !self.copied.is_empty()
    }
}

/// Writes the bundled show and sample tour script into the user
/// directories. Existing files are left alone unless `force` is set.
pub fn install_defaults(paths: &AppPaths, options: InstallOptions) -> Result<InstallReport> {
    let mut report = InstallReport::default();
    let bundled = [
        ("show", paths.show_file(), BUILTIN_SHOW),
        ("script", paths.scripts_dir().join(TOUR_FILE), BUILTIN_TOUR),
    ];

    for (name, target, contents) in bundled {
        let exists = target.exists();
        if exists && !options.force {
            debug!(target = %target.display(), "skipping default; already present");
            report.skipped.push(target);
            continue;
        }

        if !options.dry_run {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to prepare directory {}", parent.display())
                })?;
            }
            fs::write(&target, contents)
                .with_context(|| format!("failed to write default {}", target.display()))?;
        }

        report.copied.push(DefaultCopy {
            name,
            target,
            replaced: exists,
        });
    }

    if !options.dry_run && report.copied_any() {
        info!(files = report.copied.len(), "installed bundled defaults");
    }

    Ok(report)
}

#[derive(Debug, Clone)]
pub struct PathsOverview {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub show_file: PathBuf,
    pub show_present: bool,
    pub scripts_dir: PathBuf,
}

pub fn describe_paths(paths: &AppPaths) -> PathsOverview {
    let show_file = paths.show_file();
    PathsOverview {
        config_dir: paths.config_dir().to_path_buf(),
        data_dir: paths.data_dir().to_path_buf(),
        show_present: show_file.is_file(),
        show_file,
        scripts_dir: paths.scripts_dir(),
    }
}
