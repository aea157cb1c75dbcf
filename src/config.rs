use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_CONFIG_FILE: &str = "slimzip.toml";

const STARTER_CONFIG: &str = r#"# slimzip configuration. Relative paths resolve against this file's directory.
archive_dir = ".serverless"
manifest_dir = "."

[install]
command = "npm"
args = ["install", "--omit=dev", "--no-audit", "--no-fund"]

# One block per deployment archive.
[[package]]
name = "app"
# archive = ".serverless/app.zip"
remove_folders = []
remove_dependencies = []

# [package.json_config]
# file = "config.json"
# remove_keys = []
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageConfig>,
    #[serde(skip)]
    root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallConfig {
    #[serde(default = "default_install_command")]
    pub command: String,
    #[serde(default = "default_install_args")]
    pub args: Vec<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self { command: default_install_command(), args: default_install_args() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    pub name: String,
    #[serde(default)]
    pub archive: Option<PathBuf>,
    #[serde(default)]
    pub remove_folders: Vec<String>,
    #[serde(default)]
    pub remove_dependencies: Vec<String>,
    #[serde(default = "default_true")]
    pub install: bool,
    #[serde(default)]
    pub json_config: Option<JsonConfigStrip>,
}

/// Keys to drop from a JSON file inside the archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonConfigStrip {
    pub file: PathBuf,
    #[serde(default)]
    pub remove_keys: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::ConfigMissing(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::parse(&contents, root)
    }

    /// Parse configuration text, resolving relative paths against `root`.
    pub fn parse(contents: &str, root: PathBuf) -> Result<Self, AppError> {
        let mut config: Config = toml::from_str(contents)?;
        config.root = root;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.install.command.trim().is_empty() {
            return Err(AppError::config("install.command must not be empty"));
        }
        if self.packages.is_empty() {
            return Err(AppError::config("no [[package]] entries configured"));
        }
        let mut seen = HashSet::new();
        for package in &self.packages {
            if package.name.trim().is_empty() {
                return Err(AppError::config("package name must not be empty"));
            }
            if !is_file_name(&package.name) {
                return Err(AppError::config(format!(
                    "package name '{}' must not contain path separators or '..'",
                    package.name
                )));
            }
            if !seen.insert(package.name.as_str()) {
                return Err(AppError::config(format!("duplicate package '{}'", package.name)));
            }
            if let Some(strip) = &package.json_config
                && !is_inside_archive(&strip.file)
            {
                return Err(AppError::config(format!(
                    "json_config.file '{}' must be a relative path inside the archive",
                    strip.file.display()
                )));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) }
    }

    pub fn archive_path(&self, package: &PackageConfig) -> PathBuf {
        match &package.archive {
            Some(archive) => self.resolve(archive),
            None => self.resolve(&self.archive_dir).join(format!("{}.zip", package.name)),
        }
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.resolve(&self.manifest_dir)
    }

    pub fn work_dir(&self) -> Option<PathBuf> {
        self.work_dir.as_deref().map(|dir| self.resolve(dir))
    }

    pub fn package(&self, name: &str) -> Option<&PackageConfig> {
        self.packages.iter().find(|package| package.name == name)
    }

    /// Packages named on the command line, in the order given, or every
    /// configured package when no names are passed.
    pub fn select(&self, names: &[String]) -> Result<Vec<&PackageConfig>, AppError> {
        if names.is_empty() {
            return Ok(self.packages.iter().collect());
        }

        let mut selected: Vec<&PackageConfig> = Vec::new();
        for name in names {
            let package =
                self.package(name).ok_or_else(|| AppError::UnknownPackage(name.clone()))?;
            if !selected.iter().any(|existing| existing.name == package.name) {
                selected.push(package);
            }
        }
        Ok(selected)
    }
}

pub fn config_file_path(explicit: Option<&Path>) -> Result<PathBuf, AppError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(std::env::current_dir()?.join(DEFAULT_CONFIG_FILE)),
    }
}

/// Write the starter configuration unless a file already exists. Returns
/// whether a new file was created.
pub fn ensure_config_file(path: &Path) -> Result<bool, AppError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, STARTER_CONFIG)?;
    Ok(true)
}

/// Names end up in archive file names and work directory prefixes.
fn is_file_name(name: &str) -> bool {
    name != "." && !name.contains("..") && !name.contains(['/', '\\'])
}

fn is_inside_archive(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from(".serverless")
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_install_command() -> String {
    "npm".to_string()
}

fn default_install_args() -> Vec<String> {
    ["install", "--omit=dev", "--no-audit", "--no-fund"]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}
