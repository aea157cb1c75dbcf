use std::path::{Path, PathBuf};

/// A folder deleted from a working directory, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedFolder {
    pub path: PathBuf,
    pub size: u64,
}

impl RemovedFolder {
    pub fn new(path: PathBuf, size: u64) -> Self {
        RemovedFolder { path, size }
    }
}

/// Outcome of removing folders by pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pruned {
    pub removed: Vec<RemovedFolder>,
    pub unmatched: Vec<String>,
}

/// What thinning a manifest dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThinnedManifest {
    pub dev_dependencies: Vec<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PackageReport {
    pub name: String,
    pub archive: PathBuf,
    pub size_before: u64,
    pub size_after: u64,
    pub removed_folders: Vec<RemovedFolder>,
    pub unmatched_patterns: Vec<String>,
    pub stripped_keys: Vec<String>,
    pub manifest: Option<ThinnedManifest>,
    pub cleaned: Vec<PathBuf>,
}

impl PackageReport {
    pub fn new(name: &str, archive: &Path, size_before: u64) -> Self {
        Self {
            name: name.to_string(),
            archive: archive.to_path_buf(),
            size_before,
            size_after: size_before,
            removed_folders: Vec::new(),
            unmatched_patterns: Vec::new(),
            stripped_keys: Vec::new(),
            manifest: None,
            cleaned: Vec::new(),
        }
    }

    pub fn saved(&self) -> u64 {
        self.size_before.saturating_sub(self.size_after)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlimReport {
    pub packages: Vec<PackageReport>,
}

impl SlimReport {
    pub fn new() -> Self {
        Self { packages: Vec::new() }
    }

    pub fn push(&mut self, report: PackageReport) {
        self.packages.push(report);
    }

    pub fn total_before(&self) -> u64 {
        self.packages.iter().map(|report| report.size_before).sum()
    }

    pub fn total_after(&self) -> u64 {
        self.packages.iter().map(|report| report.size_after).sum()
    }
}

/// Dry-run description of the steps `run` would take for one package.
#[derive(Debug, Clone)]
pub struct PackagePlan {
    pub name: String,
    pub archive: PathBuf,
    pub archive_size: Option<u64>,
    pub remove_folders: Vec<String>,
    pub json_config: Option<(PathBuf, Vec<String>)>,
    pub remove_dependencies: Vec<String>,
    pub manifest_dir: Option<PathBuf>,
    pub install_command: Option<String>,
}
