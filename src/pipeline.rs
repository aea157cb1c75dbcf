use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::archive;
use crate::config::{Config, PackageConfig};
use crate::error::AppError;
use crate::installer::PackageManager;
use crate::json_config;
use crate::manifest;
use crate::model::{PackagePlan, PackageReport};
use crate::prune;

/// Runs the unzip, trim, reinstall and rezip sequence for configured packages.
pub struct Slimmer {
    config: Config,
    package_manager: PackageManager,
}

impl Slimmer {
    pub fn new(config: Config) -> Self {
        let package_manager = PackageManager::from_config(&config.install);
        Self { config, package_manager }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn slim(&self, package: &PackageConfig) -> Result<PackageReport, AppError> {
        let archive_path = self.config.archive_path(package);
        if !archive_path.is_file() {
            return Err(AppError::MissingArchive(archive_path));
        }

        let size_before = fs::metadata(&archive_path)?.len();
        let mut report = PackageReport::new(&package.name, &archive_path, size_before);

        let workdir = self.workdir(&package.name)?;
        log::info!("[{}] Extracting {}", package.name, archive_path.display());
        log::debug!("[{}] Working directory {}", package.name, workdir.path().display());
        archive::extract(&archive_path, workdir.path())?;

        self.trim(package, workdir.path(), &mut report)?;

        log::info!("[{}] Rezipping {}", package.name, archive_path.display());
        report.size_after = archive::create(workdir.path(), &archive_path)?;
        workdir.close()?;

        Ok(report)
    }

    /// Steps applied to the extracted tree between unzip and rezip.
    fn trim(
        &self,
        package: &PackageConfig,
        root: &Path,
        report: &mut PackageReport,
    ) -> Result<(), AppError> {
        if !package.remove_folders.is_empty() {
            log::info!("[{}] Removing folders", package.name);
            let pruned = prune::remove_folders(root, &package.remove_folders)?;
            report.removed_folders = pruned.removed;
            report.unmatched_patterns = pruned.unmatched;
        }

        if let Some(strip) = &package.json_config
            && !strip.remove_keys.is_empty()
        {
            log::info!("[{}] Stripping keys from {}", package.name, strip.file.display());
            let file = root.join(&strip.file);
            report.stripped_keys = json_config::strip_keys(&file, &strip.remove_keys)?;
        }

        if package.install {
            log::info!("[{}] Reinstalling dependencies", package.name);
            let thinned =
                manifest::stage(&self.config.manifest_dir(), root, &package.remove_dependencies)?;
            self.package_manager.install(root)?;
            report.cleaned = manifest::cleanup(root)?;
            report.manifest = Some(thinned);
        }

        Ok(())
    }

    pub fn plan(&self, package: &PackageConfig) -> PackagePlan {
        let archive = self.config.archive_path(package);
        let archive_size = fs::metadata(&archive).ok().filter(|m| m.is_file()).map(|m| m.len());
        let json_config = package
            .json_config
            .as_ref()
            .filter(|strip| !strip.remove_keys.is_empty())
            .map(|strip| (strip.file.clone(), strip.remove_keys.clone()));

        PackagePlan {
            name: package.name.clone(),
            archive,
            archive_size,
            remove_folders: package.remove_folders.clone(),
            json_config,
            remove_dependencies: if package.install {
                package.remove_dependencies.clone()
            } else {
                Vec::new()
            },
            manifest_dir: package.install.then(|| self.config.manifest_dir()),
            install_command: package.install.then(|| self.package_manager.command_line()),
        }
    }

    fn workdir(&self, name: &str) -> Result<TempDir, AppError> {
        let prefix = format!("slimzip-{name}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match self.config.work_dir() {
            Some(parent) => {
                fs::create_dir_all(&parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

