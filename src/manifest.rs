//! Staging and cleanup of the npm manifest around a dependency reinstall.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::AppError;
use crate::model::ThinnedManifest;

pub const MANIFEST_FILE: &str = "package.json";

pub const LOCK_FILES: &[&str] = &["package-lock.json", "npm-shrinkwrap.json"];

const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "optionalDependencies"];

/// npm's hidden lockfile, written into node_modules on every install.
const HIDDEN_LOCK_FILE: &str = ".package-lock.json";

/// Drop `devDependencies` and the named runtime dependencies from a parsed
/// `package.json`.
pub fn thin(manifest: &mut Value, remove: &[String]) -> ThinnedManifest {
    let mut thinned = ThinnedManifest::default();
    let Value::Object(root) = manifest else {
        return thinned;
    };

    if let Some(Value::Object(dev)) = root.shift_remove("devDependencies") {
        thinned.dev_dependencies = dev.keys().cloned().collect();
    }

    for name in remove {
        let mut found = false;
        for section in DEPENDENCY_SECTIONS {
            if let Some(Value::Object(deps)) = root.get_mut(*section)
                && deps.shift_remove(name).is_some()
            {
                found = true;
            }
        }
        if found {
            thinned.dependencies.push(name.clone());
        } else {
            log::warn!("Dependency '{}' is not declared in {}", name, MANIFEST_FILE);
        }
    }

    thinned
}

/// Copy `package.json` and any lock file from `manifest_dir` into `workdir`,
/// then thin the copied manifest in place.
pub fn stage(
    manifest_dir: &Path,
    workdir: &Path,
    remove: &[String],
) -> Result<ThinnedManifest, AppError> {
    let source = manifest_dir.join(MANIFEST_FILE);
    if !source.is_file() {
        return Err(AppError::MissingManifest(source));
    }

    let contents = fs::read_to_string(&source)?;
    let mut manifest: Value = serde_json::from_str(&contents)
        .map_err(|err| AppError::invalid_json(&source, err.to_string()))?;
    if !manifest.is_object() {
        return Err(AppError::invalid_json(&source, "top-level value is not an object"));
    }

    let thinned = thin(&mut manifest, remove);
    let mut rendered = serde_json::to_string_pretty(&manifest)?;
    rendered.push('\n');
    fs::write(workdir.join(MANIFEST_FILE), rendered)?;

    for lock in LOCK_FILES {
        let lock_source = manifest_dir.join(lock);
        if lock_source.is_file() {
            fs::copy(&lock_source, workdir.join(lock))?;
            log::debug!("Staged {}", lock);
        }
    }

    Ok(thinned)
}

/// Remove everything the install step leaves behind that does not belong in
/// a deployment: manifest and lock files, symlinked local packages and the
/// `.bin` links that pointed into them. Returns the removed paths relative to
/// `workdir`.
pub fn cleanup(workdir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut removed = Vec::new();

    let node_modules = PathBuf::from("node_modules");
    let mut files = vec![PathBuf::from(MANIFEST_FILE), node_modules.join(HIDDEN_LOCK_FILE)];
    files.extend(LOCK_FILES.iter().map(PathBuf::from));
    for relative in files {
        if remove_path(&workdir.join(&relative))? {
            removed.push(relative);
        }
    }

    for link in linked_packages(&workdir.join(&node_modules))? {
        fs::remove_file(&link)?;
        if let Ok(relative) = link.strip_prefix(workdir) {
            log::debug!("Removed linked package {}", relative.display());
            removed.push(relative.to_path_buf());
        }
    }

    let bin = workdir.join(&node_modules).join(".bin");
    for entry in read_dir_if_exists(&bin)? {
        let path = entry.path();
        let is_link = fs::symlink_metadata(&path)?.file_type().is_symlink();
        // A link whose target no longer resolves belonged to a removed package.
        if is_link && fs::metadata(&path).is_err() {
            fs::remove_file(&path)?;
            if let Ok(relative) = path.strip_prefix(workdir) {
                removed.push(relative.to_path_buf());
            }
        }
    }

    Ok(removed)
}

/// Symlinked packages directly under `node_modules` or inside an `@scope`.
fn linked_packages(node_modules: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut links = Vec::new();
    for entry in read_dir_if_exists(node_modules)? {
        let path = entry.path();
        let file_type = fs::symlink_metadata(&path)?.file_type();
        if file_type.is_symlink() {
            links.push(path);
        } else if file_type.is_dir() && entry.file_name().to_string_lossy().starts_with('@') {
            for scoped in read_dir_if_exists(&path)? {
                let scoped_path = scoped.path();
                if fs::symlink_metadata(&scoped_path)?.file_type().is_symlink() {
                    links.push(scoped_path);
                }
            }
        }
    }
    links.sort();
    Ok(links)
}

fn read_dir_if_exists(dir: &Path) -> Result<Vec<fs::DirEntry>, AppError> {
    match fs::read_dir(dir) {
        Ok(entries) => Ok(entries.collect::<Result<Vec<_>, _>>()?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(AppError::Io(err)),
    }
}

fn remove_path(path: &Path) -> Result<bool, AppError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(AppError::Io(err)),
    }
}
