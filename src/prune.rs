use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::AppError;
use crate::model::{Pruned, RemovedFolder};
use crate::utils::{path_size, slash_path};

/// Compile folder patterns. `*` stays within one path segment, so `docs/*`
/// only reaches direct children of `docs`, while `**/docs` matches at any depth.
pub fn compile_patterns(patterns: &[String]) -> Result<Option<GlobSet>, AppError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let normalized = pattern.trim().trim_start_matches("./").trim_end_matches('/');
        builder.add(GlobBuilder::new(normalized).literal_separator(true).build()?);
    }
    Ok(Some(builder.build()?))
}

/// Delete every directory under `root` whose relative path matches one of
/// `patterns`. Matched directories are removed whole. A pattern counts as
/// matched when its target sits under a folder another pattern removes.
pub fn remove_folders(root: &Path, patterns: &[String]) -> Result<Pruned, AppError> {
    let Some(set) = compile_patterns(patterns)? else {
        return Ok(Pruned::default());
    };

    let mut matched: Vec<PathBuf> = Vec::new();
    let mut hits = vec![0usize; patterns.len()];
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let matches = set.matches(slash_path(relative));
        for index in &matches {
            hits[*index] += 1;
        }

        // The sorted walk yields a folder's descendants right after it.
        let covered = matched.last().is_some_and(|last| relative.starts_with(last));
        if !matches.is_empty() && !covered {
            matched.push(relative.to_path_buf());
        }
    }

    let unmatched: Vec<String> = patterns
        .iter()
        .zip(&hits)
        .filter(|(_, count)| **count == 0)
        .map(|(pattern, _)| pattern.clone())
        .collect();
    for pattern in &unmatched {
        log::warn!("Folder pattern '{}' matched nothing", pattern);
    }

    let mut removed = Vec::with_capacity(matched.len());
    for relative in matched {
        let path = root.join(&relative);
        let size = path_size(&path);
        if let Err(err) = fs::remove_dir_all(&path)
            && err.kind() != io::ErrorKind::NotFound
        {
            return Err(AppError::Io(err));
        }
        log::debug!("Removed {}", relative.display());
        removed.push(RemovedFolder::new(relative, size));
    }

    Ok(Pruned { removed, unmatched })
}
