//! Removal of sections from JSON config files shipped inside an archive.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::AppError;

/// Remove `keys` from the JSON object stored at `path` and rewrite the file.
///
/// Keys are dotted paths walked through nested objects (`auth.providers`).
/// Returns the keys that were present and removed; absent keys are skipped.
pub fn strip_keys(path: &Path, keys: &[String]) -> Result<Vec<String>, AppError> {
    if !path.is_file() {
        return Err(AppError::MissingFile(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    let mut document: Value = serde_json::from_str(&contents)
        .map_err(|err| AppError::invalid_json(path, err.to_string()))?;
    let Value::Object(root) = &mut document else {
        return Err(AppError::invalid_json(path, "top-level value is not an object"));
    };

    let mut removed = Vec::new();
    for key in keys {
        if remove_dotted(root, key) {
            removed.push(key.clone());
        } else {
            log::warn!("Key '{}' not present in {}", key, path.display());
        }
    }

    if !removed.is_empty() {
        let mut rendered = serde_json::to_string_pretty(&document)?;
        rendered.push('\n');
        fs::write(path, rendered)?;
    }
    Ok(removed)
}

fn remove_dotted(root: &mut Map<String, Value>, key: &str) -> bool {
    // An exact top-level match wins so keys containing dots stay addressable.
    if root.shift_remove(key).is_some() {
        return true;
    }

    let Some((head, rest)) = key.split_once('.') else {
        return false;
    };
    match root.get_mut(head) {
        Some(Value::Object(child)) => remove_dotted(child, rest),
        _ => false,
    }
}
