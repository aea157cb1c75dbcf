use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{config_file_path, ensure_config_file};
use crate::error::AppError;
use crate::utils::display_path;

pub struct ConfigOptions {
    pub config_path: Option<PathBuf>,
    pub show_path: bool,
    pub init: bool,
    pub edit: bool,
}

pub fn execute_config(options: ConfigOptions) -> Result<(), AppError> {
    let path = config_file_path(options.config_path.as_deref())?;

    if options.show_path {
        println!("Configuration file: {}", display_path(&path));
    }

    if options.init {
        if ensure_config_file(&path)? {
            println!("Created {}", display_path(&path));
        } else {
            println!("{} already exists; leaving it untouched.", display_path(&path));
        }
    }

    if options.edit {
        ensure_config_file(&path)?;
        open_editor(&path)?;
    }

    if !options.show_path && !options.init && !options.edit {
        let status = if path.exists() { "" } else { " (not created yet)" };
        println!("Configuration file: {}{}", display_path(&path), status);
    }

    Ok(())
}

fn open_editor(path: &Path) -> Result<(), AppError> {
    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| "nano".to_string());

    let status = Command::new(&editor)
        .arg(path)
        .status()
        .map_err(|err| AppError::Editor(err.to_string()))?;

    if status.success() {
        Ok(())
    } else {
        Err(AppError::Editor(format!("Editor exited with status {}", status)))
    }
}
