use std::path::Path;
use std::process::Command;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::InstallConfig;
use crate::error::AppError;

/// The external package manager invoked to reinstall dependencies.
#[derive(Debug, Clone)]
pub struct PackageManager {
    command: String,
    args: Vec<String>,
}

impl PackageManager {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self { command: command.into(), args }
    }

    pub fn from_config(config: &InstallConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    /// The command line as it would be typed in a shell.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.command.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Run the install command with `workdir` as its working directory.
    pub fn install(&self, workdir: &Path) -> Result<(), AppError> {
        log::info!("$ {}", self.command_line());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Running {}", self.command));
        spinner.enable_steady_tick(Duration::from_millis(120));

        let output = Command::new(&self.command).args(&self.args).current_dir(workdir).output();
        spinner.finish_and_clear();

        let output = output.map_err(|source| AppError::InstallLaunch {
            command: self.command.clone(),
            source,
        })?;
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            log::debug!("{}: {}", self.command, line);
        }

        if !output.status.success() {
            for line in String::from_utf8_lossy(&output.stderr).lines() {
                log::error!("{}: {}", self.command, line);
            }
            return Err(AppError::Install {
                command: self.command_line(),
                status: output.status,
            });
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            log::debug!("{}: {}", self.command, line);
        }
        Ok(())
    }
}
