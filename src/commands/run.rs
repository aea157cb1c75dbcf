use std::path::PathBuf;

use crate::config::{Config, config_file_path};
use crate::error::AppError;
use crate::model::{PackageReport, SlimReport};
use crate::pipeline::Slimmer;
use crate::utils::{display_path, format_bytes};

pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub packages: Vec<String>,
    pub verbose: bool,
}

pub fn execute_run(options: RunOptions) -> Result<SlimReport, AppError> {
    let path = config_file_path(options.config_path.as_deref())?;
    let config = Config::load(&path)?;
    let slimmer = Slimmer::new(config);
    let selected = slimmer.config().select(&options.packages)?;

    let mut report = SlimReport::new();
    for package in selected {
        let package_report = slimmer.slim(package)?;
        print_package(&package_report, options.verbose);
        report.push(package_report);
    }

    if report.packages.len() > 1 {
        println!(
            "Total: {} -> {} across {} package(s)",
            format_bytes(report.total_before()),
            format_bytes(report.total_after()),
            report.packages.len()
        );
    }
    Ok(report)
}

fn print_package(report: &PackageReport, verbose: bool) {
    println!(
        "{}: {} -> {} (saved {})",
        report.name,
        format_bytes(report.size_before),
        format_bytes(report.size_after),
        format_bytes(report.saved())
    );
    if !verbose {
        return;
    }

    println!("    archive  {}", display_path(&report.archive));
    for folder in &report.removed_folders {
        println!("    - folder {:<50} {}", folder.path.display(), format_bytes(folder.size));
    }
    for pattern in &report.unmatched_patterns {
        println!("    ! folder {pattern} matched nothing");
    }
    for key in &report.stripped_keys {
        println!("    - key    {key}");
    }
    if let Some(manifest) = &report.manifest {
        for name in &manifest.dev_dependencies {
            println!("    - dev    {name}");
        }
        for name in &manifest.dependencies {
            println!("    - dep    {name}");
        }
    }
    for path in &report.cleaned {
        println!("    - file   {}", path.display());
    }
}
