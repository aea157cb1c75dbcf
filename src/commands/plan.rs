use std::path::PathBuf;

use crate::config::{Config, config_file_path};
use crate::error::AppError;
use crate::model::PackagePlan;
use crate::pipeline::Slimmer;
use crate::utils::{display_path, format_bytes};

pub struct PlanOptions {
    pub config_path: Option<PathBuf>,
    pub packages: Vec<String>,
}

pub fn execute_plan(options: PlanOptions) -> Result<Vec<PackagePlan>, AppError> {
    let path = config_file_path(options.config_path.as_deref())?;
    let config = Config::load(&path)?;
    let slimmer = Slimmer::new(config);

    let plans: Vec<PackagePlan> = slimmer
        .config()
        .select(&options.packages)?
        .into_iter()
        .map(|package| slimmer.plan(package))
        .collect();

    println!("Slimming plan ({}):", display_path(&path));
    for plan in &plans {
        print_plan(plan);
    }
    Ok(plans)
}

fn print_plan(plan: &PackagePlan) {
    let size = match plan.archive_size {
        Some(size) => format_bytes(size),
        None => "missing".to_string(),
    };
    println!("- {} ({}, {})", plan.name, display_path(&plan.archive), size);

    if plan.remove_folders.is_empty() {
        println!("    folders: none");
    } else {
        println!("    folders: {}", plan.remove_folders.join(", "));
    }

    if let Some((file, keys)) = &plan.json_config {
        println!("    config:  {} without {}", file.display(), keys.join(", "));
    }

    match (&plan.install_command, &plan.manifest_dir) {
        (Some(command), Some(manifest_dir)) => {
            println!("    manifest: {}", display_path(manifest_dir));
            if !plan.remove_dependencies.is_empty() {
                println!("    drop deps: {}", plan.remove_dependencies.join(", "));
            }
            println!("    install: {command}");
        }
        _ => println!("    install: skipped"),
    }
}
