pub mod config_cmd;
pub mod plan;
pub mod run;

pub use config_cmd::execute_config;
pub use plan::execute_plan;
pub use run::execute_run;
