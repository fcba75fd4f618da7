pub mod loader;
pub mod runner;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use runner::{run_recipe, run_step, RunError, StepResult};
pub use schema::{
    Action, Metadata, RecipeConfig, StepDefinition, ValidationError, ValidationIssue,
};
