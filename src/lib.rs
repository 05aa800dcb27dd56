pub mod base_branch;
pub mod branch;
pub mod browser;
pub mod cache;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod gh;
pub mod git;
pub mod issues;
pub mod output;
pub mod prompt;
pub mod template;
pub mod workflow;

#[cfg(test)]
pub mod test_utils;

pub use cache::Cache;
pub use config::Config;
pub use context::AppContext;
pub use error::{DevflowError, Result};
pub use workflow::{Workflow, WorkflowContext};
