//! Symbolic workflow names and the GitHub Actions files they dispatch.

use crate::error::{Error, Result};

/// Known workflows: symbolic name -> workflow file in the target repository.
const WORKFLOWS: &[(&str, &str)] = &[
    ("daily-stats", "daily-stats.yml"),
    ("theme-automation", "theme-automation.yml"),
    ("seo-optimization", "seo-optimization.yml"),
    ("data-visualization", "data-visualization.yml"),
];

/// Resolve a symbolic name to its workflow file.
pub fn resolve(name: &str) -> Option<&'static str> {
    WORKFLOWS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, file)| *file)
}

/// Resolve a symbolic name, erroring on names outside the registry.
pub fn resolve_required(name: &str) -> Result<&'static str> {
    resolve(name).ok_or_else(|| Error::UnknownWorkflow(name.to_string()))
}

/// Build the `workflow_dispatch` URL for a workflow file.
pub fn dispatch_url(api_base: &str, repo: &str, file: &str) -> String {
    format!("{api_base}/repos/{repo}/actions/workflows/{file}/dispatches")
}

/// List all known symbolic names.
pub fn all_workflows() -> Vec<&'static str> {
    WORKFLOWS.iter().map(|(name, _)| *name).collect()
}
