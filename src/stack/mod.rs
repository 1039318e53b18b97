mod backend;

use anyhow::{bail, Context, Result};
use minijinja::{Environment, UndefinedBehavior};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::WorkspaceConfig;
use crate::error::TeardownError;

pub use backend::{Backend, S3Location};

const BACKEND_URL_ENV: &str = "PULUMI_BACKEND_URL";
const PROJECT_FILES: [&str; 2] = ["Pulumi.yaml", "Pulumi.yml"];

/// What the user asked for on the command line.
#[derive(Debug, Clone, Default)]
pub struct StackSelector {
    pub project_name: String,
    pub environment: Option<String>,
    pub stack: Option<String>,
    pub stack_format: Option<String>,
}

/// A concrete stack, resolved once per invocation.
#[derive(Debug, Clone)]
pub struct StackIdentity {
    pub project_name: String,
    pub project_root: PathBuf,
    pub stack: String,
    pub backend: Option<Backend>,
}

#[derive(Debug, Deserialize)]
struct PulumiProject {
    backend: Option<BackendSection>,
}

#[derive(Debug, Deserialize)]
struct BackendSection {
    url: Option<String>,
}

impl StackIdentity {
    pub fn resolve(config: &WorkspaceConfig, selector: &StackSelector) -> Result<Self> {
        let ambient = std::env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty());
        Self::resolve_with(config, selector, ambient.as_deref())
    }

    /// `ambient_backend` is used when the project file names no backend.
    pub fn resolve_with(
        config: &WorkspaceConfig,
        selector: &StackSelector,
        ambient_backend: Option<&str>,
    ) -> Result<Self> {
        if selector.project_name.trim().is_empty() {
            return Err(TeardownError::MissingProjectName.into());
        }

        let project = config.project(&selector.project_name)?;
        let project_root = config.project_root(project);

        let stack = match selector.stack.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(stack) => stack.to_string(),
            None => {
                let format = selector
                    .stack_format
                    .as_deref()
                    .unwrap_or_else(|| config.stack_format(project));
                render_stack_name(
                    format,
                    &selector.project_name,
                    selector.environment.as_deref(),
                )?
            }
        };

        let backend = match read_backend_url(&project_root)?.as_deref().or(ambient_backend) {
            Some(url) => Some(Backend::parse(url)?),
            None => None,
        };

        debug!(
            "Resolved {} -> stack '{}' in {} (backend: {:?})",
            selector.project_name,
            stack,
            project_root.display(),
            backend
        );

        Ok(Self {
            project_name: selector.project_name.clone(),
            project_root,
            stack,
            backend,
        })
    }

    pub fn s3(&self) -> Option<&S3Location> {
        match &self.backend {
            Some(Backend::S3(location)) => Some(location),
            _ => None,
        }
    }

    /// Where the exported state is written while pending operations are edited.
    pub fn snapshot_path(&self) -> PathBuf {
        self.project_root
            .join(format!("{}-state.json", self.stack.replace('/', "-")))
    }
}

fn render_stack_name(format: &str, project: &str, environment: Option<&str>) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    let mut vars = BTreeMap::new();
    vars.insert("project", project);
    if let Some(environment) = environment {
        vars.insert("environment", environment);
    }

    let name = env.render_str(format, &vars).with_context(|| {
        format!(
            "Failed to render stack format '{}' (project '{}', environment {})",
            format,
            project,
            environment.map_or_else(|| "not set".to_string(), |e| format!("'{}'", e))
        )
    })?;

    let name = name.trim();
    if name.is_empty() {
        bail!("Stack format '{}' rendered an empty stack name", format);
    }
    Ok(name.to_string())
}

fn read_backend_url(project_root: &Path) -> Result<Option<String>> {
    let Some(path) = PROJECT_FILES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.exists())
    else {
        bail!("No Pulumi.yaml found in {}", project_root.display());
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let project: PulumiProject = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(project
        .backend
        .and_then(|backend| backend.url)
        .filter(|url| !url.trim().is_empty()))
}
