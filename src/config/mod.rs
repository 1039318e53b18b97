use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod validate;

pub const DEFAULT_STACK_FORMAT: &str = "{{ environment }}";

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub workspace: WorkspaceSettings,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
    /// Directory containing the config file; project roots are relative to it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WorkspaceSettings {
    #[serde(default = "default_pulumi")]
    pub pulumi: String,
    #[serde(default = "default_stack_format")]
    pub stack_format: String,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            pulumi: default_pulumi(),
            stack_format: default_stack_format(),
        }
    }
}

fn default_pulumi() -> String {
    "pulumi".to_string()
}

fn default_stack_format() -> String {
    DEFAULT_STACK_FORMAT.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    pub root: PathBuf,
    pub stack_format: Option<String>,
}

impl WorkspaceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        validate::validate(&config)?;
        Ok(config)
    }

    pub fn project(&self, name: &str) -> Result<&ProjectConfig> {
        self.projects.get(name).with_context(|| {
            let known: Vec<&str> = self.projects.keys().map(String::as_str).collect();
            format!(
                "Project '{}' not found in workspace (known projects: {})",
                name,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            )
        })
    }

    pub fn project_root(&self, project: &ProjectConfig) -> PathBuf {
        self.base_dir.join(&project.root)
    }

    /// Stack name format for a project, before any command-line override.
    pub fn stack_format<'a>(&'a self, project: &'a ProjectConfig) -> &'a str {
        project
            .stack_format
            .as_deref()
            .unwrap_or(&self.workspace.stack_format)
    }
}
