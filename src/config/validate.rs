use anyhow::{bail, Result};

use super::WorkspaceConfig;

pub fn validate(config: &WorkspaceConfig) -> Result<()> {
    if config.workspace.pulumi.trim().is_empty() {
        bail!("workspace.pulumi cannot be empty");
    }

    if config.workspace.stack_format.trim().is_empty() {
        bail!("workspace.stack_format cannot be empty");
    }

    for (name, project) in &config.projects {
        if project.root.as_os_str().is_empty() {
            bail!("Project '{}' has no root defined", name);
        }

        if let Some(format) = &project.stack_format {
            if format.trim().is_empty() {
                bail!("Project '{}' stack_format cannot be empty", name);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::WorkspaceConfig;

    #[test]
    fn rejects_empty_root() {
        let err = WorkspaceConfig::parse("[projects.api]\nroot = \"\"\n").unwrap_err();
        assert_eq!(err.to_string(), "Project 'api' has no root defined");
    }

    #[test]
    fn rejects_blank_formats() {
        let err = WorkspaceConfig::parse("[workspace]\nstack_format = \" \"\n").unwrap_err();
        assert_eq!(err.to_string(), "workspace.stack_format cannot be empty");

        let err = WorkspaceConfig::parse(
            "[projects.api]\nroot = \"apps/api\"\nstack_format = \"\"\n",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Project 'api' stack_format cannot be empty");
    }

    #[test]
    fn rejects_empty_pulumi_binary() {
        let err = WorkspaceConfig::parse("[workspace]\npulumi = \"\"\n").unwrap_err();
        assert_eq!(err.to_string(), "workspace.pulumi cannot be empty");
    }
}
