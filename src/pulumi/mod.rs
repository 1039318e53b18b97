mod runner;

use std::path::{Path, PathBuf};

use crate::error::TeardownError;
use crate::output;

pub use runner::{CommandRunner, CommandStatus, ProcessRunner};

/// Typed `pulumi` invocations for one project directory.
pub struct Pulumi<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
    cwd: PathBuf,
    yes: bool,
}

impl<'a> Pulumi<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: &str, cwd: &Path, yes: bool) -> Self {
        Self {
            runner,
            program: program.to_string(),
            cwd: cwd.to_path_buf(),
            yes,
        }
    }

    pub async fn export(&self, stack: &str, file: &str) -> Result<(), TeardownError> {
        self.run(export_args(stack, file)).await
    }

    pub async fn import(&self, stack: &str, file: &str) -> Result<(), TeardownError> {
        self.run(import_args(stack, file)).await
    }

    pub async fn refresh(&self, stack: &str, targets: &[String]) -> Result<(), TeardownError> {
        self.run(refresh_args(stack, targets, self.yes)).await
    }

    pub async fn destroy(&self, stack: &str, targets: &[String]) -> Result<(), TeardownError> {
        self.run(destroy_args(stack, targets, self.yes)).await
    }

    pub async fn stack_rm(&self, stack: &str) -> Result<(), TeardownError> {
        self.run(stack_rm_args(stack, self.yes)).await
    }

    /// Command line as echoed to the user, e.g. `pulumi destroy --stack dev`.
    pub fn display(&self, args: &[String]) -> String {
        let mut line = self.program.clone();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    pub fn yes(&self) -> bool {
        self.yes
    }

    async fn run(&self, args: Vec<String>) -> Result<(), TeardownError> {
        let command = self.display(&args);
        output::command(&command);

        let status = self
            .runner
            .run(&self.program, &args, &self.cwd)
            .await
            .map_err(|source| TeardownError::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(TeardownError::CommandFailed {
                command,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

fn with_targets(mut args: Vec<String>, targets: &[String]) -> Vec<String> {
    args.extend(targets.iter().map(|t| format!("--target={}", t)));
    args
}

fn with_yes(mut args: Vec<String>, yes: bool) -> Vec<String> {
    if yes {
        args.push("--yes".to_string());
    }
    args
}

pub fn export_args(stack: &str, file: &str) -> Vec<String> {
    owned(&["stack", "export", "--stack", stack, "--file", file])
}

pub fn import_args(stack: &str, file: &str) -> Vec<String> {
    owned(&["stack", "import", "--stack", stack, "--file", file])
}

pub fn refresh_args(stack: &str, targets: &[String], yes: bool) -> Vec<String> {
    with_yes(with_targets(owned(&["refresh", "--stack", stack]), targets), yes)
}

pub fn destroy_args(stack: &str, targets: &[String], yes: bool) -> Vec<String> {
    with_yes(with_targets(owned(&["destroy", "--stack", stack]), targets), yes)
}

pub fn stack_rm_args(stack: &str, yes: bool) -> Vec<String> {
    with_yes(owned(&["stack", "rm", "--stack", stack]), yes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_keep_their_order() {
        let targets = vec!["urn:a".to_string(), "urn:b".to_string()];
        assert_eq!(
            refresh_args("dev", &targets, false),
            ["refresh", "--stack", "dev", "--target=urn:a", "--target=urn:b"]
        );
        assert_eq!(
            destroy_args("dev", &targets, false),
            ["destroy", "--stack", "dev", "--target=urn:a", "--target=urn:b"]
        );
    }

    #[test]
    fn yes_goes_last() {
        assert_eq!(
            destroy_args("dev", &["urn:a".to_string()], true),
            ["destroy", "--stack", "dev", "--target=urn:a", "--yes"]
        );
        assert_eq!(stack_rm_args("dev", true), ["stack", "rm", "--stack", "dev", "--yes"]);
        assert_eq!(stack_rm_args("dev", false), ["stack", "rm", "--stack", "dev"]);
    }

    #[test]
    fn state_transfer_args() {
        assert_eq!(
            export_args("dev", "dev-state.json"),
            ["stack", "export", "--stack", "dev", "--file", "dev-state.json"]
        );
        assert_eq!(
            import_args("dev", "dev-state.json"),
            ["stack", "import", "--stack", "dev", "--file", "dev-state.json"]
        );
    }
}
