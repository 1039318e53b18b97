use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::stack::StackSelector;
use crate::teardown::context::TeardownOptions;

pub mod destroy;
pub mod resolve;

#[derive(Parser)]
#[command(
    name = "stackdown",
    version,
    about = "Tear down Pulumi stacks: locks, pending operations, destroy, removal"
)]
pub struct Cli {
    /// Path to stackdown.toml
    #[arg(short, long, default_value = "stackdown.toml", global = true)]
    pub config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Destroy a project's stack, optionally clearing locks and pending operations first
    Destroy(DestroyArgs),

    /// Show the stack, backend and lock location a project resolves to
    Resolve {
        #[command(flatten)]
        stack: StackArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct StackArgs {
    /// Project name as listed in stackdown.toml
    pub project: String,

    /// Environment used to render the stack name
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Explicit stack name (the stack format is not used)
    #[arg(short, long)]
    pub stack: Option<String>,

    /// Stack name template, e.g. "{{ project }}-{{ environment }}"
    #[arg(long, visible_alias = "configuration-stack-format")]
    pub stack_format: Option<String>,
}

impl StackArgs {
    pub fn selector(&self) -> StackSelector {
        StackSelector {
            project_name: self.project.clone(),
            environment: self.environment.clone(),
            stack: self.stack.clone(),
            stack_format: self.stack_format.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct DestroyArgs {
    #[command(flatten)]
    pub stack: StackArgs,

    /// Delete the stack's lock objects from the S3 backend first
    #[arg(long)]
    pub remove_lock: bool,

    /// Export the state, drop pending operations and import it again
    #[arg(long)]
    pub remove_pending_operations: bool,

    /// Drop pending create operations too (the resources may be left orphaned)
    #[arg(long)]
    pub ignore_pending_create_operations: bool,

    /// Run `pulumi refresh` before destroying
    #[arg(long)]
    pub refresh_before_destroy: bool,

    /// Remove the stack (and its S3 config backup) after destroying
    #[arg(long)]
    pub remove_stack: bool,

    /// Resource URN to scope refresh and destroy to (repeatable)
    #[arg(short, long = "target")]
    pub targets: Vec<String>,

    /// Pass --yes to refresh, destroy and stack rm
    #[arg(short, long)]
    pub yes: bool,

    /// Print the planned steps and commands without running them
    #[arg(long)]
    pub dry_run: bool,
}

impl DestroyArgs {
    pub fn options(&self) -> TeardownOptions {
        TeardownOptions {
            remove_lock: self.remove_lock,
            remove_pending_operations: self.remove_pending_operations,
            ignore_pending_create_operations: self.ignore_pending_create_operations,
            refresh_before_destroy: self.refresh_before_destroy,
            remove_stack: self.remove_stack,
            targets: self.targets.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroy_flags_map_to_options() {
        let cli = Cli::parse_from([
            "stackdown",
            "destroy",
            "api",
            "-e",
            "dev",
            "--remove-lock",
            "--remove-pending-operations",
            "--ignore-pending-create-operations",
            "--target",
            "urn:a",
            "-t",
            "urn:b",
        ]);

        let Command::Destroy(args) = cli.command else {
            panic!("expected destroy");
        };
        let options = args.options();
        assert!(options.remove_lock);
        assert!(options.remove_pending_operations);
        assert!(options.ignore_pending_create_operations);
        assert!(!options.refresh_before_destroy);
        assert!(!options.remove_stack);
        assert_eq!(options.targets, ["urn:a", "urn:b"]);

        let selector = args.stack.selector();
        assert_eq!(selector.project_name, "api");
        assert_eq!(selector.environment.as_deref(), Some("dev"));
    }

    #[test]
    fn project_is_required() {
        assert!(Cli::try_parse_from(["stackdown", "destroy"]).is_err());
    }

    #[test]
    fn long_stack_format_alias() {
        let cli = Cli::parse_from([
            "stackdown",
            "resolve",
            "api",
            "--configuration-stack-format",
            "{{ project }}",
            "--json",
        ]);
        let Command::Resolve { stack, json } = cli.command else {
            panic!("expected resolve");
        };
        assert!(json);
        assert_eq!(stack.stack_format.as_deref(), Some("{{ project }}"));
    }
}
