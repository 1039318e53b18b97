pub mod context;
pub mod snapshot;
pub mod steps;

use std::fmt;

use crate::error::TeardownError;
use crate::output;
use crate::pulumi::{self, Pulumi};
use crate::storage::ObjectStore;

use context::{TeardownContext, TeardownOptions};

/// Teardown steps in the only order they may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    RemoveLock,
    RemovePendingOperations,
    Refresh,
    Destroy,
    RemoveStack,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RemoveLock => "Removing state locks",
            Self::RemovePendingOperations => "Removing pending operations",
            Self::Refresh => "Refreshing stack",
            Self::Destroy => "Destroying resources",
            Self::RemoveStack => "Removing stack",
        })
    }
}

/// Steps enabled by `options`.
pub fn plan(options: &TeardownOptions) -> Vec<Step> {
    let mut steps = Vec::new();
    if options.remove_lock {
        steps.push(Step::RemoveLock);
    }
    if options.remove_pending_operations {
        steps.push(Step::RemovePendingOperations);
    }
    if options.refresh_before_destroy {
        steps.push(Step::Refresh);
    }
    steps.push(Step::Destroy);
    if options.remove_stack {
        steps.push(Step::RemoveStack);
    }
    steps
}

/// What each planned step would do, without doing it.
pub fn preview(ctx: &TeardownContext, pulumi: &Pulumi<'_>) -> Vec<(Step, Vec<String>)> {
    let stack = ctx.stack();
    let targets = &ctx.options.targets;

    plan(&ctx.options)
        .into_iter()
        .map(|step| {
            let actions = match step {
                Step::RemoveLock => match ctx.identity.s3() {
                    Some(s3) => vec![format!(
                        "delete every object under s3://{}/{}",
                        s3.bucket,
                        s3.lock_prefix(stack)
                    )],
                    None => vec![format!(
                        "skip: backend {} is not s3://",
                        ctx.identity
                            .backend
                            .as_ref()
                            .map_or_else(|| "(none)".to_string(), |b| b.to_string())
                    )],
                },
                Step::RemovePendingOperations => {
                    let snapshot = ctx.identity.snapshot_path();
                    let file = snapshot
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let guard = if ctx.options.ignore_pending_create_operations {
                        ""
                    } else {
                        ", refusing if a create is pending"
                    };
                    vec![
                        pulumi.display(&pulumi::export_args(stack, &file)),
                        format!("drop deployment.pending_operations from {}{}", file, guard),
                        pulumi.display(&pulumi::import_args(stack, &file)),
                        format!("delete {}", snapshot.display()),
                    ]
                }
                Step::Refresh => {
                    vec![pulumi.display(&pulumi::refresh_args(stack, targets, pulumi.yes()))]
                }
                Step::Destroy => {
                    vec![pulumi.display(&pulumi::destroy_args(stack, targets, pulumi.yes()))]
                }
                Step::RemoveStack => {
                    let mut actions =
                        vec![pulumi.display(&pulumi::stack_rm_args(stack, pulumi.yes()))];
                    if let Some(s3) = ctx.identity.s3() {
                        actions.push(format!(
                            "delete s3://{}/{}",
                            s3.bucket,
                            s3.config_backup_key(stack)
                        ));
                    }
                    actions
                }
            };
            (step, actions)
        })
        .collect()
}

/// Run every enabled step in order, stopping at the first failure.
pub async fn run(
    ctx: &TeardownContext,
    pulumi: &Pulumi<'_>,
    store: &dyn ObjectStore,
) -> Result<(), TeardownError> {
    let planned = plan(&ctx.options);
    let total = planned.len();

    for (i, step) in planned.iter().enumerate() {
        output::step(i + 1, total, &step.to_string());
        match step {
            Step::RemoveLock => steps::remove_lock(ctx, store).await?,
            Step::RemovePendingOperations => steps::remove_pending_operations(ctx, pulumi).await?,
            Step::Refresh => steps::refresh(ctx, pulumi).await?,
            Step::Destroy => steps::destroy(ctx, pulumi).await?,
            Step::RemoveStack => steps::remove_stack(ctx, pulumi, store).await?,
        }
    }

    Ok(())
}
