use anyhow::{bail, Context, Result};

use crate::cli::DestroyArgs;
use crate::config::WorkspaceConfig;
use crate::output;
use crate::pulumi::{ProcessRunner, Pulumi};
use crate::stack::StackIdentity;
use crate::storage::S3Store;
use crate::teardown::{self, context::TeardownContext};

pub async fn run(config: WorkspaceConfig, args: DestroyArgs) -> Result<()> {
    let identity = StackIdentity::resolve(&config, &args.stack.selector())?;
    let ctx = TeardownContext::new(identity, args.options());

    let runner = ProcessRunner;
    let pulumi = Pulumi::new(
        &runner,
        &config.workspace.pulumi,
        &ctx.identity.project_root,
        args.yes,
    );

    output::header(&format!(
        "Tearing down {} (stack {})",
        ctx.identity.project_name,
        ctx.stack()
    ));
    if let Some(backend) = &ctx.identity.backend {
        output::info(&format!("Backend: {}", backend));
    }

    if args.dry_run {
        let preview = teardown::preview(&ctx, &pulumi);
        let total = preview.len();
        for (i, (step, actions)) in preview.iter().enumerate() {
            output::step(i + 1, total, &step.to_string());
            for action in actions {
                println!("      {}", action);
            }
        }
        println!();
        output::info("Dry run: nothing was changed");
        return Ok(());
    }

    if which::which(&config.workspace.pulumi).is_err() {
        bail!(
            "Pulumi CLI '{}' not found. Install it from https://www.pulumi.com/docs/install/",
            config.workspace.pulumi
        );
    }

    let region = ctx.identity.s3().and_then(|s3| s3.region.as_deref());
    let store = S3Store::new(region);

    teardown::run(&ctx, &pulumi, &store)
        .await
        .with_context(|| format!("Teardown of stack {} failed", ctx.stack()))?;

    println!();
    output::success(&format!("Stack {} torn down", ctx.stack()));
    Ok(())
}
