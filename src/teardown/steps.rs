use tracing::debug;

use crate::error::TeardownError;
use crate::output;
use crate::pulumi::Pulumi;
use crate::storage::ObjectStore;

use super::context::TeardownContext;
use super::snapshot::SnapshotFile;

pub async fn remove_lock(
    ctx: &TeardownContext,
    store: &dyn ObjectStore,
) -> Result<(), TeardownError> {
    // Only S3 locks are supported
    let Some(s3) = ctx.identity.s3() else {
        output::warning("Lock removal needs an s3:// backend, skipping");
        return Ok(());
    };

    let prefix = s3.lock_prefix(ctx.stack());
    let keys = store.list_keys(&s3.bucket, &prefix).await?;
    if keys.is_empty() {
        output::info(&format!("No locks under s3://{}/{}", s3.bucket, prefix));
        return Ok(());
    }

    for key in &keys {
        output::info(&format!("Deleting s3://{}/{}", s3.bucket, key));
        store.delete(&s3.bucket, key).await?;
    }

    output::success(&format!("Removed {} lock(s)", keys.len()));
    Ok(())
}

pub async fn remove_pending_operations(
    ctx: &TeardownContext,
    pulumi: &Pulumi<'_>,
) -> Result<(), TeardownError> {
    let snapshot = SnapshotFile::claim(ctx.identity.snapshot_path())?;
    let file = snapshot.file_name();
    debug!("State snapshot at {}", snapshot.path().display());

    pulumi.export(ctx.stack(), &file).await?;

    let removed = snapshot
        .strip_pending_operations(ctx.options.ignore_pending_create_operations)
        .await?;
    if removed.is_empty() {
        output::info("No pending operations in state");
    }
    for op in &removed {
        output::info(&format!("Dropping pending operation {}", op));
    }

    pulumi.import(ctx.stack(), &file).await?;

    drop(snapshot);
    output::success(&format!("Removed {} pending operation(s)", removed.len()));
    Ok(())
}

pub async fn refresh(ctx: &TeardownContext, pulumi: &Pulumi<'_>) -> Result<(), TeardownError> {
    pulumi.refresh(ctx.stack(), &ctx.options.targets).await?;
    output::success("Stack refreshed");
    Ok(())
}

pub async fn destroy(ctx: &TeardownContext, pulumi: &Pulumi<'_>) -> Result<(), TeardownError> {
    pulumi.destroy(ctx.stack(), &ctx.options.targets).await?;
    output::success("Resources destroyed");
    Ok(())
}

pub async fn remove_stack(
    ctx: &TeardownContext,
    pulumi: &Pulumi<'_>,
    store: &dyn ObjectStore,
) -> Result<(), TeardownError> {
    pulumi.stack_rm(ctx.stack()).await?;

    if let Some(s3) = ctx.identity.s3() {
        let key = s3.config_backup_key(ctx.stack());
        output::info(&format!("Deleting s3://{}/{}", s3.bucket, key));
        store.delete(&s3.bucket, &key).await?;
    }

    output::success(&format!("Stack {} removed", ctx.stack()));
    Ok(())
}
