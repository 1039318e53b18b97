use anyhow::Result;
use serde_json::json;

use crate::cli::StackArgs;
use crate::config::WorkspaceConfig;
use crate::output;
use crate::stack::StackIdentity;

pub fn run(config: &WorkspaceConfig, args: &StackArgs, as_json: bool) -> Result<()> {
    let identity = StackIdentity::resolve(config, &args.selector())?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&describe(&identity))?);
        return Ok(());
    }

    output::header(&format!("Project {}", identity.project_name));
    println!("  Root:     {}", identity.project_root.display());
    println!("  Stack:    {}", identity.stack);
    match &identity.backend {
        Some(backend) => println!("  Backend:  {}", backend),
        None => println!("  Backend:  (not set)"),
    }
    if let Some(s3) = identity.s3() {
        println!("  Locks:    s3://{}/{}", s3.bucket, s3.lock_prefix(&identity.stack));
        if let Some(region) = &s3.region {
            println!("  Region:   {}", region);
        }
    }
    println!("  Snapshot: {}", identity.snapshot_path().display());

    Ok(())
}

fn describe(identity: &StackIdentity) -> serde_json::Value {
    let s3 = identity.s3().map(|s3| {
        json!({
            "bucket": s3.bucket,
            "prefix": s3.prefix,
            "region": s3.region,
            "lock_prefix": s3.lock_prefix(&identity.stack),
            "config_backup_key": s3.config_backup_key(&identity.stack),
        })
    });

    json!({
        "project": identity.project_name,
        "root": identity.project_root,
        "stack": identity.stack,
        "backend": identity.backend.as_ref().map(|b| b.to_string()),
        "s3": s3,
        "snapshot": identity.snapshot_path(),
    })
}
