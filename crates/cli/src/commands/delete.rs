//! delete command - Delete an object

use clap::Args;
use serde::Serialize;

use super::{StorageArgs, connect, resolve_settings};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Delete an object
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Object name in the bucket
    pub object: String,
}

#[derive(Debug, Serialize)]
struct DeleteOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    object: &'a str,
}

/// Execute the delete command
pub async fn execute(args: DeleteArgs, storage: &StorageArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if args.object.is_empty() {
        formatter.error("Object name cannot be empty");
        return ExitCode::UsageError;
    }

    let settings = match resolve_settings(storage, &formatter) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let uploader = match connect(&settings, &formatter).await {
        Ok(u) => u,
        Err(code) => return code,
    };

    match uploader.delete_object(&args.object).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&DeleteOutput {
                    status: "success",
                    bucket: uploader.bucket(),
                    object: &args.object,
                });
            } else {
                formatter.success(&format!(
                    "Deleted {} from bucket {}",
                    args.object,
                    uploader.bucket()
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to delete {}: {e}", args.object));
            ExitCode::from(&e)
        }
    }
}
