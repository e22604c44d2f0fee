//! info command - Show object metadata
//!
//! Displays the stored attributes of an object, its custom metadata, and
//! the expiration marker when one is set.

use clap::Args;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use gsu_core::ObjectMetadata;
use jiff::Timestamp;
use serde::Serialize;

use super::{StorageArgs, connect, resolve_settings};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show object metadata
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Object name in the bucket
    pub object: String,
}

#[derive(Debug, Serialize)]
struct InfoOutput<'a> {
    #[serde(flatten)]
    object: &'a ObjectMetadata,
    size_human: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration: Option<&'a str>,
}

/// Execute the info command
pub async fn execute(args: InfoArgs, storage: &StorageArgs, output_config: OutputConfig) -> ExitCode {
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

    match uploader.object_metadata(&args.object).await {
        Ok(info) => {
            if formatter.is_json() {
                formatter.json(&InfoOutput {
                    object: &info,
                    size_human: info.size_human(),
                    expiration: info.expiration(),
                });
            } else {
                print_human(&formatter, &info);
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to get metadata of {}: {e}", args.object));
            ExitCode::from(&e)
        }
    }
}

fn print_human(formatter: &Formatter, info: &ObjectMetadata) {
    formatter.field("Name", &info.name);
    formatter.field("Bucket", &info.bucket);
    formatter.field("Size", format!("{} bytes ({})", info.size, info.size_human()));
    formatter.field("Type", info.content_type.as_deref().unwrap_or("-"));
    formatter.field("Created", format_time(info.created));
    formatter.field("Updated", format_time(info.updated));
    if let Some(generation) = &info.generation {
        formatter.field("Generation", generation);
    }
    if let Some(etag) = &info.etag {
        formatter.field("ETag", etag);
    }
    if let Some(class) = &info.storage_class {
        formatter.field("Class", class);
    }

    if info.metadata.is_empty() {
        formatter.field("Metadata", "(none)");
    } else {
        formatter.println("Metadata  :");
        formatter.println(&metadata_table(info).to_string());
    }

    formatter.field("Expiration", info.expiration().unwrap_or("not set"));
}

fn format_time(ts: Option<Timestamp>) -> String {
    ts.map(|t| t.strftime("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn metadata_table(info: &ObjectMetadata) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Key", "Value"]);
    for (key, value) in &info.metadata {
        table.add_row(vec![key.as_str(), value.as_str()]);
    }
    table
}
