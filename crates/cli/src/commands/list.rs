//! list command - List objects in the bucket
//!
//! Prints every object name, optionally restricted to a prefix. Pages are
//! followed until the listing is complete.

use clap::Args;
use serde::Serialize;

use super::{StorageArgs, connect, resolve_settings};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List objects in the bucket
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list objects whose name starts with this prefix
    #[arg(value_name = "PREFIX")]
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    bucket: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<&'a str>,
    objects: &'a [String],
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the list command
pub async fn execute(args: ListArgs, storage: &StorageArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let settings = match resolve_settings(storage, &formatter) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let uploader = match connect(&settings, &formatter).await {
        Ok(u) => u,
        Err(code) => return code,
    };

    let prefix = args.filter.as_deref().filter(|p| !p.is_empty());
    match uploader.list_objects(prefix).await {
        Ok(names) => {
            print_listing(&formatter, uploader.bucket(), prefix, &names, None);
            ExitCode::Success
        }
        Err(failure) => {
            print_listing(
                &formatter,
                uploader.bucket(),
                prefix,
                &failure.partial,
                Some(failure.error.to_string()),
            );
            formatter.error(&format!(
                "Failed to list objects in {} after {} name(s): {}",
                uploader.bucket(),
                failure.partial.len(),
                failure.error
            ));
            ExitCode::from(&failure.error)
        }
    }
}

fn print_listing(
    formatter: &Formatter,
    bucket: &str,
    prefix: Option<&str>,
    names: &[String],
    error: Option<String>,
) {
    if formatter.is_json() {
        formatter.json(&ListOutput {
            bucket,
            prefix,
            objects: names,
            total: names.len(),
            error,
        });
        return;
    }

    let scope = match prefix {
        Some(p) => format!("bucket {bucket} (prefix: {p})"),
        None => format!("bucket {bucket}"),
    };

    if names.is_empty() {
        if error.is_none() {
            formatter.println(&format!("No objects found in {scope}"));
        }
        return;
    }

    formatter.println(&format!("Objects in {scope}:"));
    for line in numbered(names) {
        formatter.println(&line);
    }
    formatter.println(&format!("\nTotal: {} object(s)", names.len()));
}

/// `1. name` lines, numbered from one
fn numbered(names: &[String]) -> Vec<String> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {name}", i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered() {
        let names = vec!["a.txt".to_string(), "dir/b.txt".to_string()];
        assert_eq!(numbered(&names), vec!["1. a.txt", "2. dir/b.txt"]);
        assert!(numbered(&[]).is_empty());
    }

    #[test]
    fn test_list_output_json() {
        let names = vec!["logs/a.log".to_string()];
        let output = ListOutput {
            bucket: "b",
            prefix: Some("logs/"),
            objects: &names,
            total: 1,
            error: None,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["bucket"], "b");
        assert_eq!(json["prefix"], "logs/");
        assert_eq!(json["objects"][0], "logs/a.log");
        assert_eq!(json["total"], 1);
        assert!(json.get("error").is_none());
    }
}
