//! file command - Upload a single file
//!
//! Uploads one local file, optionally under a prefix and with an expiration
//! marker, and prints the public URL of the new object.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use gsu_core::naming::file_object_name;
use gsu_core::UploadResult;
use serde::Serialize;

use super::{StorageArgs, UploadArgs, connect, format_elapsed, resolve_settings};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Upload a single file
#[derive(Args, Debug)]
pub struct FileArgs {
    /// Local file to upload
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct FileOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    #[serde(flatten)]
    result: &'a UploadResult,
    elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the file command
pub async fn execute(
    args: FileArgs,
    storage: &StorageArgs,
    upload: &UploadArgs,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let settings = match resolve_settings(storage, &formatter) {
        Ok(s) => s,
        Err(code) => return code,
    };

    if let Err(code) = check_local_file(&args.path, &formatter) {
        return code;
    }

    let object_name = match file_object_name(upload.prefix.as_deref(), &args.path) {
        Ok(name) => name,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let uploader = match connect(&settings, &formatter).await {
        Ok(u) => u,
        Err(code) => return code,
    };

    let start = Instant::now();
    match uploader
        .upload_file(&args.path, &object_name, upload.expiration)
        .await
    {
        Ok(result) => {
            print_result(&formatter, uploader.bucket(), &result, start, None);
            ExitCode::Success
        }
        Err(failure) => {
            if let Some(result) = &failure.partial {
                print_result(
                    &formatter,
                    uploader.bucket(),
                    result,
                    start,
                    Some(failure.error.to_string()),
                );
                formatter.error(&format!(
                    "Uploaded {} but failed to set expiration: {}",
                    result.object_name, failure.error
                ));
            } else {
                formatter.error(&format!(
                    "Failed to upload {}: {}",
                    args.path.display(),
                    failure.error
                ));
            }
            ExitCode::from(&failure.error)
        }
    }
}

/// Reject missing paths and directories before anything is sent
fn check_local_file(path: &std::path::Path, formatter: &Formatter) -> Result<(), ExitCode> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => {
            formatter.error(&format!(
                "{} is a directory, use the 'dir' command to upload a directory",
                path.display()
            ));
            Err(ExitCode::UsageError)
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            formatter.error(&format!("File not found: {}", path.display()));
            Err(ExitCode::NotFound)
        }
        Err(e) => {
            formatter.error(&format!("Cannot access file {}: {e}", path.display()));
            Err(ExitCode::UsageError)
        }
    }
}

fn print_result(
    formatter: &Formatter,
    bucket: &str,
    result: &UploadResult,
    start: Instant,
    error: Option<String>,
) {
    let elapsed = start.elapsed();

    if formatter.is_json() {
        formatter.json(&FileOutput {
            status: if error.is_none() { "success" } else { "partial" },
            bucket,
            result,
            elapsed_ms: elapsed.as_millis(),
            error,
        });
        return;
    }

    formatter.success("File uploaded");
    formatter.field("File", result.local_path.display());
    formatter.field("Bucket", bucket);
    formatter.field("Object", &result.object_name);
    formatter.field("URL", &result.url);
    formatter.field(
        "Size",
        format!(
            "{} ({} bytes)",
            humansize::format_size(result.size, humansize::BINARY),
            result.size
        ),
    );
    formatter.field("Type", &result.mime_type);
    if let Some(at) = result.expiration {
        formatter.field("Expires", at);
    }
    formatter.field("Elapsed", format_elapsed(elapsed));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_formatter() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_check_local_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert_eq!(
            check_local_file(&missing, &quiet_formatter()).unwrap_err(),
            ExitCode::NotFound
        );
    }

    #[test]
    fn test_check_local_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            check_local_file(dir.path(), &quiet_formatter()).unwrap_err(),
            ExitCode::UsageError
        );
    }

    #[test]
    fn test_check_local_file_regular() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();
        assert!(check_local_file(&file, &quiet_formatter()).is_ok());
    }

    #[test]
    fn test_file_output_json_shape() {
        let result = UploadResult {
            local_path: PathBuf::from("notes.txt"),
            object_name: "backups/notes.txt".into(),
            url: "https://storage.googleapis.com/b/backups/notes.txt".into(),
            size: 5,
            mime_type: "text/plain".into(),
            expiration: None,
        };
        let output = FileOutput {
            status: "success",
            bucket: "b",
            result: &result,
            elapsed_ms: 12,
            error: None,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["object_name"], "backups/notes.txt");
        assert_eq!(json["size"], 5);
        assert!(json.get("expiration").is_none());
        assert!(json.get("error").is_none());
    }
}
