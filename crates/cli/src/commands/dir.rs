//! dir command - Upload a directory recursively
//!
//! Every regular file below the directory is uploaded in walk order. The
//! directory's own name becomes part of each object name.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use gsu_core::{DirectoryWalk, UploadResult};
use serde::Serialize;

use super::{StorageArgs, UploadArgs, connect, format_elapsed, resolve_settings};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload a directory recursively
#[derive(Args, Debug)]
pub struct DirArgs {
    /// Local directory to upload
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct DirOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    directory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<&'a str>,
    object_prefix: &'a str,
    files: &'a [UploadResult],
    total: usize,
    total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration_days: Option<u32>,
    elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the dir command
pub async fn execute(
    args: DirArgs,
    storage: &StorageArgs,
    upload: &UploadArgs,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let settings = match resolve_settings(storage, &formatter) {
        Ok(s) => s,
        Err(code) => return code,
    };

    if let Err(code) = check_local_dir(&args.path, &formatter) {
        return code;
    }

    // The walk is lazy; building it only resolves the object name prefix
    let object_prefix = match DirectoryWalk::new(&args.path, upload.prefix.as_deref()) {
        Ok(walk) => walk.prefix().to_string(),
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
    let progress = ProgressBar::spinner(output_config, &format!("Uploading {}", args.path.display()));
    let outcome = uploader
        .upload_directory(
            &args.path,
            upload.prefix.as_deref(),
            upload.expiration,
            |result| {
                progress.println(&format!(
                    "Uploaded: {} -> {}",
                    result.local_path.display(),
                    result.url
                ));
                progress.set_message(&result.object_name);
            },
        )
        .await;
    progress.finish_and_clear();

    let (results, error) = match outcome {
        Ok(results) => (results, None),
        Err(failure) => (failure.partial, Some(failure.error)),
    };

    let summary = Summary {
        bucket: uploader.bucket(),
        directory: &args.path,
        prefix: upload.prefix.as_deref(),
        object_prefix: &object_prefix,
        expiration_days: upload.expiration,
        results: &results,
        start,
    };

    match error {
        None => {
            if results.is_empty() {
                formatter.warning(&format!("No files found in {}", args.path.display()));
            }
            summary.print(&formatter, None);
            ExitCode::Success
        }
        Some(e) => {
            summary.print(&formatter, Some(e.to_string()));
            formatter.error(&format!(
                "Directory upload stopped after {} file(s): {e}",
                results.len()
            ));
            ExitCode::from(&e)
        }
    }
}

/// Reject missing paths and plain files before anything is sent
fn check_local_dir(path: &std::path::Path, formatter: &Formatter) -> Result<(), ExitCode> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => {
            formatter.error(&format!(
                "{} is not a directory, use the 'file' command to upload a file",
                path.display()
            ));
            Err(ExitCode::UsageError)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            formatter.error(&format!("Directory not found: {}", path.display()));
            Err(ExitCode::NotFound)
        }
        Err(e) => {
            formatter.error(&format!("Cannot access directory {}: {e}", path.display()));
            Err(ExitCode::UsageError)
        }
    }
}

struct Summary<'a> {
    bucket: &'a str,
    directory: &'a std::path::Path,
    /// The --prefix option as given
    prefix: Option<&'a str>,
    /// What every object name starts with: the prefix plus the directory name
    object_prefix: &'a str,
    expiration_days: u32,
    results: &'a [UploadResult],
    start: Instant,
}

impl Summary<'_> {
    fn total_size(&self) -> u64 {
        self.results.iter().map(|r| r.size).sum()
    }

    fn print(&self, formatter: &Formatter, error: Option<String>) {
        let elapsed = self.start.elapsed();

        if formatter.is_json() {
            formatter.json(&DirOutput {
                status: if error.is_none() { "success" } else { "partial" },
                bucket: self.bucket,
                directory: self.directory.display().to_string(),
                prefix: self.prefix,
                object_prefix: self.object_prefix,
                files: self.results,
                total: self.results.len(),
                total_size: self.total_size(),
                expiration_days: (self.expiration_days > 0).then_some(self.expiration_days),
                elapsed_ms: elapsed.as_millis(),
                error,
            });
            return;
        }

        if error.is_none() {
            formatter.success("Directory uploaded");
        }
        for (label, value) in self.fields() {
            formatter.field(label, value);
        }
        formatter.field("Elapsed", format_elapsed(elapsed));
    }

    /// Human summary lines, without the elapsed time
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Directory", self.directory.display().to_string()),
            ("Bucket", self.bucket.to_string()),
        ];
        if let Some(prefix) = self.prefix {
            fields.push(("Prefix", prefix.to_string()));
        }
        fields.push(("Objects", format!("{}*", self.object_prefix)));
        fields.push((
            "Files",
            format!(
                "{} ({})",
                self.results.len(),
                humansize::format_size(self.total_size(), humansize::BINARY)
            ),
        ));
        if self.expiration_days > 0 {
            fields.push(("Expires", format!("in {} day(s)", self.expiration_days)));
        }
        fields
    }
}
