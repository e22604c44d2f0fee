//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.
//! Every storage command follows the same shape: check local input, resolve
//! the connection settings, build the client, run one operation, print.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gsu_core::{ConnectionSettings, StorageConfig, Uploader};
use gsu_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod completions;
mod delete;
mod dir;
mod expire;
mod file;
mod info;
mod list;

/// gsupload - upload files to cloud object storage
///
/// Uploads files and directories to a bucket, lists and deletes objects,
/// shows object metadata and tags objects with an expiration date.
#[derive(Parser, Debug)]
#[command(name = "gsupload")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    #[command(flatten)]
    pub upload: UploadArgs,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to connect and which bucket to use
#[derive(Args, Debug, Clone, Default)]
pub struct StorageArgs {
    /// Bucket name (required for every storage command)
    #[arg(short, long, global = true, env = "GSUPLOAD_BUCKET")]
    pub bucket: Option<String>,

    /// Credentials file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true, env = "GSUPLOAD_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Storage endpoint URL [default: https://storage.googleapis.com]
    #[arg(long, global = true, env = "GSUPLOAD_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Signing region [default: auto]
    #[arg(long, global = true, env = "GSUPLOAD_REGION")]
    pub region: Option<String>,

    /// Base URL for printed object links [default: the endpoint]
    #[arg(long, global = true)]
    pub public_url: Option<String>,
}

/// Options that shape uploads
#[derive(Args, Debug, Clone, Default)]
pub struct UploadArgs {
    /// Expiration in days for uploaded objects (0 = no expiration)
    #[arg(short, long, global = true, default_value_t = 0)]
    pub expiration: u32,

    /// Prefix for object names in the bucket
    #[arg(short, long, global = true)]
    pub prefix: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a single file
    File(file::FileArgs),

    /// Upload a directory recursively
    Dir(dir::DirArgs),

    /// List objects in the bucket
    List(list::ListArgs),

    /// Delete an object
    Delete(delete::DeleteArgs),

    /// Show object metadata
    Info(info::InfoArgs),

    /// Set an object to expire a number of days from now
    Expire(expire::ExpireArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::File(args) => file::execute(args, &cli.storage, &cli.upload, output_config).await,
        Commands::Dir(args) => dir::execute(args, &cli.storage, &cli.upload, output_config).await,
        Commands::List(args) => list::execute(args, &cli.storage, output_config).await,
        Commands::Delete(args) => delete::execute(args, &cli.storage, output_config).await,
        Commands::Info(args) => info::execute(args, &cli.storage, output_config).await,
        Commands::Expire(args) => expire::execute(args, &cli.storage, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Resolve connection settings from flags, environment and credentials file
///
/// Purely local: nothing is sent to the service.
fn resolve_settings(
    storage: &StorageArgs,
    formatter: &Formatter,
) -> Result<ConnectionSettings, ExitCode> {
    let Some(bucket) = storage.bucket.as_deref().filter(|b| !b.is_empty()) else {
        formatter.error("A bucket is required: pass --bucket or set GSUPLOAD_BUCKET");
        return Err(ExitCode::UsageError);
    };

    let mut config = StorageConfig::new(bucket);
    if let Some(path) = &storage.credentials {
        config = config.credentials_path(path);
    }
    if let Some(endpoint) = &storage.endpoint {
        config = config.endpoint(endpoint);
    }
    if let Some(region) = &storage.region {
        config = config.region(region);
    }
    if let Some(base) = &storage.public_url {
        config = config.public_url(base);
    }

    let settings = config.resolve().map_err(|e| {
        formatter.error(&format!("Invalid configuration: {e}"));
        ExitCode::from(&e)
    })?;
    tracing::debug!(
        bucket = %settings.bucket,
        endpoint = %settings.endpoint,
        credentials_file = settings.credentials.is_some(),
        "settings resolved"
    );
    Ok(settings)
}

/// Build an uploader bound to the configured bucket
async fn connect(
    settings: &ConnectionSettings,
    formatter: &Formatter,
) -> Result<Uploader<S3Client>, ExitCode> {
    match S3Client::new(settings).await {
        Ok(client) => Ok(Uploader::from_settings(client, settings)),
        Err(e) => {
            formatter.error(&format!("Failed to create storage client: {e}"));
            Err(ExitCode::from(&e))
        }
    }
}

/// Elapsed time as shown in human output, e.g. `1.23s`
fn format_elapsed(elapsed: std::time::Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gsupload", "file", "notes.txt", "-b", "bucket", "-e", "7", "-p", "backups",
        ])
        .unwrap();
        assert_eq!(cli.storage.bucket.as_deref(), Some("bucket"));
        assert_eq!(cli.upload.expiration, 7);
        assert_eq!(cli.upload.prefix.as_deref(), Some("backups"));
        assert!(matches!(cli.command, Commands::File(_)));
    }

    #[test]
    fn test_parse_global_flags_before_subcommand() {
        let cli = Cli::try_parse_from(["gsupload", "-b", "bucket", "--json", "list"]).unwrap();
        assert_eq!(cli.storage.bucket.as_deref(), Some("bucket"));
        assert!(cli.json);
        assert_eq!(cli.upload.expiration, 0);
    }

    #[test]
    fn test_parse_rejects_malformed_expiration() {
        assert!(Cli::try_parse_from(["gsupload", "-e", "soon", "file", "a.txt"]).is_err());
        assert!(Cli::try_parse_from(["gsupload", "-e", "-3", "file", "a.txt"]).is_err());
    }

    #[test]
    fn test_resolve_settings_requires_bucket() {
        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        let storage = StorageArgs::default();
        assert_eq!(
            resolve_settings(&storage, &formatter).unwrap_err(),
            ExitCode::UsageError
        );
    }

    #[test]
    fn test_resolve_settings_applies_flags() {
        let formatter = Formatter::default();
        let storage = StorageArgs {
            bucket: Some("media".into()),
            endpoint: Some("http://localhost:9000".into()),
            region: Some("us-east-1".into()),
            public_url: Some("https://cdn.example.com".into()),
            ..Default::default()
        };
        let settings = resolve_settings(&storage, &formatter).unwrap();
        assert_eq!(settings.bucket, "media");
        assert_eq!(settings.region, "us-east-1");
        assert_eq!(settings.endpoint.as_str(), "http://localhost:9000/");
        assert_eq!(settings.public_base.as_str(), "https://cdn.example.com/");
        assert!(settings.credentials.is_none());
    }

    #[test]
    fn test_resolve_settings_missing_credentials_file() {
        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        let storage = StorageArgs {
            bucket: Some("media".into()),
            credentials: Some(PathBuf::from("/nonexistent/gsupload-credentials.toml")),
            ..Default::default()
        };
        assert_eq!(
            resolve_settings(&storage, &formatter).unwrap_err(),
            ExitCode::UsageError
        );
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(std::time::Duration::from_millis(1234)), "1.23s");
        assert_eq!(format_elapsed(std::time::Duration::ZERO), "0.00s");
    }
}
