//! expire command - Set an object's expiration marker
//!
//! Writes `expiration = now + DAYS` into the object's custom metadata.
//! Nothing deletes the object when the date passes; that is left to
//! whatever process reads the marker.

use clap::Args;
use gsu_core::expiration::validate_days;
use serde::Serialize;

use super::{StorageArgs, connect, resolve_settings};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Set an object to expire a number of days from now
#[derive(Args, Debug)]
pub struct ExpireArgs {
    /// Object name in the bucket
    pub object: String,

    /// Days from now until the object expires (must be positive)
    #[arg(allow_negative_numbers = true)]
    pub days: i64,
}

#[derive(Debug, Serialize)]
struct ExpireOutput<'a> {
    status: &'static str,
    bucket: &'a str,
    object: &'a str,
    days: u32,
    expiration: String,
}

/// Execute the expire command
pub async fn execute(args: ExpireArgs, storage: &StorageArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    // Bad input is rejected before any connection is made
    let days = match validate_days(args.days) {
        Ok(d) => d,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };
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

    match uploader.set_expiration(&args.object, args.days).await {
        Ok(at) => {
            if formatter.is_json() {
                formatter.json(&ExpireOutput {
                    status: "success",
                    bucket: uploader.bucket(),
                    object: &args.object,
                    days,
                    expiration: at.to_string(),
                });
            } else {
                formatter.success(&format!(
                    "Expiration of {} set to {days} day(s) from now",
                    args.object
                ));
                formatter.field("Expires", at);
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to set expiration of {}: {e}", args.object));
            ExitCode::from(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Cli;
    use clap::Parser;

    #[test]
    fn test_parse_negative_days() {
        let cli = Cli::try_parse_from(["gsupload", "expire", "a.txt", "-3"]).unwrap();
        match cli.command {
            crate::commands::Commands::Expire(args) => {
                assert_eq!(args.object, "a.txt");
                assert_eq!(args.days, -3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_numeric_days() {
        assert!(Cli::try_parse_from(["gsupload", "expire", "a.txt", "soon"]).is_err());
    }
}
