///
/// This module implements the CLI interface for s3-delivery: command parsing,
/// argument validation, and the async entrypoint used by `main` and the tests.
///
/// All delivery logic (prefixes, workbook expansion, the upload pool) lives in
/// the `s3-delivery-core` crate. This module only resolves credentials, builds
/// the S3 client and hands over to the core pipeline.
///
/// ## Commands
/// - `upload <dataset> <path>`: deliver a file or a folder into a dataset.
/// - `upload-dashboard`: deliver the predefined dashboard workbooks.
///
/// ## Exit status
/// [`run`] only fails when credentials cannot be loaded. Failed uploads are
/// logged and do not change the exit status.
use crate::load_config::{load_credentials, CONFIG_FILE};
use crate::upload::S3Client;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Args, Parser, Subcommand};
use s3_delivery_core::dashboard::{dashboard_files, deliver_dashboard};
use s3_delivery_core::dataset::Dataset;
use s3_delivery_core::delivery::{deliver_path, DeliveryOptions, DEFAULT_PROCESSES};
use s3_delivery_core::prefix::KeyPrefix;
use std::path::PathBuf;

/// Deliver Atlanta GA files to the dedicated Symphony S3 bucket.
#[derive(Parser, Debug)]
#[clap(
    name = "s3-delivery",
    version,
    about = "Deliver Atlanta GA files to the dedicated Symphony S3 bucket"
)]
pub struct Cli {
    /// Enable verbose logging
    #[clap(long, short, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a file or folder to a dataset's folder in the bucket, using credentials from S3.ini.
    ///
    /// Excel workbooks (.xlsx, .xls) are converted to one CSV per non-empty sheet.
    Upload {
        /// Dataset to deliver into
        #[clap(value_parser = dataset_parser())]
        dataset: Dataset,

        /// File or folder to upload
        #[clap(value_parser = existing_path)]
        path: PathBuf,

        #[clap(flatten)]
        options: UploadArgs,
    },
    /// Upload the predefined dashboard workbooks to their respective datasets.
    UploadDashboard {
        #[clap(flatten)]
        options: UploadArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Number of concurrent uploads for plain files
    #[clap(long, short, default_value_t = DEFAULT_PROCESSES, value_parser = parse_processes)]
    pub processes: usize,

    /// Log what would be uploaded without uploading anything
    #[clap(long, short = 'n')]
    pub dry_run: bool,
}

impl From<UploadArgs> for DeliveryOptions {
    fn from(args: UploadArgs) -> Self {
        DeliveryOptions {
            processes: args.processes,
            dry_run: args.dry_run,
        }
    }
}

fn dataset_parser() -> impl TypedValueParser<Value = Dataset> {
    PossibleValuesParser::new(Dataset::names()).try_map(|name| name.parse::<Dataset>())
}

fn existing_path(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("path '{raw}' does not exist"))
    }
}

fn parse_processes(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Async CLI entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<()> {
    // Captured once so every key of this run shares one delivery-date partition.
    let delivery_date: NaiveDate = Local::now().date_naive();

    match cli.command {
        Commands::Upload {
            dataset,
            path,
            options,
        } => {
            let store = connect()?;
            let prefix = KeyPrefix::new(dataset, delivery_date);
            tracing::info!(command = "upload", %dataset, path = %path.display(), %prefix, "Starting delivery");
            deliver_path(&store, &prefix, &path, &options.into()).await;
        }
        Commands::UploadDashboard { options } => {
            let store = connect()?;
            tracing::info!(command = "upload-dashboard", "Starting delivery");
            deliver_dashboard(&store, &dashboard_files(), delivery_date, &options.into()).await;
        }
    }

    Ok(())
}

fn connect() -> Result<S3Client> {
    let credentials = load_credentials(CONFIG_FILE)?;
    Ok(S3Client::new(&credentials))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_with_defaults() {
        let cli = Cli::try_parse_from(["s3-delivery", "upload", "winistry", "."]).unwrap();
        match cli.command {
            Commands::Upload {
                dataset, options, ..
            } => {
                assert_eq!(dataset, Dataset::Winistry);
                assert_eq!(options.processes, 3);
                assert!(!options.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn parses_dashboard_with_short_flags() {
        let cli =
            Cli::try_parse_from(["s3-delivery", "-v", "upload-dashboard", "-p", "7", "-n"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::UploadDashboard { options } => {
                assert_eq!(options.processes, 7);
                assert!(options.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_dataset_missing_path_and_zero_processes() {
        assert!(Cli::try_parse_from(["s3-delivery", "upload", "marketing", "."]).is_err());
        assert!(
            Cli::try_parse_from(["s3-delivery", "upload", "sparkloft", "/no/such/path/here"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["s3-delivery", "upload", "sparkloft", ".", "--processes", "0"])
                .is_err()
        );
    }
}
