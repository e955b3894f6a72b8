//! Command-line front end for delivering files into the shared S3 bucket.
//!
//! Business logic lives in `s3-delivery-core`; this crate holds the CLI glue,
//! credential loading, the S3 client and logging setup.

pub mod cli;
pub mod load_config;
pub mod telemetry;
pub mod upload;
