#![doc = "s3-delivery-core: core logic for delivering files into dataset folders of the shared bucket."]

//! This crate holds the delivery pipeline: dataset identifiers, key prefixes,
//! workbook expansion, single-object uploads and the batch orchestrator.
//! The concrete S3 client and the command line live in the `s3-delivery` crate;
//! everything here talks to storage through [`contract::ObjectStore`].

pub mod contract;
pub mod dashboard;
pub mod dataset;
pub mod delivery;
pub mod discover;
pub mod prefix;
pub mod uploader;
pub mod workbook;
