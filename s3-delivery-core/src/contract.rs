#![allow(unused)]

//! # contract: write-only object store interface
//!
//! This module defines the single trait ([`ObjectStore`]) the delivery
//! pipeline talks to. The CLI crate implements it over the AWS S3 SDK; tests
//! use the generated `MockObjectStore` to count and inspect calls.
//!
//! ## Interface
//! - Only puts are modelled. Nothing in the pipeline lists, reads or deletes.
//! - All methods are async and return a boxed [`StoreError`].
//! - Construction of an implementor must not touch the network; errors only
//!   surface when a put is attempted.

use async_trait::async_trait;
use std::path::Path;

use mockall::{automock, predicate::*};

/// Error type returned by store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Write-only access to one bucket.
///
/// The trait is `Send` + `Sync` so a single store can be shared read-only by
/// every concurrent upload of a run.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket the store writes into, used for log lines.
    fn bucket(&self) -> String;

    /// Put the contents of a local file under `key`.
    async fn put_file(&self, key: &str, path: &Path) -> Result<(), StoreError>;

    /// Put an in-memory body under `key`.
    async fn put_bytes(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError>;
}
