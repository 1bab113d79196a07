//! Access to the remote archive.
//!
//! [`DataProvider`] submits a request and yields a [`RetrievalHandle`] whose
//! bundle can be downloaded to disk. [`AdsClient`] talks to the Atmosphere
//! Data Store; tests substitute fixture providers.

pub mod ads_client;
pub mod credentials;
pub mod retriever;

pub use ads_client::{AdsClient, AdsJob};
pub use credentials::{write_credentials_file, ProviderCredentials};
pub use retriever::{RetrievalOutcome, RetrievalStrategy, Retriever};

use crate::error::Result;
use crate::models::RequestDescriptor;
use std::path::Path;

/// A completed request whose bundle is ready for download.
pub trait RetrievalHandle {
    /// Saves the bundle at `path` and returns the number of bytes written.
    fn download(&self, path: &Path) -> Result<u64>;
}

pub trait DataProvider {
    type Handle: RetrievalHandle;

    fn retrieve(&self, dataset: &str, request: &RequestDescriptor) -> Result<Self::Handle>;
}
