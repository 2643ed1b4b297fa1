//! # relwatch Lookup
//!
//! Version sources for relwatch.
//!
//! - [`GitHubSource`] lists releases with conditional requests and keeps the
//!   last full response in a [`ConditionalCache`].
//! - [`FilterPipeline`] turns fetched text into a version candidate.
//! - [`LatestVersionLookup`] and [`DeployedVersionLookup`] combine the two
//!   for a service.

mod cache;
mod deployed;
mod error;
mod filter;
mod github;
mod http;
mod latest;
mod release;
mod version;

pub use cache::ConditionalCache;
pub use deployed::{json_path, DeployedVersionLookup};
pub use error::{FilterError, LookupError};
pub use filter::{FilterPipeline, FilterStep};
pub use github::GitHubSource;
pub use http::build_client;
pub use latest::{LatestSource, LatestVersionLookup};
pub use release::Release;
pub use version::{InvalidVersion, Version};
