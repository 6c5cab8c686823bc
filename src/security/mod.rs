//! Security utilities: credential handling and SSRF validation.
//!
//! `UrlValidator` itself lives in [`crate::traits::crawler`] alongside the
//! `Crawler`/`Ingestor` types it validates; this module holds the
//! orthogonal concern of keeping secrets out of logs.

pub mod credentials;

pub use credentials::{AICredentials, SecretString};
