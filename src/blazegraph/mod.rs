//! Blazegraph namespace management over HTTP.

pub mod client;
pub mod namespace;
pub mod properties;

pub use client::{http_client, BlazegraphClient, ConnectionTarget, ProbeOutcome};
pub use namespace::{parse_namespace_list, NamespaceParseError};
