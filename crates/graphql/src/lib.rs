//! GraphQL-over-HTTP transport.
//!
//! Operations are plain documents with JSON variables. A [`GraphqlTransport`]
//! turns a [`GraphqlRequest`] into the response `data` object or an [`Error`];
//! [`request`] additionally decodes `data` into a typed response shape.
//!
//! Errors are never retried or translated here. Callers receive transport,
//! status and GraphQL-level failures as-is.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;

pub use config::TransportConfig;
pub use error::{Error, GraphqlErrors, Result};
pub use http::HttpTransport;
pub use request::{GraphqlErrorEntry, GraphqlRequest, GraphqlResponse, operation_name};
pub use transport::{GraphqlTransport, request};
