//! Transport module - requests to the deals service.
//!
//! Provides:
//! - [`Operation`] / [`DealsRequest`] - what to send
//! - [`Transport`] - the seam the load phases drive
//! - [`HttpTransport`] - `reqwest` over a random-choice [`EndpointPool`]

mod http;
mod operation;

use std::future::Future;
use std::pin::Pin;

pub use http::{Endpoint, EndpointPool, HttpTransport, CONTENT_TYPE_TEXT};
pub use operation::{DealsRequest, Operation, ServiceResponse};

use crate::error::Result;

/// Boxed future returned by [`Transport::send`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends one request and waits for the full response.
pub trait Transport: Send + Sync {
    /// Send `request` and read the whole response body.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    fn send<'a>(&'a self, request: &'a DealsRequest) -> BoxFuture<'a, Result<ServiceResponse>>;
}
