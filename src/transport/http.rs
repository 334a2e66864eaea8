//! HTTP transport over a pool of service instances.
//!
//! Each request goes to one endpoint picked uniformly at random from the
//! pool, so a fleet of instances can be loaded without a balancer in front.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use super::{BoxFuture, DealsRequest, ServiceResponse, Transport};
use crate::error::{DealsError, Result};

/// Content type the service expects on every request.
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// One service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `http://host:port`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Non-empty set of endpoints.
#[derive(Debug, Clone)]
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
}

impl EndpointPool {
    /// Create a pool.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `endpoints` is empty.
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(DealsError::InvalidConfig(
                "endpoint pool is empty".to_string(),
            ));
        }
        Ok(Self { endpoints })
    }

    /// One host, several ports.
    pub fn with_ports(host: &str, ports: &[u16]) -> Result<Self> {
        Self::new(ports.iter().map(|&port| Endpoint::new(host, port)).collect())
    }

    /// Pick an endpoint uniformly at random.
    pub fn choose(&self) -> &Endpoint {
        let index = rand::thread_rng().gen_range(0..self.endpoints.len());
        &self.endpoints[index]
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    pool: EndpointPool,
}

impl HttpTransport {
    /// Create a transport with a per-request timeout.
    ///
    /// Proxy settings from the environment are ignored; the harness talks
    /// to the instances directly.
    pub fn new(pool: EndpointPool, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client, pool })
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    async fn send_to(&self, endpoint: Endpoint, request: &DealsRequest) -> Result<ServiceResponse> {
        let operation = request.operation();
        let url = format!("{}{}", endpoint.base_url(), operation.path());

        let mut builder = self
            .client
            .request(operation.method(), &url)
            .query(request.query())
            .header(CONTENT_TYPE, CONTENT_TYPE_TEXT);

        if let Some(body) = request.body() {
            builder = builder
                .header(CONTENT_LENGTH, body.len())
                .body(body.clone());
        }

        tracing::debug!("{} {} -> {}", operation.method(), operation.path(), endpoint);

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} {}: STATUS {}", operation, endpoint, status.as_u16());
        }

        // The body is read even for error statuses.
        let body = response.bytes().await?;

        Ok(ServiceResponse {
            status: status.as_u16(),
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: &'a DealsRequest) -> BoxFuture<'a, Result<ServiceResponse>> {
        let endpoint = self.pool.choose().clone();
        Box::pin(self.send_to(endpoint, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty_pool_rejected() {
        let err = EndpointPool::new(Vec::new()).unwrap_err();
        assert!(matches!(err, DealsError::InvalidConfig(_)));

        let err = EndpointPool::with_ports("127.0.0.1", &[]).unwrap_err();
        assert!(matches!(err, DealsError::InvalidConfig(_)));
    }

    #[test]
    fn test_single_endpoint_always_chosen() {
        let pool = EndpointPool::with_ports("127.0.0.1", &[5000]).unwrap();
        for _ in 0..100 {
            assert_eq!(pool.choose(), &Endpoint::new("127.0.0.1", 5000));
        }
    }

    #[test]
    fn test_choose_covers_pool() {
        let pool = EndpointPool::with_ports("10.0.0.1", &[5000, 5001, 5002]).unwrap();
        let seen: HashSet<u16> = (0..1000).map(|_| pool.choose().port).collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_endpoint_urls() {
        let endpoint = Endpoint::new("deals", 8090);
        assert_eq!(endpoint.base_url(), "http://deals:8090");
        assert_eq!(endpoint.to_string(), "deals:8090");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let pool = EndpointPool::with_ports("127.0.0.1", &[port]).unwrap();
        let transport = HttpTransport::new(pool, Duration::from_secs(2)).unwrap();

        let err = transport
            .send(&DealsRequest::top("MOW"))
            .await
            .unwrap_err();
        assert!(matches!(err, DealsError::Transport(_)));
    }
}
