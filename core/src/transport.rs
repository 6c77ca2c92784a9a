//! Executing `HttpRequest` values over the network.
//!
//! # Design
//! The core never performs I/O directly; it hands a fully built
//! `HttpRequest` to a `Transport`. `UreqTransport` is the default, a blocking
//! ureq agent that returns 4xx/5xx responses as data so status
//! interpretation stays with `ResponseType`. Tests substitute their own
//! implementations.

use std::io;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// The agent keeps no response cache, and the timeout bounds the whole
/// request.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let headers = &request.headers;

        macro_rules! send {
            ($builder:expr, $finish:ident) => {{
                let mut builder = $builder;
                for (key, value) in headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.$finish()
            }};
        }

        let result = match request.method {
            HttpMethod::Get => send!(self.agent.get(url), call),
            HttpMethod::Head => send!(self.agent.head(url), call),
            HttpMethod::Delete => send!(self.agent.delete(url), call),
            HttpMethod::Options => send!(self.agent.options(url), call),
            HttpMethod::Trace => send!(self.agent.trace(url), call),
            HttpMethod::Connect => send!(self.agent.connect(url), call),
            HttpMethod::Post => send!(self.agent.post(url), send_empty),
            HttpMethod::Put => send!(self.agent.put(url), send_empty),
            HttpMethod::Patch => send!(self.agent.patch(url), send_empty),
        };

        let mut response = result.map_err(transport_error)?;
        let status = response.status().as_u16();
        // A body cut short is a failed round-trip, not an empty success.
        let body = response.body_mut().read_to_string().map_err(transport_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn transport_error(error: ureq::Error) -> TransportError {
    match error {
        ureq::Error::Timeout(_) => TransportError::TimedOut,
        ureq::Error::HostNotFound => TransportError::NotConnected,
        ureq::Error::Io(ref e) if e.kind() == io::ErrorKind::TimedOut => TransportError::TimedOut,
        ureq::Error::Io(ref e) if is_offline(e) => TransportError::NotConnected,
        other => TransportError::Other(other.to_string()),
    }
}

/// The network or the name resolver cannot be reached at all.
fn is_offline(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotConnected
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::NetworkDown
            | io::ErrorKind::HostUnreachable
    ) || error.to_string().starts_with("failed to lookup address")
}
