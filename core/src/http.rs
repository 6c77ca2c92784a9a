//! HTTP transport types and response classification.
//!
//! # Design
//! Requests and responses are plain data. `HttpClient::build_request`
//! produces an `HttpRequest`; a `Transport` turns it into an `HttpResponse`
//! (or a `TransportError`), and `ResponseType` classifies the outcome. None of
//! these types touch the network, so every step is testable in isolation.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

use crate::error::TransportError;

/// HTTP method for a request (RFC 7231 section 4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Options,
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Trace,
    Connect,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` already carries the encoded query string.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Insert a header, replacing any existing value for the same name.
    pub(crate) fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }
}

/// An HTTP response described as plain data. Only the status and the body
/// feed classification and decoding.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// A request target: a URL plus the headers it needs.
pub trait Routable {
    fn url(&self) -> Url;
    fn extra_http_headers(&self) -> BTreeMap<String, String>;
}

/// A raw URL is routable with no extra headers.
impl Routable for Url {
    fn url(&self) -> Url {
        self.clone()
    }

    fn extra_http_headers(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// Closed classification of an HTTP status or transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// Any 2xx status.
    Succeed,
    BadRequest,
    Unauthorized,
    UpgradeRequired,
    Forbidden,
    Gone,
    /// The client cancelled the request.
    Canceled,
    Unprocessable,
    NotFound,
    UnknownError,
    /// No response arrived before the client-side timeout.
    ClientTimeOut,
    /// The device has no network connection.
    NotConnected,
    Conflict,
    InternalError,
    BadGateway,
    ServiceUnavailable,
    RequestTimeOut,
    GatewayTimeOut,
}

impl ResponseType {
    /// Classify an HTTP status code. Total: unlisted codes are `UnknownError`.
    pub fn from_status(code: u16) -> Self {
        match code {
            200..=299 => ResponseType::Succeed,
            400 => ResponseType::BadRequest,
            401 => ResponseType::Unauthorized,
            403 => ResponseType::Forbidden,
            404 => ResponseType::NotFound,
            408 => ResponseType::RequestTimeOut,
            409 => ResponseType::Conflict,
            410 => ResponseType::Gone,
            422 => ResponseType::Unprocessable,
            426 => ResponseType::UpgradeRequired,
            500 => ResponseType::InternalError,
            502 => ResponseType::BadGateway,
            503 => ResponseType::ServiceUnavailable,
            504 => ResponseType::GatewayTimeOut,
            _ => ResponseType::UnknownError,
        }
    }

    /// Classify a transport failure. A failure without a dedicated kind means
    /// no response was received, which counts as a 500.
    pub fn from_transport(error: &TransportError) -> Self {
        match error {
            TransportError::Cancelled => ResponseType::Canceled,
            TransportError::TimedOut => ResponseType::ClientTimeOut,
            TransportError::NotConnected => ResponseType::NotConnected,
            TransportError::Other(_) => ResponseType::from_status(500),
        }
    }

    pub fn is_success(&self) -> bool {
        *self == ResponseType::Succeed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_2xx_status_succeeds() {
        for code in 200..300 {
            assert_eq!(ResponseType::from_status(code), ResponseType::Succeed, "{code}");
        }
    }

    #[test]
    fn table_statuses_map_to_their_kind() {
        let table = [
            (400, ResponseType::BadRequest),
            (401, ResponseType::Unauthorized),
            (403, ResponseType::Forbidden),
            (404, ResponseType::NotFound),
            (408, ResponseType::RequestTimeOut),
            (409, ResponseType::Conflict),
            (410, ResponseType::Gone),
            (422, ResponseType::Unprocessable),
            (426, ResponseType::UpgradeRequired),
            (500, ResponseType::InternalError),
            (502, ResponseType::BadGateway),
            (503, ResponseType::ServiceUnavailable),
            (504, ResponseType::GatewayTimeOut),
        ];
        for (code, kind) in table {
            assert_eq!(ResponseType::from_status(code), kind, "{code}");
        }
    }

    #[test]
    fn unlisted_statuses_are_unknown() {
        for code in [0, 100, 199, 300, 302, 402, 405, 429, 501, 599, 999] {
            assert_eq!(ResponseType::from_status(code), ResponseType::UnknownError, "{code}");
        }
    }

    #[test]
    fn transport_failures_map_to_their_kind() {
        assert_eq!(ResponseType::from_transport(&TransportError::Cancelled), ResponseType::Canceled);
        assert_eq!(ResponseType::from_transport(&TransportError::TimedOut), ResponseType::ClientTimeOut);
        assert_eq!(
            ResponseType::from_transport(&TransportError::NotConnected),
            ResponseType::NotConnected
        );
        assert_eq!(
            ResponseType::from_transport(&TransportError::Other("reset".into())),
            ResponseType::InternalError
        );
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut request = HttpRequest {
            method: HttpMethod::Get,
            url: "https://test.com".into(),
            headers: vec![("user-agent".into(), "old".into())],
        };
        request.set_header("User-Agent", "new");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header("USER-AGENT"), Some("new"));
    }

    #[test]
    fn url_is_routable_without_headers() {
        let url = Url::parse("https://test.com/path").unwrap();
        assert_eq!(url.url().as_str(), "https://test.com/path");
        assert!(url.extra_http_headers().is_empty());
    }
}
