//! Request pipeline: build, execute, classify, decode, dispatch.
//!
//! # Design
//! `HttpClient` holds only shared, read-only collaborators: the `Transport`
//! that performs I/O and the `Dispatcher` that decides where completions run.
//! Building a request (`build_request`) and interpreting its outcome
//! (`decode_outcome`) are pure, so they are tested without a network.
//! `request` glues them together on a worker thread and guarantees the
//! completion runs exactly once, even if the transport panics.

use std::collections::BTreeMap;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::dispatch::{Dispatcher, InlineDispatcher};
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ResponseType, Routable};
use crate::transport::{Transport, UreqTransport};

/// Identifies this SDK to the server: `<sdk>:<platform>::<version>`.
pub const USER_AGENT: &str = concat!("lyft-mobile-sdk:rust::", env!("CARGO_PKG_VERSION"));

/// Query parameters. Keys are kept sorted; array values expand into one
/// `key=value` pair per element.
pub type Parameters = BTreeMap<String, Value>;

/// Stateless HTTP client shared by every API call.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl HttpClient {
    /// Completions run inline on the worker thread unless a dispatcher is
    /// installed with `with_dispatcher`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            dispatcher: Arc::new(InlineDispatcher),
        }
    }

    /// Client backed by a `UreqTransport` with the given request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(Arc::new(UreqTransport::new(timeout)))
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher> {
        &self.dispatcher
    }

    pub fn build_request<R: Routable + ?Sized>(
        &self,
        method: HttpMethod,
        route: &R,
        parameters: Option<&Parameters>,
    ) -> HttpRequest {
        let mut url = route.url();
        if let Some(parameters) = parameters.filter(|p| !p.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in parameters {
                match value {
                    Value::Array(items) => {
                        for item in items {
                            pairs.append_pair(key, &query_value(item));
                        }
                    }
                    other => {
                        pairs.append_pair(key, &query_value(other));
                    }
                }
            }
        }

        let mut request = HttpRequest {
            method,
            url: url.into(),
            headers: Vec::new(),
        };
        for (key, value) in route.extra_http_headers() {
            request.set_header(&key, &value);
        }
        request.set_header("User-Agent", USER_AGENT);
        request
    }

    /// Send a request without blocking the caller. `completion` receives the
    /// decoded JSON body (if any) and the response classification, exactly
    /// once, on the configured dispatcher.
    pub fn request<R, F>(&self, method: HttpMethod, route: &R, parameters: Option<&Parameters>, completion: F)
    where
        R: Routable + ?Sized,
        F: FnOnce(Option<Value>, ResponseType) + Send + 'static,
    {
        let request = self.build_request(method, route, parameters);
        let transport = Arc::clone(&self.transport);
        let dispatcher = Arc::clone(&self.dispatcher);

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        // The completion is handed over only once the worker exists, so a
        // failed spawn still leaves it here to report the failure.
        let (handoff, pending) = mpsc::channel::<F>();
        let spawned = thread::Builder::new().name("lyft-http".to_string()).spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| transport.execute(&request)))
                .unwrap_or_else(|_| Err(TransportError::Other("transport panicked".to_string())));
            let (json, kind) = decode_outcome(outcome);
            if let Ok(completion) = pending.recv() {
                dispatcher.dispatch(Box::new(move || completion(json, kind)));
            }
        });

        match spawned {
            Ok(_) => {
                if handoff.send(completion).is_err() {
                    tracing::error!("request worker exited before receiving its completion");
                }
            }
            Err(error) => complete_unsent(self.dispatcher.as_ref(), &error, completion),
        }
    }
}

/// Report a request that never left the caller's thread as an internal error.
fn complete_unsent<F>(dispatcher: &dyn Dispatcher, error: &io::Error, completion: F)
where
    F: FnOnce(Option<Value>, ResponseType) + Send + 'static,
{
    tracing::error!(%error, "failed to spawn request worker");
    dispatcher.dispatch(Box::new(move || completion(None, ResponseType::InternalError)));
}

/// Classify a round-trip and parse its body.
///
/// The classification comes from the status alone. A body that is not JSON
/// decodes to `None` without affecting it.
pub fn decode_outcome(outcome: Result<HttpResponse, TransportError>) -> (Option<Value>, ResponseType) {
    match outcome {
        Ok(response) => {
            let kind = ResponseType::from_status(response.status);
            tracing::debug!(status = response.status, ?kind, "received response");
            (serde_json::from_str(&response.body).ok(), kind)
        }
        Err(error) => {
            let kind = ResponseType::from_transport(&error);
            tracing::warn!(%error, ?kind, "request failed before a response arrived");
            (None, kind)
        }
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::main_queue;
    use serde_json::json;
    use url::Url;

    struct StubTransport<F>(F);

    impl<F> Transport for StubTransport<F>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
    {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            (self.0)(request)
        }
    }

    struct HeaderRoute;

    impl Routable for HeaderRoute {
        fn url(&self) -> Url {
            Url::parse("https://test.com/v1/eta").unwrap()
        }

        fn extra_http_headers(&self) -> BTreeMap<String, String> {
            BTreeMap::from([
                ("Authorization".to_string(), "Bearer abc".to_string()),
                ("User-Agent".to_string(), "spoofed".to_string()),
            ])
        }
    }

    fn respond(status: u16, body: &str) -> HttpClient {
        let body = body.to_string();
        HttpClient::new(Arc::new(StubTransport(move |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status,
                body: body.clone(),
            })
        })))
    }

    fn test_url() -> Url {
        Url::parse("https://test.com").unwrap()
    }

    fn params(pairs: &[(&str, Value)]) -> Parameters {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn single_parameter_is_url_encoded() {
        let req = respond(200, "").build_request(HttpMethod::Get, &test_url(), Some(&params(&[("foo", json!("bar"))])));
        assert_eq!(req.url, "https://test.com/?foo=bar");
    }

    #[test]
    fn parameters_are_sorted_and_arrays_repeat() {
        let parameters = params(&[
            ("lng", json!(-122.5)),
            ("lat", json!(37.7)),
            ("ride_type", json!(["lyft_plus", "lyft"])),
            ("count", json!(3)),
        ]);
        let req = respond(200, "").build_request(HttpMethod::Get, &test_url(), Some(&parameters));
        let query = Url::parse(&req.url).unwrap().query().unwrap().to_string();
        assert_eq!(query, "count=3&lat=37.7&lng=-122.5&ride_type=lyft_plus&ride_type=lyft");
    }

    #[test]
    fn existing_query_items_are_kept() {
        let url = Url::parse("https://test.com/v1/cost?debug=1").unwrap();
        let req = respond(200, "").build_request(HttpMethod::Get, &url, Some(&params(&[("a", json!("b"))])));
        assert_eq!(req.url, "https://test.com/v1/cost?debug=1&a=b");
    }

    #[test]
    fn no_parameters_leave_the_url_alone() {
        let client = respond(200, "");
        assert_eq!(client.build_request(HttpMethod::Get, &test_url(), None).url, "https://test.com/");
        let req = client.build_request(HttpMethod::Get, &test_url(), Some(&Parameters::new()));
        assert_eq!(req.url, "https://test.com/");
    }

    #[test]
    fn headers_include_route_headers_and_user_agent() {
        let req = respond(200, "").build_request(HttpMethod::Post, &HeaderRoute, None);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("Authorization"), Some("Bearer abc"));
        assert_eq!(req.header("user-agent"), Some(USER_AGENT));
        assert!(USER_AGENT.starts_with("lyft-mobile-sdk:rust::"));
    }

    #[test]
    fn decode_outcome_parses_json_on_success() {
        let (json, kind) = decode_outcome(Ok(HttpResponse {
            status: 200,
            body: r#"{"ok":true}"#.to_string(),
        }));
        assert_eq!(kind, ResponseType::Succeed);
        assert_eq!(json, Some(json!({"ok": true})));
    }

    #[test]
    fn decode_outcome_ignores_unparseable_bodies() {
        let (json, kind) = decode_outcome(Ok(HttpResponse {
            status: 503,
            body: "<html>down</html>".to_string(),
        }));
        assert_eq!(kind, ResponseType::ServiceUnavailable);
        assert!(json.is_none());
    }

    #[test]
    fn decode_outcome_classifies_transport_failures() {
        assert_eq!(decode_outcome(Err(TransportError::TimedOut)), (None, ResponseType::ClientTimeOut));
        assert_eq!(
            decode_outcome(Err(TransportError::Other("refused".into()))),
            (None, ResponseType::InternalError)
        );
    }

    #[test]
    fn request_completes_exactly_once() {
        let (tx, rx) = mpsc::channel();
        respond(404, "").request(HttpMethod::Get, &test_url(), None, move |json, kind| {
            tx.send((json, kind)).unwrap();
        });

        let (json, kind) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(kind, ResponseType::NotFound);
        assert!(json.is_none());
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn request_sends_the_built_request() {
        let (seen_tx, seen_rx) = mpsc::channel();
        let seen_tx = std::sync::Mutex::new(seen_tx);
        let client = HttpClient::new(Arc::new(StubTransport(move |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            seen_tx.lock().unwrap().send(req.clone()).unwrap();
            Ok(HttpResponse {
                status: 200,
                body: String::new(),
            })
        })));

        let (tx, rx) = mpsc::channel();
        client.request(HttpMethod::Get, &test_url(), Some(&params(&[("foo", json!("bar"))])), move |_, kind| {
            tx.send(kind).unwrap();
        });

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), ResponseType::Succeed);
        let sent = seen_rx.recv().unwrap();
        assert_eq!(Url::parse(&sent.url).unwrap().query(), Some("foo=bar"));
    }

    #[test]
    fn panicking_transport_still_completes() {
        let client = HttpClient::new(Arc::new(StubTransport(|_: &HttpRequest| -> Result<HttpResponse, TransportError> {
            panic!("boom")
        })));
        let (tx, rx) = mpsc::channel();
        client.request(HttpMethod::Get, &test_url(), None, move |json, kind| {
            tx.send((json, kind)).unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), (None, ResponseType::InternalError));
    }

    #[test]
    fn unsent_request_completes_with_internal_error() {
        let (tx, rx) = mpsc::channel();
        let error = io::Error::other("thread limit reached");
        complete_unsent(&InlineDispatcher, &error, move |json, kind| {
            tx.send((json, kind)).unwrap();
        });
        assert_eq!(rx.try_recv().unwrap(), (None, ResponseType::InternalError));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn completion_runs_on_the_main_queue() {
        let (dispatcher, queue) = main_queue();
        let client = respond(200, "{}").with_dispatcher(Arc::new(dispatcher));
        let (tx, rx) = mpsc::channel();
        client.request(HttpMethod::Get, &test_url(), None, move |_, _| {
            tx.send(thread::current().id()).unwrap();
        });

        assert!(queue.run_next(Duration::from_secs(2)));
        assert_eq!(rx.recv().unwrap(), thread::current().id());
    }
}
