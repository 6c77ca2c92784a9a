//! API client core for the Lyft ride platform.
//!
//! # Overview
//! Fetches ETAs, ride types, cost estimates and nearby drivers, decoding the
//! JSON responses into typed models. Every call is asynchronous: it returns
//! immediately and later invokes a completion with a `LyftResult`.
//!
//! # Design
//! - `LyftApi` is the facade; `HttpClient` is the request pipeline it shares
//!   across calls.
//! - I/O sits behind the `Transport` trait (`UreqTransport` by default) and
//!   completions are delivered through a `Dispatcher`, so callers choose the
//!   thread their completions run on.
//! - Request building, outcome classification and payload parsing are pure
//!   functions, testable without a network.
//! - Models decode leniently through `JsonMappable`: a bad record is dropped,
//!   not fatal to the whole array.

pub mod api;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod json;
pub mod money;
pub mod route;
pub mod transport;
pub mod types;

pub use api::{parse_cost_estimates, parse_etas, parse_nearby_drivers, parse_ride_types, LyftApi};
pub use client::{decode_outcome, HttpClient, Parameters, USER_AGENT};
pub use config::{Developer, LyftConfiguration};
pub use dispatch::{main_queue, Dispatcher, InlineDispatcher, MainDispatcher, MainQueue};
pub use error::{ConfigError, LyftApiError, LyftResult, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseType, Routable};
pub use json::JsonMappable;
pub use money::Money;
pub use route::{ApiRoute, Endpoint};
pub use transport::{Transport, UreqTransport};
pub use types::{Coordinate, Cost, Eta, NearbyDriver, NearbyDrivers, PricingDetails, RideCostEstimate, RideKind, RideType};
