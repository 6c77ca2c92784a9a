//! The four ride API operations.
//!
//! # Design
//! Each operation builds its query parameters, sends them through the shared
//! `HttpClient`, and turns `(body, ResponseType)` into a `LyftResult` with the
//! matching `parse_*` function. The parse functions are public and pure so
//! recorded responses can be checked without a network.
//!
//! A decoded value always wins: if the expected payload decodes, the call
//! succeeds whatever the status. Otherwise the error comes from the body
//! (`error` / `error_description`) or falls back to `LyftApiError::unknown()`.

use std::sync::Arc;

use serde_json::{json, Value};
use url::Url;

use crate::client::{HttpClient, Parameters};
use crate::config::LyftConfiguration;
use crate::error::{ConfigError, LyftApiError, LyftResult};
use crate::http::{HttpMethod, ResponseType};
use crate::json::{decode_vec, JsonMappable, JsonObject};
use crate::route::{ApiRoute, Endpoint};
use crate::types::{Coordinate, Cost, Eta, NearbyDrivers, RideKind, RideType};

/// Entry point for the ride API.
///
/// Cheap to share: it holds an immutable configuration and a stateless
/// client. Concurrent calls are independent.
#[derive(Clone)]
pub struct LyftApi {
    client: HttpClient,
    config: Arc<LyftConfiguration>,
    base_url: Url,
}

impl LyftApi {
    /// Build with a `ureq` transport using the configured request timeout.
    pub fn new(config: LyftConfiguration) -> Result<Self, ConfigError> {
        let client = HttpClient::with_timeout(config.request_timeout());
        Self::with_client(config, client)
    }

    pub fn with_client(config: LyftConfiguration, client: HttpClient) -> Result<Self, ConfigError> {
        let base_url = config.parsed_base_url()?;
        Ok(Self {
            client,
            config: Arc::new(config),
            base_url,
        })
    }

    pub fn config(&self) -> &LyftConfiguration {
        &self.config
    }

    /// ETA estimates to `position`, one per ride kind.
    pub fn etas<F>(&self, position: Coordinate, completion: F)
    where
        F: FnOnce(LyftResult<Vec<Eta>>) + Send + 'static,
    {
        self.send(Endpoint::Eta, position_parameters(position), parse_etas, completion);
    }

    /// Ride types available at `position`.
    pub fn ride_types<F>(&self, position: Coordinate, completion: F)
    where
        F: FnOnce(LyftResult<Vec<RideType>>) + Send + 'static,
    {
        self.send(Endpoint::RideTypes, position_parameters(position), parse_ride_types, completion);
    }

    /// Cost estimates for a ride from `pickup`.
    ///
    /// Without a `destination` only prime time information is returned and
    /// every `Cost::estimate` is `None`. Without a `ride_kind` all kinds are
    /// returned.
    pub fn cost_estimates<F>(
        &self,
        pickup: Coordinate,
        destination: Option<Coordinate>,
        ride_kind: Option<&RideKind>,
        completion: F,
    ) where
        F: FnOnce(LyftResult<Vec<Cost>>) + Send + 'static,
    {
        let parameters = cost_parameters(pickup, destination, ride_kind);
        self.send(Endpoint::CostEstimates, parameters, parse_cost_estimates, completion);
    }

    /// Drivers near `position`, grouped by ride kind.
    pub fn drivers<F>(&self, position: Coordinate, completion: F)
    where
        F: FnOnce(LyftResult<NearbyDrivers>) + Send + 'static,
    {
        self.send(Endpoint::NearbyDrivers, position_parameters(position), parse_nearby_drivers, completion);
    }

    fn send<T, F>(
        &self,
        endpoint: Endpoint,
        parameters: Parameters,
        parse: fn(Option<&Value>, ResponseType) -> LyftResult<T>,
        completion: F,
    ) where
        T: 'static,
        F: FnOnce(LyftResult<T>) + Send + 'static,
    {
        let Some(developer) = self.config.developer.as_ref() else {
            tracing::warn!(path = endpoint.path(), "developer credentials not configured");
            self.client
                .dispatcher()
                .dispatch(Box::new(move || completion(Err(LyftApiError::not_configured()))));
            return;
        };

        let route = ApiRoute {
            endpoint,
            base_url: &self.base_url,
            developer: Some(developer),
        };
        self.client.request(HttpMethod::Get, &route, Some(&parameters), move |body, status| {
            completion(parse(body.as_ref(), status));
        });
    }
}

fn position_parameters(position: Coordinate) -> Parameters {
    Parameters::from([
        ("lat".to_string(), json!(position.latitude)),
        ("lng".to_string(), json!(position.longitude)),
    ])
}

/// Absent optional inputs are left out of the query entirely.
pub fn cost_parameters(pickup: Coordinate, destination: Option<Coordinate>, ride_kind: Option<&RideKind>) -> Parameters {
    let mut parameters = Parameters::from([
        ("start_lat".to_string(), json!(pickup.latitude)),
        ("start_lng".to_string(), json!(pickup.longitude)),
    ]);
    if let Some(destination) = destination {
        parameters.insert("end_lat".to_string(), json!(destination.latitude));
        parameters.insert("end_lng".to_string(), json!(destination.longitude));
    }
    if let Some(kind) = ride_kind {
        parameters.insert("ride_type".to_string(), json!(kind.raw_value()));
    }
    parameters
}

fn finish<T>(body: Option<&Value>, status: ResponseType, decode: impl FnOnce(Option<&JsonObject>) -> Option<T>) -> LyftResult<T> {
    let response = body.and_then(Value::as_object);
    let error = LyftApiError::from_response(response, status);
    decode(response).ok_or_else(|| error.unwrap_or_else(LyftApiError::unknown))
}

pub fn parse_etas(body: Option<&Value>, status: ResponseType) -> LyftResult<Vec<Eta>> {
    finish(body, status, |response| decode_vec(response.and_then(|r| r.get("eta_estimates"))))
}

pub fn parse_ride_types(body: Option<&Value>, status: ResponseType) -> LyftResult<Vec<RideType>> {
    finish(body, status, |response| decode_vec(response.and_then(|r| r.get("ride_types"))))
}

pub fn parse_cost_estimates(body: Option<&Value>, status: ResponseType) -> LyftResult<Vec<Cost>> {
    finish(body, status, |response| decode_vec(response.and_then(|r| r.get("cost_estimates"))))
}

pub fn parse_nearby_drivers(body: Option<&Value>, status: ResponseType) -> LyftResult<NearbyDrivers> {
    finish(body, status, |response| response.and_then(NearbyDrivers::from_json))
}
