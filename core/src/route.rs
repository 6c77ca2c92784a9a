//! The ride API endpoints.

use std::collections::BTreeMap;

use url::Url;

use crate::config::Developer;
use crate::http::Routable;

/// Ride API resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Time for the nearest driver to reach a position.
    Eta,
    /// Ride types available at a position.
    RideTypes,
    /// Cost, distance and duration between two positions.
    CostEstimates,
    /// Drivers around a position.
    NearbyDrivers,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Eta => "/v1/eta",
            Endpoint::RideTypes => "/v1/ridetypes",
            Endpoint::CostEstimates => "/v1/cost",
            Endpoint::NearbyDrivers => "/v1/drivers",
        }
    }
}

/// An endpoint resolved against a base URL and the developer's credentials.
#[derive(Debug, Clone, Copy)]
pub struct ApiRoute<'a> {
    pub endpoint: Endpoint,
    pub base_url: &'a Url,
    pub developer: Option<&'a Developer>,
}

impl Routable for ApiRoute<'_> {
    fn url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(self.endpoint.path());
        url
    }

    fn extra_http_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        if let Some(developer) = self.developer {
            headers.insert("Authorization".to_string(), format!("Bearer {}", developer.token));
        }
        headers
    }
}
