//! Domain models for the ride platform API.
//!
//! # Design
//! Every model is an immutable value built by `JsonMappable::from_json` from
//! a server payload. Required fields that are missing or mistyped drop the
//! whole record. Prices arrive as integer cents next to a sibling `currency`
//! field and are turned into `Money`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::json::{self, decode_vec, JsonMappable, JsonObject};
use crate::money::Money;

/// A server-defined category of ride.
///
/// Deliberately open-ended: the server may introduce kinds this client has
/// never heard of, and those must round-trip untouched. Equality is exact,
/// case-sensitive string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideKind(Cow<'static, str>);

impl RideKind {
    pub const STANDARD: RideKind = RideKind(Cow::Borrowed("lyft"));
    pub const LINE: RideKind = RideKind(Cow::Borrowed("lyft_line"));
    pub const PLUS: RideKind = RideKind(Cow::Borrowed("lyft_plus"));
    pub const LUX: RideKind = RideKind(Cow::Borrowed("lyft_premier"));
    pub const LUX_BLACK: RideKind = RideKind(Cow::Borrowed("lyft_lux"));
    pub const LUX_BLACK_XL: RideKind = RideKind(Cow::Borrowed("lyft_luxsuv"));

    pub fn new(raw_value: impl Into<String>) -> Self {
        RideKind(Cow::Owned(raw_value.into()))
    }

    pub fn raw_value(&self) -> &str {
        &self.0
    }

    fn from_json_field(json: &JsonObject, key: &str) -> Option<Self> {
        json::string(json, key).map(RideKind::new)
    }
}

impl fmt::Display for RideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl JsonMappable for Coordinate {
    fn from_json(json: &JsonObject) -> Option<Self> {
        Some(Coordinate::new(json::double(json, "lat")?, json::double(json, "lng")?))
    }
}

/// Estimated time for the nearest driver of a ride kind to reach a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Eta {
    pub display_name: String,
    pub ride_kind: RideKind,
    pub seconds: i64,
}

impl Eta {
    /// Whole minutes, never less than one.
    pub fn minutes(&self) -> i64 {
        (self.seconds / 60).max(1)
    }
}

impl JsonMappable for Eta {
    fn from_json(json: &JsonObject) -> Option<Self> {
        Some(Eta {
            display_name: json::string(json, "display_name")?,
            ride_kind: RideKind::from_json_field(json, "ride_type")?,
            seconds: json::int(json, "eta_seconds")?,
        })
    }
}

/// Pricing for a ride type. All six amounts share one currency.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingDetails {
    pub base_charge: Money,
    pub cancel_penalty: Money,
    pub cost_minimum: Money,
    pub cost_per_mile: Money,
    pub cost_per_minute: Money,
    pub trust_and_service_fee: Money,
}

impl JsonMappable for PricingDetails {
    fn from_json(json: &JsonObject) -> Option<Self> {
        let currency = json.get("currency").and_then(serde_json::Value::as_str);
        let money = |key: &str| Money::from_json_cents(json.get(key), currency);

        Some(PricingDetails {
            base_charge: money("base_charge")?,
            cancel_penalty: money("cancel_penalty_amount")?,
            cost_minimum: money("cost_minimum")?,
            cost_per_mile: money("cost_per_mile")?,
            cost_per_minute: money("cost_per_minute")?,
            trust_and_service_fee: money("trust_and_service")?,
        })
    }
}

/// A ride type offered at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct RideType {
    pub kind: RideKind,
    pub display_name: String,
    pub image_url: Option<String>,
    pub number_of_seats: i64,
    pub pricing_details: PricingDetails,
}

impl JsonMappable for RideType {
    fn from_json(json: &JsonObject) -> Option<Self> {
        Some(RideType {
            kind: RideKind::from_json_field(json, "ride_type")?,
            display_name: json::string(json, "display_name")?,
            number_of_seats: json::int(json, "seats")?,
            pricing_details: PricingDetails::from_value(json.get("pricing_details"))?,
            image_url: json::string(json, "image_url"),
        })
    }
}

/// Estimated price range, duration and distance for a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct RideCostEstimate {
    pub min_estimate: Money,
    pub max_estimate: Money,
    pub duration_seconds: i64,
    pub distance_miles: f64,
}

impl JsonMappable for RideCostEstimate {
    fn from_json(json: &JsonObject) -> Option<Self> {
        let currency = json.get("currency").and_then(serde_json::Value::as_str);

        Some(RideCostEstimate {
            duration_seconds: json::int(json, "estimated_duration_seconds")?,
            distance_miles: json::double(json, "estimated_distance_miles")?,
            min_estimate: Money::from_json_cents(json.get("estimated_cost_cents_min"), currency)?,
            max_estimate: Money::from_json_cents(json.get("estimated_cost_cents_max"), currency)?,
        })
    }
}

/// Cost information for a ride kind.
///
/// `estimate` is only present when the request included a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Cost {
    pub ride_kind: RideKind,
    pub display_name: String,
    pub prime_time_percentage_text: String,
    pub estimate: Option<RideCostEstimate>,
}

impl JsonMappable for Cost {
    fn from_json(json: &JsonObject) -> Option<Self> {
        Some(Cost {
            ride_kind: RideKind::from_json_field(json, "ride_type")?,
            prime_time_percentage_text: json::string(json, "primetime_percentage")?,
            display_name: json::string(json, "display_name")?,
            // Estimate fields live on the same object as the cost itself.
            estimate: RideCostEstimate::from_json(json),
        })
    }
}

/// A driver near the requested position.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyDriver {
    /// Oldest first.
    pub recent_positions: Vec<Coordinate>,
}

impl NearbyDriver {
    /// The most recent position, if any.
    pub fn position(&self) -> Option<Coordinate> {
        self.recent_positions.last().copied()
    }
}

impl JsonMappable for NearbyDriver {
    fn from_json(json: &JsonObject) -> Option<Self> {
        Some(NearbyDriver {
            recent_positions: decode_vec(json.get("locations"))?,
        })
    }
}

/// Nearby drivers grouped by ride kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NearbyDrivers {
    drivers_by_kind: HashMap<RideKind, Vec<NearbyDriver>>,
}

impl NearbyDrivers {
    pub fn get(&self, kind: &RideKind) -> Option<&[NearbyDriver]> {
        self.drivers_by_kind.get(kind).map(Vec::as_slice)
    }

    pub fn ride_kinds(&self) -> impl Iterator<Item = &RideKind> {
        self.drivers_by_kind.keys()
    }

    pub fn len(&self) -> usize {
        self.drivers_by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers_by_kind.is_empty()
    }
}

impl JsonMappable for NearbyDrivers {
    /// Any malformed group fails the whole value.
    fn from_json(json: &JsonObject) -> Option<Self> {
        let groups = json.get("nearby_drivers").and_then(serde_json::Value::as_array)?;

        let mut drivers_by_kind = HashMap::new();
        for group in groups {
            let group = group.as_object()?;
            let kind = RideKind::from_json_field(group, "ride_type")?;
            let drivers = decode_vec(group.get("drivers"))?;
            drivers_by_kind.insert(kind, drivers);
        }

        Some(NearbyDrivers { drivers_by_kind })
    }
}
