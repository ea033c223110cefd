//! Core value types shared by the solver: candidates, locations, demands.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// A concrete resource that can satisfy a demand.
///
/// Only the four identity fields are guaranteed. Everything else an
/// inventory provider reports lands in `attributes`, and readers must
/// tolerate any of those keys being absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: String,
    pub inventory_provider: String,
    pub inventory_type: String,
    pub cost: f64,
    /// Provider-specific attributes (region, latitude, flavors, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Candidate {
    pub fn new(
        candidate_id: &str,
        inventory_provider: &str,
        inventory_type: &str,
        cost: f64,
    ) -> Self {
        Self {
            candidate_id: candidate_id.to_string(),
            inventory_provider: inventory_provider.to_string(),
            inventory_type: inventory_type.to_string(),
            cost,
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Look up an attribute by name, including the identity fields.
    pub fn attribute(&self, key: &str) -> Option<Value> {
        match key {
            "candidate_id" => Some(Value::String(self.candidate_id.clone())),
            "inventory_provider" => Some(Value::String(self.inventory_provider.clone())),
            "inventory_type" => Some(Value::String(self.inventory_type.clone())),
            "cost" => serde_json::Number::from_f64(self.cost).map(Value::Number),
            _ => self.attributes.get(key).cloned(),
        }
    }

    /// Numeric view of an attribute. Numeric strings are accepted since
    /// several inventory providers report numbers as text.
    ///
    /// Returns `None` when the attribute is missing or not a number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.attribute(key).as_ref().and_then(value_as_f64)
    }

    /// Like [`Candidate::number`], but distinguishes a missing attribute
    /// from a non-numeric one.
    pub fn require_number(&self, key: &str) -> CoreResult<f64> {
        let value = self
            .attribute(key)
            .ok_or_else(|| CoreError::MissingAttribute {
                candidate_id: self.candidate_id.clone(),
                attribute: key.to_string(),
            })?;
        value_as_f64(&value).ok_or_else(|| CoreError::NotNumeric {
            candidate_id: self.candidate_id.clone(),
            attribute: key.to_string(),
        })
    }

    /// String view of an attribute. Numbers and booleans are rendered.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.attribute(key)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Interpret a JSON value as a float.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Create a validated location.
    pub fn new(latitude: f64, longitude: f64) -> CoreResult<Self> {
        let location = Self {
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }

    /// Reject coordinates outside the valid latitude/longitude ranges.
    pub fn validate(&self) -> CoreResult<()> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(CoreError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// One placement slot in a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demand {
    pub name: String,
    /// Candidate pool, in provider order. Candidate ids are unique.
    pub candidates: Vec<Candidate>,
    /// Processing order key (ascending, stable).
    #[serde(default)]
    pub sort_key: i64,
}

impl Demand {
    /// Build a demand, dropping candidates whose id was already seen.
    pub fn new(name: &str, candidates: Vec<Candidate>) -> Self {
        let mut seen = HashSet::new();
        let candidates = candidates
            .into_iter()
            .filter(|c| seen.insert(c.candidate_id.clone()))
            .collect();
        Self {
            name: name.to_string(),
            candidates,
            sort_key: 0,
        }
    }

    pub fn with_sort_key(mut self, sort_key: i64) -> Self {
        self.sort_key = sort_key;
        self
    }

    /// Find a candidate in the pool by id.
    pub fn candidate(&self, candidate_id: &str) -> Option<&Candidate> {
        self.candidates
            .iter()
            .find(|c| c.candidate_id == candidate_id)
    }
}
