//! Wire types for the recommendation API

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Body of a `POST /recommend` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Free-text description of the candidate
    pub user_profile: String,

    /// Free-text description of the position
    pub job_description: String,
}

impl RecommendRequest {
    pub fn new(user_profile: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            user_profile: user_profile.into(),
            job_description: job_description.into(),
        }
    }
}

/// Category scores ordered by descending probability.
///
/// Serializes as a JSON object whose key order is the ranking order, and
/// deserializes back without losing that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations(Vec<(String, f32)>);

impl Recommendations {
    /// Wrap already-ranked entries
    pub fn new(entries: Vec<(String, f32)>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in ranking order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(label, score)| (label.as_str(), *score))
    }

    /// Labels in ranking order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(label, _)| label.as_str())
    }

    /// Score for a label, if present
    pub fn get(&self, label: &str) -> Option<f32> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, score)| *score)
    }

    /// Highest-ranked entry
    pub fn top(&self) -> Option<(&str, f32)> {
        self.0.first().map(|(label, score)| (label.as_str(), *score))
    }

    /// Sum of all scores
    pub fn total(&self) -> f32 {
        self.0.iter().map(|(_, score)| score).sum()
    }
}

impl Serialize for Recommendations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, score) in &self.0 {
            map.serialize_entry(label, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Recommendations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = Recommendations;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category labels to scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, score)) = access.next_entry::<String, f32>()? {
                    entries.push((label, score));
                }
                Ok(Recommendations(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Body of a `POST /recommend` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendations: Recommendations,
}

/// Body of the liveness endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

impl StatusMessage {
    pub fn running() -> Self {
        Self {
            message: "Job Recommendation API is running".to_string(),
        }
    }
}
