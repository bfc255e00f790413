use serde::{Deserialize, Serialize};

/// One community-directory entry in `communities.json`.
///
/// Field order matches the published file. Keys this model does not know about
/// are kept in `extra` so a rewrite never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_reviewed: String,
    #[serde(default)]
    pub community_type: String,
    #[serde(default)]
    pub event_format: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub topics: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub community_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub lat_lon: LatLon,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// Numeric value of `id`, if it is a positive integer.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.trim().parse::<u64>().ok().filter(|n| *n > 0)
    }
}

/// Coordinates as stored: both `null` when geocoding found nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl LatLon {
    pub fn is_known(&self) -> bool {
        self.lat.is_some() && self.lon.is_some()
    }
}

impl From<Option<Coordinates>> for LatLon {
    fn from(c: Option<Coordinates>) -> Self {
        match c {
            Some(c) => LatLon {
                lat: Some(c.lat),
                lon: Some(c.lon),
            },
            None => LatLon::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

// ── Tests ──
