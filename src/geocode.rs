use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::GeocodeError;
use crate::record::Coordinates;

/// Resolves a free-text place to coordinates. `Ok(None)` means the service
/// answered but found nothing.
pub trait Geocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    /// `client` must already carry the identifying `User-Agent` and a timeout.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        NominatimGeocoder {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        info!("Geocoding '{}'", query);
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let coords = parse_search_response(&body)?;
        debug!("Geocoding result for '{}': {:?}", query, coords);
        Ok(coords)
    }
}

#[derive(Deserialize)]
struct SearchHit {
    lat: Value,
    lon: Value,
}

/// First hit of a search response. `[]` is a valid answer with no result.
pub fn parse_search_response(body: &str) -> Result<Option<Coordinates>, GeocodeError> {
    let hits: Vec<SearchHit> =
        serde_json::from_str(body).map_err(|e| GeocodeError::Malformed(e.to_string()))?;
    let Some(first) = hits.first() else {
        return Ok(None);
    };
    Ok(Some(Coordinates {
        lat: coordinate(&first.lat, "lat")?,
        lon: coordinate(&first.lon, "lon")?,
    }))
}

// Nominatim sends numbers as strings; accept plain numbers too.
fn coordinate(value: &Value, name: &str) -> Result<f64, GeocodeError> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::Malformed(format!("bad {}: {}", name, value)))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{plain_client, serve_once};

    #[test]
    fn first_hit_wins() {
        let body = r#"[
            {"place_id": 1, "lat": "40.4167047", "lon": "-3.7035825", "display_name": "Madrid"},
            {"place_id": 2, "lat": "0", "lon": "0"}
        ]"#;
        let c = parse_search_response(body).unwrap().unwrap();
        assert_eq!(c.lat, 40.4167047);
        assert_eq!(c.lon, -3.7035825);
    }

    #[test]
    fn empty_array_is_no_result() {
        assert_eq!(parse_search_response("[]").unwrap(), None);
    }

    #[test]
    fn numeric_coordinates_accepted() {
        let c = parse_search_response(r#"[{"lat": 37.38, "lon": -5.98}]"#)
            .unwrap()
            .unwrap();
        assert_eq!(c, Coordinates { lat: 37.38, lon: -5.98 });
    }

    #[tokio::test]
    async fn queries_endpoint() {
        let url = serve_once("200 OK", br#"[{"lat":"39.4699","lon":"-0.3763"}]"#.to_vec()).await;
        let geocoder = NominatimGeocoder::new(plain_client(), url);
        let c = geocoder.geocode("Valencia").await.unwrap().unwrap();
        assert_eq!(c, Coordinates { lat: 39.4699, lon: -0.3763 });
    }

    #[tokio::test]
    async fn server_error_is_request_error() {
        let url = serve_once("503 Service Unavailable", Vec::new()).await;
        let geocoder = NominatimGeocoder::new(plain_client(), url);
        let err = geocoder.geocode("Valencia").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Request(_)));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_search_response("<html>rate limited</html>"),
            Err(GeocodeError::Malformed(_))
        ));
        assert!(matches!(
            parse_search_response(r#"{"error": "Unable to geocode"}"#),
            Err(GeocodeError::Malformed(_))
        ));
        assert!(matches!(
            parse_search_response(r#"[{"lat": "north", "lon": "-3.7"}]"#),
            Err(GeocodeError::Malformed(_))
        ));
    }
}
