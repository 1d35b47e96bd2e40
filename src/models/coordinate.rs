use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// Geographic point (lat/lon) in decimal degrees
///
/// Deserialization goes through [`Coordinate::new`], so out-of-range values
/// in a partition file are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = ExtractError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Self::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside [-90, 90] x [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ExtractError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Longitude/latitude as a `geo` point (x = lon, y = lat).
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = ExtractError;

    /// Parses `"LAT,LON"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ExtractError::Config(format!("expected LAT,LON but got {:?}", s));
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        let lon = lon.trim().parse::<f64>().map_err(|_| invalid())?;
        Self::new(lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_parse_pair() {
        let c: Coordinate = "51.509, -0.128".parse().unwrap();
        assert_eq!(c, Coordinate { lat: 51.509, lon: -0.128 });
        assert!("51.509".parse::<Coordinate>().is_err());
        assert!("abc,1".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_deserialize_checks_range() {
        let c: Coordinate = serde_json::from_str(r#"{"lat":51.509,"lon":-0.128}"#).unwrap();
        assert_eq!(c, Coordinate { lat: 51.509, lon: -0.128 });

        assert!(serde_json::from_str::<Coordinate>(r#"{"lat":91.0,"lon":0.0}"#).is_err());
        assert!(serde_json::from_str::<Coordinate>(r#"{"lat":0.0,"lon":-200.0}"#).is_err());
    }
}
