//! Nearby-recycler lookup: position resolution, the show/hide panel, and
//! list shaping (search filter + sort).

use crate::config::Geo;
use crate::error::ScanError;
use crate::model::RecyclerRecord;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Environment variable consulted when no explicit coordinates are given,
/// formatted `"lat,lon"`.
pub const POSITION_ENV: &str = "ECOSCAN_POSITION";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn parse(raw: &str) -> Result<Self, ScanError> {
        let mut parts = raw.split(',');
        let lat = parts.next().map(str::trim).unwrap_or("");
        let lon = parts.next().map(str::trim).unwrap_or("");
        if parts.next().is_some() || lat.is_empty() || lon.is_empty() {
            return Err(ScanError::LocationUnavailable(format!(
                "expected \"lat,lon\", got {raw:?}"
            )));
        }
        let latitude: f64 = lat
            .parse()
            .map_err(|_| ScanError::LocationUnavailable(format!("bad latitude {lat:?}")))?;
        let longitude: f64 = lon
            .parse()
            .map_err(|_| ScanError::LocationUnavailable(format!("bad longitude {lon:?}")))?;
        Self {
            latitude,
            longitude,
        }
        .validated()
    }

    pub fn validated(self) -> Result<Self, ScanError> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(ScanError::LocationUnavailable(format!(
                "coordinates out of range: {},{}",
                self.latitude, self.longitude
            )));
        }
        Ok(self)
    }
}

/// One-shot position query against the host's sources, strictly ordered:
/// explicit coordinates, then the `ECOSCAN_POSITION` environment variable,
/// then the fixed `[geo]` config entry. A present-but-broken source fails
/// with `LocationUnavailable`; no source at all means the host simply has
/// no geolocation capability. Neither case is retried.
pub fn resolve_position(
    explicit: Option<GeoPosition>,
    env_raw: Option<&str>,
    geo: &Geo,
) -> Result<GeoPosition, ScanError> {
    if let Some(pos) = explicit {
        return pos.validated();
    }
    if let Some(raw) = env_raw {
        return GeoPosition::parse(raw);
    }
    if let (Some(latitude), Some(longitude)) = (geo.latitude, geo.longitude) {
        return GeoPosition {
            latitude,
            longitude,
        }
        .validated();
    }
    Err(ScanError::GeolocationUnsupported)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Distance,
    Rating,
}

/// The expandable result list. Toggling while expanded collapses without
/// touching the cached records or re-querying; expanding runs exactly one
/// fresh query. A failed query leaves the panel collapsed.
#[derive(Debug, Default)]
pub struct RecyclerPanel {
    expanded: bool,
    records: Vec<RecyclerRecord>,
}

impl RecyclerPanel {
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn records(&self) -> &[RecyclerRecord] {
        &self.records
    }

    /// Returns whether the panel is expanded after the toggle.
    pub async fn toggle<F, Fut>(&mut self, fetch: F) -> Result<bool, ScanError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<RecyclerRecord>, ScanError>>,
    {
        if self.expanded {
            self.expanded = false;
            return Ok(false);
        }
        self.records = fetch().await?;
        self.expanded = true;
        Ok(true)
    }
}

/// Case-insensitive substring match against name OR address.
pub fn filter_records(records: &[RecyclerRecord], query: &str) -> Vec<RecyclerRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle) || r.address.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Ascending distance or descending rating; an unrated entry (rating 0)
/// lands last under rating order.
pub fn sort_records(records: &mut [RecyclerRecord], key: SortKey) {
    match key {
        SortKey::Distance => {
            records.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        }
        SortKey::Rating => {
            records.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        }
    }
}
