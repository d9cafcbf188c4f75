//! Wire shapes for the analysis document and the recycler list.
//!
//! The analysis document is produced by an AI backend, so every field is
//! optional on the wire: absent or oddly-typed values decode to neutral
//! defaults instead of failing the whole document. Decoded values are
//! treated as immutable.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceAnalysis {
    pub device_info: DeviceInfo,
    pub eco_score: EcoScore,
    pub components: Vec<ComponentShare>,
    pub recommendations: Recommendations,
    pub toxic_components: Vec<ToxicComponent>,
    pub disposal_guidelines: DisposalGuidelines,
    pub ai_summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EcoScore {
    #[serde(deserialize_with = "score_0_100")]
    pub repairability: u8,
    #[serde(deserialize_with = "score_0_100")]
    pub recyclability: u8,
    #[serde(deserialize_with = "score_0_100")]
    pub toxicity: u8,
    #[serde(deserialize_with = "score_0_100")]
    pub resale_value: u8,
    pub environmental_impact: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentShare {
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendations {
    pub repair: bool,
    pub repair_notes: String,
    pub reuse: bool,
    pub reuse_notes: String,
    pub recycle: bool,
    pub recycle_notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToxicComponent {
    pub name: String,
    pub risk_level: String,
    pub found_in: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisposalGuidelines {
    pub battery: String,
    pub plastic: String,
    pub general: String,
}

/// One nearby recycling facility. `rating` 0 means unrated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecyclerRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(deserialize_with = "lenient_rating")]
    pub rating: f64,
    #[serde(alias = "distance", deserialize_with = "lenient_distance_km")]
    pub distance_km: f64,
    pub maps_url: String,
    #[serde(alias = "thumbnail")]
    pub thumbnail_url: String,
}

/// The recycler endpoint omits ids; give positional ones so list rows stay
/// addressable after filtering and sorting.
pub fn backfill_ids(records: &mut [RecyclerRecord]) {
    for (idx, rec) in records.iter_mut().enumerate() {
        if rec.id.is_empty() {
            rec.id = (idx + 1).to_string();
        }
    }
}

fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn score_0_100<'de, D>(de: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(value_as_f64(&v).map_or(0, |f| f.clamp(0.0, 100.0).round() as u8))
}

fn lenient_f64<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(value_as_f64(&v).unwrap_or(0.0))
}

/// Accepts a number, a numeric string, or the `"N/A"` the places backend
/// sends for unrated facilities.
fn lenient_rating<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(value_as_f64(&v).map_or(0.0, |f| f.max(0.0)))
}

/// Accepts a number of kilometres or a `"3.2 km"` display string.
fn lenient_distance_km<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    let parsed = match &v {
        Value::String(s) => {
            let trimmed = s.trim();
            let trimmed = trimmed
                .strip_suffix("km")
                .map(str::trim_end)
                .unwrap_or(trimmed);
            trimmed.parse::<f64>().ok()
        }
        other => value_as_f64(other),
    };
    Ok(parsed.map_or(0.0, |f| f.max(0.0)))
}
