use crate::signals::FrameData;
use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::{SystemTime, UNIX_EPOCH};

/// One emitted bus frame. Created fresh for every publish and dropped
/// after transmission; nothing downstream of the generator holds onto
/// frame history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanFrame {
    pub node_id: u16,
    #[serde(
        serialize_with = "serialize_can_id",
        deserialize_with = "deserialize_can_id"
    )]
    pub can_id: u16,
    pub data: FrameData,
    pub dlc: u8,
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl CanFrame {
    pub fn new(node_id: u16, can_id: u16, data: FrameData, with_date: bool) -> Self {
        Self {
            node_id,
            can_id,
            dlc: data.len() as u8,
            data,
            timestamp: unix_timestamp(),
            date: with_date.then(calendar_date),
        }
    }
}

// Wire format carries the id as lowercase hex, e.g. "0x100".
fn serialize_can_id<S: Serializer>(can_id: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:#x}", can_id))
}

fn deserialize_can_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    let text = String::deserialize(deserializer)?;
    let digits = text.strip_prefix("0x").unwrap_or(&text);
    u16::from_str_radix(digits, 16).map_err(serde::de::Error::custom)
}

/// Unix seconds with fractional part, as the wire format expects.
pub fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

fn calendar_date() -> String {
    Local::now().format("%d/%m/%Y").to_string()
}
