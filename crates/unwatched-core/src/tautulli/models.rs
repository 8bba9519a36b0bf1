//! Typed records for the Tautulli v2 API.
//!
//! Tautulli is inconsistent about scalar encoding: identifiers, timestamps and
//! sizes arrive as JSON numbers on some endpoints and as strings on others.
//! Everything is decoded once here so the rest of the crate only sees typed
//! values.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;

/// Opaque item identifier assigned by the media server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RatingKey(pub i64);

impl fmt::Display for RatingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for RatingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_i64(deserializer).map(RatingKey)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Show,
    Season,
    Episode,
    Artist,
    Album,
    Track,
    Photo,
    #[serde(other)]
    Other,
}

impl MediaType {
    /// Types whose library summary stands in for children that must be
    /// enumerated through `get_new_rating_keys`.
    pub fn is_container(self) -> bool {
        matches!(self, MediaType::Show | MediaType::Episode)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
            MediaType::Season => "season",
            MediaType::Episode => "episode",
            MediaType::Artist => "artist",
            MediaType::Album => "album",
            MediaType::Track => "track",
            MediaType::Photo => "photo",
            MediaType::Other => "other",
        }
    }
}

/// A selectable library section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LibrarySummary {
    #[serde(deserialize_with = "lenient_i64")]
    pub section_id: i64,
    pub section_name: String,
    #[serde(default)]
    pub section_type: String,
}

/// One row of `get_library_media_info`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaSummaryRecord {
    pub rating_key: RatingKey,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub parent_rating_key: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub added_at: i64,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub play_count: Option<i64>,
    #[serde(default)]
    pub title: String,
    pub media_type: MediaType,
}

/// Fully resolved leaf item, the unit that is reported and deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaDetailRecord {
    pub rating_key: RatingKey,
    pub parent_rating_key: Option<i64>,
    pub added_at: i64,
    pub title: String,
    pub grandparent_title: String,
    pub media_type: MediaType,
    pub file_path: String,
    pub file_size: u64,
}

#[derive(Debug, Deserialize)]
struct MetadataPayload {
    rating_key: RatingKey,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    parent_rating_key: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    added_at: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    grandparent_title: String,
    media_type: MediaType,
    #[serde(default)]
    media_info: Vec<MediaInfo>,
}

#[derive(Debug, Deserialize)]
struct MediaInfo {
    #[serde(default)]
    parts: Vec<MediaPart>,
}

#[derive(Debug, Deserialize)]
struct MediaPart {
    file: String,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    file_size: Option<i64>,
}

impl MetadataPayload {
    /// File details come from the first part of the first media entry.
    fn into_detail(self) -> Option<MediaDetailRecord> {
        let part = self.media_info.into_iter().next()?.parts.into_iter().next()?;
        Some(MediaDetailRecord {
            rating_key: self.rating_key,
            parent_rating_key: self.parent_rating_key,
            added_at: self.added_at,
            title: self.title,
            grandparent_title: self.grandparent_title,
            media_type: self.media_type,
            file_path: part.file,
            file_size: part.file_size.unwrap_or(0).max(0) as u64,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DataTable<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ContainerNode {
    #[serde(default)]
    children: BTreeMap<String, ChildNode>,
}

#[derive(Debug, Deserialize)]
struct ChildNode {
    #[serde(default)]
    children: BTreeMap<String, LeafNode>,
}

#[derive(Debug, Deserialize)]
struct LeafNode {
    rating_key: RatingKey,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    response: ResponseBody,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

impl Envelope {
    pub(crate) fn into_data(self, command: &'static str) -> Result<Value, Error> {
        match self.response.result.as_deref() {
            None | Some("success") => Ok(self.response.data),
            Some(_) => Err(Error::Api {
                command,
                message: self
                    .response
                    .message
                    .unwrap_or_else(|| "no message".to_string()),
            }),
        }
    }
}

fn malformed(command: &'static str) -> impl FnOnce(serde_json::Error) -> Error {
    move |source| Error::MalformedResponse { command, source }
}

fn decode_table<T: for<'de> Deserialize<'de>>(
    command: &'static str,
    data: Value,
) -> Result<Vec<T>, Error> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    let table: DataTable<T> = serde_json::from_value(data).map_err(malformed(command))?;
    Ok(table.data)
}

pub fn decode_libraries(data: Value) -> Result<Vec<LibrarySummary>, Error> {
    decode_table("get_libraries_table", data)
}

pub fn decode_library_media(data: Value) -> Result<Vec<MediaSummaryRecord>, Error> {
    decode_table("get_library_media_info", data)
}

/// Walks `data["0"].children[*].children[*].rating_key`. No `"0"` entry means
/// the item has no cached children, which is not an error.
pub fn decode_new_rating_keys(data: Value) -> Result<Vec<RatingKey>, Error> {
    let Some(root) = data.get("0") else {
        return Ok(Vec::new());
    };
    let node: ContainerNode =
        serde_json::from_value(root.clone()).map_err(malformed("get_new_rating_keys"))?;
    Ok(node
        .children
        .into_values()
        .flat_map(|season| season.children.into_values())
        .map(|leaf| leaf.rating_key)
        .collect())
}

/// `Ok(None)` for an empty payload (unknown key) or an item without a media part.
pub fn decode_metadata(data: Value) -> Result<Option<MediaDetailRecord>, Error> {
    let empty = match &data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        return Ok(None);
    }
    let payload: MetadataPayload =
        serde_json::from_value(data).map_err(malformed("get_metadata"))?;
    Ok(payload.into_detail())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_i64<E: de::Error>(self) -> Result<Option<i64>, E> {
        match self {
            Scalar::Int(value) => Ok(Some(value)),
            Scalar::Float(value) => Ok(Some(value as i64)),
            Scalar::Text(text) if text.trim().is_empty() => Ok(None),
            Scalar::Text(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("expected integer, got {text:?}"))),
        }
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Scalar::deserialize(deserializer)?
        .into_i64::<D::Error>()?
        .ok_or_else(|| de::Error::custom("expected integer, got empty string"))
}

fn lenient_opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        Some(scalar) => scalar.into_i64(),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_library_media_accepts_strings_and_nulls() {
        let rows = decode_library_media(json!({
            "data": [
                {"rating_key": "101", "parent_rating_key": "", "added_at": "1700000000",
                 "play_count": null, "title": "Heat", "media_type": "movie"},
                {"rating_key": 202, "parent_rating_key": 20, "added_at": 1700000500,
                 "play_count": 3, "title": "Dark", "media_type": "show"}
            ]
        }))
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rating_key, RatingKey(101));
        assert_eq!(rows[0].parent_rating_key, None);
        assert_eq!(rows[0].play_count, None);
        assert_eq!(rows[1].play_count, Some(3));
        assert!(rows[1].media_type.is_container());
        assert!(!rows[0].media_type.is_container());
    }

    #[test]
    fn test_unknown_media_type_decodes_as_other() {
        let rows = decode_library_media(json!({
            "data": [{"rating_key": 1, "added_at": 1, "media_type": "clip"}]
        }))
        .unwrap();
        assert_eq!(rows[0].media_type, MediaType::Other);
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let err = decode_library_media(json!({"data": [{"rating_key": 1}]})).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedResponse { command: "get_library_media_info", .. }
        ));
    }

    #[test]
    fn test_null_table_is_empty() {
        assert!(decode_libraries(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_new_rating_keys_walks_two_levels() {
        let mut keys = decode_new_rating_keys(json!({
            "0": {
                "rating_key": 500,
                "children": {
                    "1": {"rating_key": 510, "children": {
                        "1": {"rating_key": 511}, "2": {"rating_key": 512}
                    }},
                    "2": {"rating_key": 520, "children": {
                        "1": {"rating_key": "521"}
                    }}
                }
            }
        }))
        .unwrap();
        keys.sort();
        assert_eq!(keys, vec![RatingKey(511), RatingKey(512), RatingKey(521)]);
    }

    #[test]
    fn test_new_rating_keys_without_root_entry_is_empty() {
        assert!(decode_new_rating_keys(json!({})).unwrap().is_empty());
        assert!(decode_new_rating_keys(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_metadata_takes_first_part() {
        let detail = decode_metadata(json!({
            "rating_key": "511",
            "parent_rating_key": "510",
            "added_at": "1700000000",
            "title": "Pilot",
            "grandparent_title": "Dark",
            "media_type": "episode",
            "media_info": [
                {"parts": [{"file": "/data/tv/Dark/S01E01.mkv", "file_size": "1048576"},
                           {"file": "/data/tv/Dark/S01E01.part2.mkv", "file_size": 1}]},
                {"parts": [{"file": "/other.mkv", "file_size": 9}]}
            ]
        }))
        .unwrap()
        .unwrap();

        assert_eq!(detail.rating_key, RatingKey(511));
        assert_eq!(detail.parent_rating_key, Some(510));
        assert_eq!(detail.file_path, "/data/tv/Dark/S01E01.mkv");
        assert_eq!(detail.file_size, 1_048_576);
    }

    #[test]
    fn test_metadata_without_media_info_is_none() {
        let detail = decode_metadata(json!({
            "rating_key": 7, "added_at": 1, "media_type": "movie", "media_info": []
        }))
        .unwrap();
        assert!(detail.is_none());
        assert!(decode_metadata(json!({})).unwrap().is_none());
    }

    #[test]
    fn test_envelope_error_result() {
        let envelope: Envelope = serde_json::from_value(json!({
            "response": {"result": "error", "message": "Invalid apikey", "data": {}}
        }))
        .unwrap();
        let err = envelope.into_data("get_metadata").unwrap_err();
        assert!(matches!(err, Error::Api { command: "get_metadata", ref message } if message == "Invalid apikey"));
    }
}
