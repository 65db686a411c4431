//! Parameter types for File Share MCP tools

use std::fmt::Display;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListFolderParams {
    #[schemars(description = "Folder path relative to the share root, '/'-delimited (default: the root)")]
    #[serde(default)]
    pub path: String,

    #[schemars(description = "Maximum number of entries to return (default: the configured scan limit)")]
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PathParams {
    #[schemars(description = "File path relative to the share root, '/'-delimited")]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ImageContentParams {
    #[schemars(description = "Path of a .png, .jpg or .jpeg file relative to the share root")]
    pub path: String,

    #[schemars(description = "Shrink the image to fit this many pixels in width and height")]
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub thumb_width: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    String(String),
}

/// Accept a JSON number or a numeric string; null and blank strings are `None`.
pub fn deserialize_lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<NumberOrString<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid number {:?}: {}", s, e))),
    }
}
