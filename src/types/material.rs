//! Learning materials and the classifier's verdict about them.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Kind of learning resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    /// Video lesson.
    Video,
    /// Written article.
    Article,
    /// Book or e-book.
    Book,
    /// Structured course.
    Course,
    /// Practice exercise set.
    Exercise,
}

impl MaterialType {
    /// Every known material type.
    pub const ALL: [Self; 5] = [
        Self::Video,
        Self::Article,
        Self::Book,
        Self::Course,
        Self::Exercise,
    ];

    /// Wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Article => "article",
            Self::Book => "book",
            Self::Course => "course",
            Self::Exercise => "exercise",
        }
    }

    /// Icon shown when a material has no thumbnail.
    #[must_use]
    pub const fn fallback_icon(self) -> &'static str {
        match self {
            Self::Video => "/icons/video-icon.png",
            Self::Article => "/icons/article-icon.png",
            Self::Book => "/icons/book-icon.png",
            Self::Course => "/icons/course-icon.png",
            Self::Exercise => "/icons/exercise-icon.png",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known material type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownMaterialType(pub String);

impl fmt::Display for UnknownMaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown material type: {}", self.0)
    }
}

impl std::error::Error for UnknownMaterialType {}

impl FromStr for MaterialType {
    type Err = UnknownMaterialType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| UnknownMaterialType(s.to_string()))
    }
}

/// A recommended learning resource, read from the material store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Store identifier (numeric ids are kept as their decimal string).
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Title.
    pub title: String,
    /// Short description. A null column reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Resource kind.
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    /// Subject the resource belongs to.
    pub subject: String,
    /// Link to the resource.
    pub url: String,
    /// Optional thumbnail image.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Optional human-readable duration ("12 menit").
    #[serde(default)]
    pub duration: Option<String>,
    /// Optional author.
    #[serde(default)]
    pub author: Option<String>,
    /// Creation time in the store. Timestamps without an offset are UTC.
    #[serde(deserialize_with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Material {
    /// Thumbnail URL, or the type's fallback icon.
    #[must_use]
    pub fn thumbnail_or_fallback(&self) -> &str {
        self.thumbnail_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.material_type.fallback_icon())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Naive layouts PostgREST emits for `timestamp` columns.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn utc_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(stamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(stamp.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Classifier verdict on whether a message explicitly asks for materials.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialAnalysis {
    /// The user asked for study materials.
    pub is_request: bool,
    /// Requested subject, when the user named one the store covers.
    pub subject: Option<String>,
    /// Requested material type, when recognized.
    #[serde(rename = "type")]
    pub material_type: Option<MaterialType>,
}

impl MaterialAnalysis {
    /// Verdict used whenever classification is impossible or fails.
    #[must_use]
    pub const fn not_a_request() -> Self {
        Self {
            is_request: false,
            subject: None,
            material_type: None,
        }
    }
}
