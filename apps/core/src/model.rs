use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Course,
    Teacher,
    Room,
    Schedule,
    Student,
    Department,
    #[serde(other)]
    Unknown,
}

impl EntityType {
    pub const KNOWN: [EntityType; 6] = [
        EntityType::Course,
        EntityType::Teacher,
        EntityType::Room,
        EntityType::Schedule,
        EntityType::Student,
        EntityType::Department,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Teacher => "teacher",
            Self::Room => "room",
            Self::Schedule => "schedule",
            Self::Student => "student",
            Self::Department => "department",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "course" | "courses" => Some(Self::Course),
            "teacher" | "teachers" => Some(Self::Teacher),
            "room" | "rooms" => Some(Self::Room),
            "schedule" | "schedules" => Some(Self::Schedule),
            "student" | "students" => Some(Self::Student),
            "department" | "departments" => Some(Self::Department),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Course => "Course",
            Self::Teacher => "Teacher",
            Self::Room => "Room",
            Self::Schedule => "Schedule",
            Self::Student => "Student",
            Self::Department => "Department",
            Self::Unknown => "Other",
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityFilter {
    #[default]
    All,
    Only(EntityType),
}

impl EntityFilter {
    pub fn options() -> Vec<EntityFilter> {
        std::iter::once(Self::All)
            .chain(EntityType::KNOWN.iter().copied().map(Self::Only))
            .collect()
    }

    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        EntityType::parse(value).map(Self::Only)
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(entity) => entity.as_str(),
        }
    }

    pub fn matches(self, entity: EntityType) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == entity,
        }
    }
}

impl Display for EntityFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Recent,
    Popular,
    Derived,
    Filter,
}

impl SuggestionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Popular => "popular",
            Self::Derived => "suggested",
            Self::Filter => "filter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEntry {
    pub id: String,
    pub text: String,
    pub kind: SuggestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl SuggestionEntry {
    pub fn new(id: &str, text: &str, kind: SuggestionKind) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            kind,
            category: None,
            count: None,
        }
    }
}

// `code` feeds navigation; the rest of the map stays opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    #[serde(
        default,
        deserialize_with = "code_as_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl EntityMetadata {
    pub fn with_code(code: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            extra: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        if key == "code" {
            return self.code.as_deref();
        }
        self.extra.get(key).and_then(Value::as_str)
    }
}

fn code_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(code)) => Some(code),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    pub id: String,
    pub entity_type: EntityType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub relevance: f64,
    #[serde(default)]
    pub metadata: EntityMetadata,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ResultEntry {
    pub fn new(id: &str, entity_type: EntityType, title: &str, relevance: f64) -> Self {
        Self {
            id: id.to_string(),
            entity_type,
            title: title.to_string(),
            description: String::new(),
            category: entity_type.label().to_string(),
            relevance,
            metadata: EntityMetadata::default(),
            is_favorite: false,
            timestamp: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_metadata(mut self, metadata: EntityMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }
}
