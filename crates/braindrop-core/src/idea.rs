use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::tags::normalize_tags;

/// Opaque idea identifier.
///
/// New ids are UUID v4 strings; ids written by older builds (millisecond
/// counters) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(String);

impl IdeaId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdeaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IdeaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How an idea was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaType {
    Text,
    Voice,
    Image,
}

impl IdeaType {
    pub const ALL: [IdeaType; 3] = [IdeaType::Text, IdeaType::Voice, IdeaType::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaType::Text => "text",
            IdeaType::Voice => "voice",
            IdeaType::Image => "image",
        }
    }
}

impl fmt::Display for IdeaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for IdeaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(IdeaType::Text),
            "voice" => Ok(IdeaType::Voice),
            "image" => Ok(IdeaType::Image),
            other => Err(format!("unknown idea type: {}", other)),
        }
    }
}

/// Type-specific payload of an idea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdeaKind {
    Text {
        content: String,
    },
    Voice {
        recording_uri: Option<String>,
        description: Option<String>,
    },
    Image {
        uri: Option<String>,
        description: Option<String>,
    },
}

impl IdeaKind {
    pub fn idea_type(&self) -> IdeaType {
        match self {
            IdeaKind::Text { .. } => IdeaType::Text,
            IdeaKind::Voice { .. } => IdeaType::Voice,
            IdeaKind::Image { .. } => IdeaType::Image,
        }
    }

    /// Body text; empty for voice and image ideas.
    pub fn content(&self) -> &str {
        match self {
            IdeaKind::Text { content } => content,
            _ => "",
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            IdeaKind::Text { .. } => None,
            IdeaKind::Voice { description, .. } | IdeaKind::Image { description, .. } => {
                description.as_deref()
            }
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            IdeaKind::Image { uri, .. } => uri.as_deref(),
            _ => None,
        }
    }

    pub fn recording_uri(&self) -> Option<&str> {
        match self {
            IdeaKind::Voice { recording_uri, .. } => recording_uri.as_deref(),
            _ => None,
        }
    }

    /// Trim text fields; blank optional fields become `None`.
    pub(crate) fn normalized(self) -> Self {
        match self {
            IdeaKind::Text { content } => IdeaKind::Text {
                content: content.trim().to_string(),
            },
            IdeaKind::Voice {
                recording_uri,
                description,
            } => IdeaKind::Voice {
                recording_uri: non_blank(recording_uri),
                description: non_blank(description),
            },
            IdeaKind::Image { uri, description } => IdeaKind::Image {
                uri: non_blank(uri),
                description: non_blank(description),
            },
        }
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check the rules every persisted idea satisfies: a non-blank title, and
/// non-blank content for text ideas.
pub fn validate(title: &str, kind: &IdeaKind) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if let IdeaKind::Text { content } = kind {
        if content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
    }
    Ok(())
}

/// A captured idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IdeaRecord", into = "IdeaRecord")]
pub struct Idea {
    pub id: IdeaId,
    pub title: String,
    pub kind: IdeaKind,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    pub fn idea_type(&self) -> IdeaType {
        self.kind.idea_type()
    }

    pub fn content(&self) -> &str {
        self.kind.content()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&self.title, &self.kind)
    }
}

/// Caller-supplied fields for a new idea. Id and timestamps are assigned by
/// the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdea {
    pub title: String,
    pub kind: IdeaKind,
    pub tags: Vec<String>,
    pub is_favorite: bool,
}

impl NewIdea {
    pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            title,
            IdeaKind::Text {
                content: content.into(),
            },
        )
    }

    pub fn voice(title: impl Into<String>, recording_uri: impl Into<String>) -> Self {
        Self::new(
            title,
            IdeaKind::Voice {
                recording_uri: Some(recording_uri.into()),
                description: None,
            },
        )
    }

    pub fn image(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self::new(
            title,
            IdeaKind::Image {
                uri: Some(uri.into()),
                description: None,
            },
        )
    }

    pub fn new(title: impl Into<String>, kind: IdeaKind) -> Self {
        Self {
            title: title.into(),
            kind,
            tags: Vec::new(),
            is_favorite: false,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a description. Ignored for text ideas.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        match &mut self.kind {
            IdeaKind::Voice { description, .. } | IdeaKind::Image { description, .. } => {
                *description = Some(text.into());
            }
            IdeaKind::Text { .. } => {}
        }
        self
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&self.title, &self.kind)
    }
}

/// Flat persisted shape of an idea.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdeaRecord {
    id: IdeaId,
    #[serde(rename = "type")]
    idea_type: IdeaType,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recording_uri: Option<String>,
    #[serde(with = "crate::timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default, with = "crate::timestamp::lenient")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<IdeaRecord> for Idea {
    fn from(r: IdeaRecord) -> Self {
        let description = fold_legacy_content(&r.id, r.idea_type, r.content.clone(), r.description);
        let updated_at = r.updated_at.unwrap_or_else(|| {
            tracing::warn!(idea = %r.id, "unreadable updatedAt, using createdAt");
            r.created_at
        });
        let kind = match r.idea_type {
            IdeaType::Text => IdeaKind::Text { content: r.content },
            IdeaType::Voice => IdeaKind::Voice {
                recording_uri: non_blank(r.recording_uri),
                description,
            },
            IdeaType::Image => IdeaKind::Image {
                uri: non_blank(r.uri),
                description,
            },
        };
        Idea {
            id: r.id,
            title: r.title,
            kind,
            tags: normalize_tags(&r.tags),
            is_favorite: r.is_favorite,
            created_at: r.created_at,
            updated_at,
        }
    }
}

/// Voice and image records from older builds may carry caption text in
/// `content`; keep it by moving it into the description.
fn fold_legacy_content(
    id: &IdeaId,
    idea_type: IdeaType,
    content: String,
    description: Option<String>,
) -> Option<String> {
    let description = non_blank(description);
    if idea_type == IdeaType::Text {
        return description;
    }
    let content = content.trim();
    if content.is_empty() {
        return description;
    }
    tracing::warn!(idea = %id, "moving legacy {} content into description", idea_type);
    match description {
        Some(d) if d == content => Some(d),
        Some(d) => Some(format!("{}\n\n{}", d, content)),
        None => Some(content.to_string()),
    }
}

impl From<Idea> for IdeaRecord {
    fn from(idea: Idea) -> Self {
        let idea_type = idea.idea_type();
        let (content, description, uri, recording_uri) = match idea.kind {
            IdeaKind::Text { content } => (content, None, None, None),
            IdeaKind::Voice {
                recording_uri,
                description,
            } => (String::new(), description, None, recording_uri),
            IdeaKind::Image { uri, description } => (String::new(), description, uri, None),
        };
        IdeaRecord {
            id: idea.id,
            idea_type,
            title: idea.title,
            content,
            description,
            tags: idea.tags,
            is_favorite: idea.is_favorite,
            uri,
            recording_uri,
            created_at: idea.created_at,
            updated_at: Some(idea.updated_at),
        }
    }
}
