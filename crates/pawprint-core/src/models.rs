//! Domain models for uploads and slugs

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::category::Category;
use crate::error::AppError;

/// Raw upload as handed over by the submission form
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Bytes,
    pub filename: String,
    /// Declared mime type, as reported by the client
    pub content_type: String,
    pub category: Category,
    pub owner_id: Option<String>,
}

impl UploadRequest {
    pub fn new(
        data: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            category,
            owner_id: None,
        }
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Object as written to the storage backend
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StorageObject {
    pub path: String,
    pub url: String,
    pub category: Category,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Successful upload result handed back to callers
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UploadedAsset {
    pub url: String,
    pub path: String,
}

impl From<&StorageObject> for UploadedAsset {
    fn from(object: &StorageObject) -> Self {
        Self {
            url: object.url.clone(),
            path: object.path.clone(),
        }
    }
}

/// Kinds of records that carry a slug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Pet,
    Ong,
    Event,
    Partner,
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pet" => Ok(EntityKind::Pet),
            "ong" => Ok(EntityKind::Ong),
            "event" => Ok(EntityKind::Event),
            "partner" => Ok(EntityKind::Partner),
            _ => Err(AppError::InvalidInput(format!("Unknown entity kind: {}", s))),
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EntityKind::Pet => write!(f, "pet"),
            EntityKind::Ong => write!(f, "ong"),
            EntityKind::Event => write!(f, "event"),
            EntityKind::Partner => write!(f, "partner"),
        }
    }
}

/// Identifying attributes a slug is derived from
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlugAttributes {
    pub name: Option<String>,
    /// Pet status (`lost`, `found`, `adoption`) or event/partner category
    pub kind: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub date: Option<NaiveDate>,
}

impl SlugAttributes {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_location(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self.state = Some(state.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}
