use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Separator between bucket and key in the persisted `video_url` form.
pub const LOCATION_DELIMITER: char = ',';

/// A video entity as held by the metadata repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Public URL of the thumbnail asset.
    pub thumbnail_url: Option<String>,
    /// Persisted as a serialized [`StorageLocation`]; replaced with a signed URL
    /// only on the way out.
    pub video_url: Option<String>,
}

impl Video {
    pub fn new_draft(user_id: Uuid, title: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Where an uploaded object lives in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse the persisted `bucket,key` form.
    ///
    /// Anything that does not split into exactly two parts yields `None`; legacy
    /// values such as plain URLs are not locations.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split(LOCATION_DELIMITER).collect();
        match parts.as_slice() {
            [bucket, key] => Some(Self::new(*bucket, *key)),
            _ => None,
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.bucket, LOCATION_DELIMITER, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_serializes_with_delimiter() {
        let location = StorageLocation::new("tubely-videos", "landscape/abcd.mp4");
        assert_eq!(location.to_string(), "tubely-videos,landscape/abcd.mp4");
        assert_eq!(StorageLocation::parse(&location.to_string()), Some(location));
    }

    #[test]
    fn test_parse_rejects_wrong_part_count() {
        assert_eq!(StorageLocation::parse("https://cdn.example.com/v.mp4"), None);
        assert_eq!(StorageLocation::parse("a,b,c"), None);
        assert_eq!(StorageLocation::parse(""), None);
    }

    #[test]
    fn test_ownership() {
        let owner = Uuid::new_v4();
        let video = Video::new_draft(owner, "title".into(), "desc".into());
        assert!(video.is_owned_by(owner));
        assert!(!video.is_owned_by(Uuid::new_v4()));
        assert!(video.video_url.is_none());
        assert_eq!(video.created_at, video.updated_at);
    }
}
