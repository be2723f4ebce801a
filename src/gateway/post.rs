//! The post type shared by the gateway and the feed core.
//!
//! `Post` is a read-only copy of what the gateway stores.  The client never
//! builds one itself: identifiers and timestamps are assigned server-side, so
//! every `Post` in memory came out of a `list` or `search` response.
//!
//! ## Wire format
//!
//! ```json
//! {"id": 7, "name": "hamtaro", "body": "sunflower seeds", "created_at": "2025-01-04 10:00:00", "heart": 3, "image": "uploads/7.png"}
//! ```
//!
//! `created_at` is accepted as RFC 3339 or as the plain SQL `YYYY-MM-DD
//! HH:MM:SS` form (UTC).  Anything else decodes as an unknown time rather
//! than failing the whole snapshot.  A missing, `null` or empty `image` means
//! no image.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::FeedError;

/// Opaque post identifier assigned by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single post, as the gateway last reported it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: PostId,

    /// Display name of whoever wrote the post.
    #[serde(rename = "name")]
    pub author: String,

    pub body: String,

    /// Storage reference of the attached image, if any.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub image: Option<String>,

    /// Gateway-assigned creation time; `None` when the gateway sent none or
    /// a format we can't read.
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    /// Like counter.  Only ever replaced by a gateway-reported value.
    #[serde(rename = "heart", default)]
    pub likes: u64,
}

/// What the client sends to create a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author: String,
    pub body: String,
    pub image: Option<String>,
}

/// An image file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Read an image from disk.
    pub fn read(path: &Path) -> Result<Self, FeedError> {
        let bytes = std::fs::read(path).map_err(|source| FeedError::ImageRead {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".into());
        Ok(Self { file_name, bytes })
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        debug!(%raw, "unreadable post timestamp");
    }
    Ok(parsed)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_sql_timestamp_and_renamed_fields() {
        let json = r#"{"id": 7, "name": "hamtaro", "body": "seeds", "created_at": "2025-01-04 10:00:00", "heart": 3, "image": "uploads/7.png"}"#;
        let post: Post = serde_json::from_str(json).unwrap();

        assert_eq!(
            post,
            Post {
                id: PostId(7),
                author: "hamtaro".into(),
                body: "seeds".into(),
                image: Some("uploads/7.png".into()),
                created_at: Some(Utc.with_ymd_and_hms(2025, 1, 4, 10, 0, 0).unwrap()),
                likes: 3,
            }
        );
    }

    #[test]
    fn accepts_rfc3339_timestamps() {
        let json = r#"{"id": 1, "name": "a", "body": "b", "created_at": "2025-01-04T10:00:00+09:00", "heart": 0}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.created_at, Some(Utc.with_ymd_and_hms(2025, 1, 4, 1, 0, 0).unwrap()));
    }

    #[test]
    fn missing_null_or_empty_image_means_none() {
        for image in [r#""#, r#", "image": null"#, r#", "image": """#] {
            let json = format!(
                r#"{{"id": 1, "name": "a", "body": "b", "created_at": "2025-01-04 10:00:00", "heart": 0{image}}}"#
            );
            let post: Post = serde_json::from_str(&json).unwrap();
            assert!(post.image.is_none(), "image should be None for `{image}`");
        }
    }

    #[test]
    fn unreadable_timestamp_keeps_the_post() {
        let json = r#"{"id": 1, "name": "a", "body": "b", "created_at": "yesterday", "heart": 0}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, PostId(1));
        assert_eq!(post.created_at, None);
    }

    #[test]
    fn one_odd_timestamp_does_not_sink_the_feed() {
        let json = r#"[
            {"id": 1, "name": "a", "body": "b", "created_at": "2025-01-04 10:00:00", "heart": 0},
            {"id": 2, "name": "c", "body": "d", "created_at": "04/01/2025", "heart": 1},
            {"id": 3, "name": "e", "body": "f", "created_at": null, "heart": 2}
        ]"#;
        let posts: Vec<Post> = serde_json::from_str(json).unwrap();
        let times: Vec<bool> = posts.iter().map(|p| p.created_at.is_some()).collect();
        assert_eq!(times, vec![true, false, false]);
    }

    #[test]
    fn missing_heart_defaults_to_zero() {
        let json = r#"{"id": 1, "name": "a", "body": "b", "created_at": "2025-01-04 10:00:00"}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.likes, 0);
    }

    #[test]
    fn reading_a_missing_image_reports_the_path() {
        let err = ImagePayload::read(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }
}
