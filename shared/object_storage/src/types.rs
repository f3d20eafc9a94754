//! Request and response shapes shared by every storage backend

use serde::{Deserialize, Serialize};

/// A top-level container of objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket name, unique per backend
    pub name: String,
    /// Whether objects can be read without credentials
    #[serde(default)]
    pub public: bool,
}

/// Options for bucket creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketOptions {
    /// Create the bucket with unauthenticated read access
    pub public: bool,
}

/// Options for a single object upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Cache lifetime in seconds, sent as `max-age`
    pub cache_control: String,
    /// Overwrite an existing object at the same path
    pub upsert: bool,
    /// MIME type stored with the object
    pub content_type: String,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            cache_control: "3600".to_string(),
            upsert: false,
            content_type: mime::APPLICATION_OCTET_STREAM.to_string(),
        }
    }
}

/// Sort direction for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

/// Column and direction used to order a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    /// Column to sort on, `name` for every backend
    pub column: String,
    /// Sort direction
    pub order: SortOrder,
}

impl SortBy {
    /// Name ascending, the only ordering the gallery relies on
    #[must_use]
    pub fn name_ascending() -> Self {
        Self {
            column: "name".to_string(),
            order: SortOrder::Asc,
        }
    }
}

/// Pagination window for a listing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOptions {
    /// Maximum number of entries to return
    pub limit: usize,
    /// Number of entries to skip
    pub offset: usize,
    /// Ordering of the entries
    #[serde(rename = "sortBy")]
    pub sort_by: SortBy,
}

/// One entry of a listing page
///
/// The shape follows the Supabase listing: files carry an `id` and a
/// `metadata` object, nested folders carry neither. Other backends fill in
/// whichever of the two they know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Entry name relative to the listed prefix
    #[serde(default)]
    pub name: String,
    /// Backend identifier of the object, absent for folders
    #[serde(default)]
    pub id: Option<String>,
    /// Free-form object metadata, absent for folders
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl ObjectEntry {
    /// Builds a folder entry
    #[must_use]
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            metadata: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_options_use_supabase_field_names() {
        let options = ListOptions {
            limit: 100,
            offset: 200,
            sort_by: SortBy::name_ascending(),
        };

        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value,
            json!({
                "limit": 100,
                "offset": 200,
                "sortBy": { "column": "name", "order": "asc" }
            })
        );
    }

    #[test]
    fn test_object_entry_tolerates_null_fields() {
        let folder: ObjectEntry =
            serde_json::from_value(json!({ "name": "thumbs", "id": null, "metadata": null }))
                .unwrap();
        assert_eq!(folder, ObjectEntry::folder("thumbs"));

        let file: ObjectEntry = serde_json::from_value(json!({
            "name": "a.png",
            "id": "0b1c",
            "updated_at": "2024-01-01T00:00:00Z",
            "metadata": { "size": 12, "mimetype": "image/png" }
        }))
        .unwrap();
        assert_eq!(file.id.as_deref(), Some("0b1c"));
        assert!(file.metadata.is_some());
    }
}
