//! Paginated, filtered listing of the images under a prefix

use object_storage::{ListOptions, ObjectEntry, SortBy, StorageClient};
use tracing::{debug, instrument};

/// File extensions shown in the gallery, matched case-insensitively
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// Whether `name` ends in `.<ext>` for one of [`IMAGE_EXTENSIONS`]
#[must_use]
pub fn is_image_name(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
}

/// Whether a listing entry is a file rather than a nested folder
///
/// Backends disagree on the entry shape: an entry with an id is always a
/// file, one without an id only when it carries a name and metadata.
#[must_use]
pub fn is_file_entry(entry: &ObjectEntry) -> bool {
    entry.id.is_some() || (!entry.name.is_empty() && entry.metadata.is_some())
}

/// Joins a listing prefix and an entry name into an object path
#[must_use]
pub fn object_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Collects the paths of every image directly under `prefix`
///
/// Pages of `page_size` entries are requested in name order until a page
/// comes back empty or short. A failing page ends the walk and whatever was
/// gathered so far is returned: a prefix nobody uploaded to yet is reported
/// as an error by some backends.
#[instrument(skip(storage))]
pub async fn list_image_paths(
    storage: &dyn StorageClient,
    bucket: &str,
    prefix: &str,
    page_size: usize,
) -> Vec<String> {
    let page_size = page_size.max(1);
    let mut paths = Vec::new();
    let mut page = 0;

    loop {
        let options = ListOptions {
            limit: page_size,
            offset: page * page_size,
            sort_by: SortBy::name_ascending(),
        };

        let entries = match storage.list(bucket, prefix, &options).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Listing {bucket}/{prefix} stopped at page {page}: {e}");
                return paths;
            }
        };

        paths.extend(
            entries
                .iter()
                .filter(|entry| is_file_entry(entry) && is_image_name(&entry.name))
                .map(|entry| object_path(prefix, &entry.name)),
        );

        if entries.len() < page_size {
            break;
        }
        page += 1;
    }

    paths
}
