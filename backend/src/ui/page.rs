//! Server-rendered gallery page

use maud::{html, Markup, PreEscaped, DOCTYPE};
use object_storage::Bucket;
use url::form_urlencoded;

use crate::gallery::{
    render::{PLACEHOLDER_HINT, PLACEHOLDER_TITLE},
    BucketLink, GalleryTile, GalleryView, Lightbox, StatusMessage,
};

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #111827; color: #f9fafb; }
main { max-width: 960px; margin: 0 auto; padding: 24px; }
section { margin-bottom: 24px; }
.status { min-height: 1.2em; margin: 8px 0; }
.status-info { color: #d1d5db; }
.status-ok { color: #10b981; }
.status-error { color: #ef4444; }
#dropZone { border: 2px dashed #4b5563; border-radius: 8px; padding: 32px; text-align: center; cursor: pointer; }
#dropZone.drag-over { border-color: #10b981; background: #1f2937; }
#filePicker { display: none; }
#bucketLink a { color: #facc15; }
#fileList { display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 12px; }
.gallery-item img { width: 100%; height: 160px; object-fit: cover; border-radius: 6px; }
.gallery-placeholder { grid-column: 1 / -1; text-align: center; color: #9ca3af; }
#lightbox { position: fixed; inset: 0; display: none; align-items: center; justify-content: center; flex-direction: column; background: rgba(0, 0, 0, 0.85); }
#lightbox[data-open] { display: flex; }
#lightboxImage { max-width: 90vw; max-height: 80vh; }
#lightboxClose { position: absolute; top: 16px; right: 24px; color: #f9fafb; font-size: 32px; text-decoration: none; }
"#;

const SCRIPT: &str = r#"
(() => {
  const byId = (id) => document.getElementById(id);
  const setStatus = (el, text) => { el.textContent = text; el.className = "status status-info"; };

  const createForm = byId("createBucketForm");
  createForm.addEventListener("submit", () => setStatus(byId("createBucketStatus"), "Creating bucket…"));

  const galleryForm = byId("galleryForm");
  const dropZone = byId("dropZone");
  const picker = byId("filePicker");
  const uploadStatus = byId("uploadStatus");

  const upload = (files) => {
    if (!files || !files.length) return;
    picker.files = files;
    setStatus(uploadStatus, `Uploading ${files.length} file(s)…`);
    galleryForm.submit();
  };

  ["dragenter", "dragover"].forEach((evt) => dropZone.addEventListener(evt, (e) => {
    e.preventDefault(); e.stopPropagation(); dropZone.classList.add("drag-over");
  }));
  ["dragleave", "drop"].forEach((evt) => dropZone.addEventListener(evt, (e) => {
    e.preventDefault(); e.stopPropagation(); dropZone.classList.remove("drag-over");
  }));
  dropZone.addEventListener("drop", (e) => upload(e.dataTransfer.files));
  dropZone.addEventListener("click", () => picker.click());
  byId("selectFileBtn").addEventListener("click", () => picker.click());
  picker.addEventListener("change", (e) => upload(e.target.files));
  byId("loadGalleryBtn").addEventListener("click", () => setStatus(uploadStatus, "Loading gallery…"));

  const lightbox = byId("lightbox");
  const close = () => { if (lightbox.hasAttribute("data-open")) window.location.assign(byId("lightboxClose").href); };
  lightbox.addEventListener("click", (e) => { if (e.target === lightbox) close(); });
  document.addEventListener("keydown", (e) => { if (e.key === "Escape") close(); });
})();
"#;

/// Everything the page shows
#[derive(Debug, Default)]
pub struct PageState {
    /// Options of the bucket selector
    pub buckets: Vec<Bucket>,
    /// Bucket selected in the selector
    pub selected: String,
    /// Status line of bucket creation and bucket listing
    pub create_status: Option<StatusMessage>,
    /// Status line of uploads and gallery loads
    pub upload_status: Option<StatusMessage>,
    /// Gallery grid contents
    pub gallery: Option<GalleryView>,
    /// Dashboard link of the loaded bucket
    pub bucket_link: Option<BucketLink>,
    /// Overlay state
    pub lightbox: Lightbox,
}

/// Gallery URL of `bucket`, optionally with the tile at `view` opened
fn gallery_href(bucket: &str, view: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("bucket", bucket);
    if let Some(path) = view {
        query.append_pair("view", path);
    }
    format!("/gallery?{}", query.finish())
}

fn status_line(id: &str, status: Option<&StatusMessage>) -> Markup {
    match status {
        Some(status) => html! {
            p.status.(status.tone.css_class()) id=(id) { (status.text) }
        },
        None => html! { p.status id=(id) {} },
    }
}

fn tile(bucket: &str, tile: &GalleryTile) -> Markup {
    html! {
        a.gallery-item href=(gallery_href(bucket, Some(&tile.path))) title=(tile.caption) {
            img src=(tile.url) alt=(tile.caption) loading="lazy";
        }
    }
}

fn gallery_grid(bucket: &str, gallery: Option<&GalleryView>) -> Markup {
    html! {
        div #fileList {
            @match gallery {
                Some(GalleryView::Tiles(tiles)) => {
                    @for t in tiles { (tile(bucket, t)) }
                }
                Some(GalleryView::Empty) | None => {
                    div.gallery-placeholder {
                        p { (PLACEHOLDER_TITLE) }
                        span { (PLACEHOLDER_HINT) }
                    }
                }
            }
        }
    }
}

fn lightbox(bucket: &str, lightbox: &Lightbox) -> Markup {
    html! {
        div #lightbox data-open[lightbox.is_open()] {
            a #lightboxClose href=(gallery_href(bucket, None)) aria-label="Close" { "×" }
            @if lightbox.is_open() {
                img #lightboxImage src=(lightbox.image_url()) alt=(lightbox.caption());
            } @else {
                img #lightboxImage alt="";
            }
            p #lightboxCaption { (lightbox.caption()) }
        }
    }
}

/// Renders the full page
#[must_use]
pub fn render(state: &PageState) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Image Gallery" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                main {
                    h1 { "Image Gallery" }

                    section {
                        h2 { "Create a bucket" }
                        form #createBucketForm method="post" action="/buckets" {
                            input #bucketNameInput type="text" name="name" placeholder="Bucket name";
                            button #createBucketBtn type="submit" { "Create Bucket" }
                        }
                        (status_line("createBucketStatus", state.create_status.as_ref()))
                    }

                    section {
                        h2 { "Upload images" }
                        form #galleryForm method="post" action="/uploads" enctype="multipart/form-data" {
                            select #bucketSelect name="bucket" {
                                option value="" { "-- Select a Bucket --" }
                                @for bucket in &state.buckets {
                                    option value=(bucket.name) selected[bucket.name == state.selected] {
                                        (bucket.name)
                                    }
                                }
                            }
                            div #dropZone { "Drop images here or click to pick files" }
                            input #filePicker type="file" name="files" multiple accept="image/*";
                            button #selectFileBtn type="button" { "Select Files" }
                            button #loadGalleryBtn type="submit" formaction="/gallery" formmethod="get" {
                                "Load Gallery"
                            }
                        }
                        (status_line("uploadStatus", state.upload_status.as_ref()))
                        div #bucketLink {
                            @if let Some(link) = &state.bucket_link {
                                a href=(link.href) target="_blank" rel="noopener noreferrer" { (link.label) }
                            }
                        }
                    }

                    section {
                        (gallery_grid(&state.selected, state.gallery.as_ref()))
                    }
                }
                (lightbox(&state.selected, &state.lightbox))
                script { (PreEscaped(SCRIPT)) }
            }
        }
    }
}
