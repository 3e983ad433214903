use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved visualization. The fabric fields are a snapshot taken when the image was saved and
/// are never refreshed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    /// Minted as a UUID v4 but compared as an opaque string.
    pub id: String,
    pub image_url: String,
    pub original_url: String,
    pub fabric_id: String,
    pub fabric_name: String,
    pub fabric_thumbnail_url: String,
    pub created_at: DateTime<Utc>,
}

/// Newest first, at most [`MAX_GALLERY_SIZE`](crate::services::gallery::MAX_GALLERY_SIZE) entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGallery {
    pub user_id: String,
    pub images: Vec<GalleryImage>,
}

impl UserGallery {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveImageRequest {
    pub image_url: String,
    pub original_url: String,
    pub fabric_id: String,
    pub fabric_name: String,
    pub fabric_thumbnail_url: String,
}

impl SaveImageRequest {
    pub fn is_complete(&self) -> bool {
        [
            &self.image_url,
            &self.original_url,
            &self.fabric_id,
            &self.fabric_name,
            &self.fabric_thumbnail_url,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddToGalleryResult {
    Saved(GalleryImage),
    GalleryFull,
}

impl AddToGalleryResult {
    pub fn is_saved(&self) -> bool {
        matches!(self, AddToGalleryResult::Saved(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromGalleryResult {
    pub success: bool,
    pub remaining_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryResponse {
    pub images: Vec<GalleryImage>,
    pub count: usize,
    pub max_allowed: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveImageRequest {
    pub image_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveImageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<GalleryImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl From<AddToGalleryResult> for SaveImageResponse {
    fn from(result: AddToGalleryResult) -> Self {
        match result {
            AddToGalleryResult::Saved(image) => Self {
                success: true,
                image: Some(image),
                error: None,
            },
            AddToGalleryResult::GalleryFull => Self {
                success: false,
                image: None,
                error: Some("gallery_full"),
            },
        }
    }
}
