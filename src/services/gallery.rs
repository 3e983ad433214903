use std::sync::Arc;
use uuid::Uuid;

use crate::{
    errors::Result,
    kv::{keys, KvClient},
    models::{
        AddToGalleryResult, GalleryImage, RemoveFromGalleryResult, SaveImageRequest, UserGallery,
    },
    utils::Clock,
};

pub const MAX_GALLERY_SIZE: usize = 5;

/// Each visitor's gallery is one record rewritten in full on every change. Concurrent saves for
/// the same visitor can both pass the capacity check or drop each other's image.
#[derive(Clone)]
pub struct GalleryStore {
    kv: KvClient,
    clock: Arc<dyn Clock>,
}

impl GalleryStore {
    pub fn new(kv: KvClient, clock: Arc<dyn Clock>) -> Self {
        Self { kv, clock }
    }

    pub async fn get_gallery(&self, user_id: &str) -> Result<UserGallery> {
        let gallery = self.kv.get_json(&keys::gallery(user_id)).await?;
        Ok(gallery.unwrap_or_else(|| UserGallery::empty(user_id)))
    }

    pub async fn add_to_gallery(
        &self,
        user_id: &str,
        image_data: SaveImageRequest,
    ) -> Result<AddToGalleryResult> {
        let mut gallery = self.get_gallery(user_id).await?;

        if gallery.images.len() >= MAX_GALLERY_SIZE {
            tracing::warn!(user_id, "Gallery full, rejecting save");
            return Ok(AddToGalleryResult::GalleryFull);
        }

        let image = GalleryImage {
            id: Uuid::new_v4().to_string(),
            image_url: image_data.image_url,
            original_url: image_data.original_url,
            fabric_id: image_data.fabric_id,
            fabric_name: image_data.fabric_name,
            fabric_thumbnail_url: image_data.fabric_thumbnail_url,
            created_at: self.clock.now(),
        };

        gallery.images.insert(0, image.clone());
        self.kv
            .set_json(&keys::gallery(user_id), &gallery, None)
            .await?;

        tracing::debug!(user_id, image_id = %image.id, "Saved image to gallery");
        Ok(AddToGalleryResult::Saved(image))
    }

    /// Removing an id that is not in the gallery is a successful no-op.
    pub async fn remove_from_gallery(
        &self,
        user_id: &str,
        image_id: &str,
    ) -> Result<RemoveFromGalleryResult> {
        let mut gallery = self.get_gallery(user_id).await?;
        gallery.images.retain(|image| image.id != image_id);

        self.kv
            .set_json(&keys::gallery(user_id), &gallery, None)
            .await?;

        Ok(RemoveFromGalleryResult {
            success: true,
            remaining_count: gallery.images.len(),
        })
    }

    pub async fn get_gallery_image(
        &self,
        user_id: &str,
        image_id: &str,
    ) -> Result<Option<GalleryImage>> {
        let gallery = self.get_gallery(user_id).await?;
        Ok(gallery.images.into_iter().find(|image| image.id == image_id))
    }
}
