//! Key layout shared with every other reader of the store. Changing a format here orphans
//! existing data.

use uuid::Uuid;

use crate::models::FabricCategory;

pub const FABRIC_INDEX: &str = "fabrics:index";

pub fn fabric(id: Uuid) -> String {
    format!("fabric:{}", id)
}

pub fn fabrics_by_category(category: FabricCategory) -> String {
    format!("fabrics:category:{}", category.as_str())
}

pub fn rate_limit(user_id: &str) -> String {
    format!("ratelimit:{}", user_id)
}

pub fn gallery(user_id: &str) -> String {
    format!("gallery:{}", user_id)
}
