use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FabricCategory {
    Cotton,
    Velvet,
    Linen,
    Leather,
    Microfiber,
    Wool,
    Synthetic,
    Patterned,
}

impl FabricCategory {
    pub const ALL: [FabricCategory; 8] = [
        FabricCategory::Cotton,
        FabricCategory::Velvet,
        FabricCategory::Linen,
        FabricCategory::Leather,
        FabricCategory::Microfiber,
        FabricCategory::Wool,
        FabricCategory::Synthetic,
        FabricCategory::Patterned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FabricCategory::Cotton => "cotton",
            FabricCategory::Velvet => "velvet",
            FabricCategory::Linen => "linen",
            FabricCategory::Leather => "leather",
            FabricCategory::Microfiber => "microfiber",
            FabricCategory::Wool => "wool",
            FabricCategory::Synthetic => "synthetic",
            FabricCategory::Patterned => "patterned",
        }
    }
}

impl fmt::Display for FabricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FabricCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FabricCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("Unknown fabric category: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fabric {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub category: FabricCategory,
    pub description: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub color_hex: String,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricInput {
    pub name: String,
    pub category: FabricCategory,
    pub description: String,
    pub color_hex: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricUpdate {
    pub name: Option<String>,
    pub category: Option<FabricCategory>,
    pub description: Option<String>,
    pub color_hex: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl FabricUpdate {
    pub fn apply_to(self, fabric: &mut Fabric) {
        if let Some(name) = self.name {
            fabric.name = name;
        }
        if let Some(category) = self.category {
            fabric.category = category;
        }
        if let Some(description) = self.description {
            fabric.description = description;
        }
        if let Some(color_hex) = self.color_hex {
            fabric.color_hex = color_hex;
        }
        if let Some(tags) = self.tags {
            fabric.tags = tags;
        }
        if let Some(is_active) = self.is_active {
            fabric.is_active = is_active;
        }
        if let Some(sort_order) = self.sort_order {
            fabric.sort_order = sort_order;
        }
        if let Some(image_url) = self.image_url {
            fabric.image_url = image_url;
        }
        if let Some(thumbnail_url) = self.thumbnail_url {
            fabric.thumbnail_url = thumbnail_url;
        }
    }
}

/// Admin create payload. Images are hosted elsewhere, so the caller hands over final URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFabricRequest {
    pub name: Option<String>,
    pub category: Option<FabricCategory>,
    pub description: Option<String>,
    pub color_hex: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FabricListQuery {
    pub category: Option<FabricCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub fabrics_checked: usize,
    pub dangling_entries_removed: usize,
    pub missing_entries_added: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in FabricCategory::ALL {
            assert_eq!(category.as_str().parse::<FabricCategory>(), Ok(category));
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                json!(category.as_str())
            );
        }
        assert!("tweed".parse::<FabricCategory>().is_err());
    }

    #[test]
    fn test_fabric_reads_camel_case_record() {
        let fabric: Fabric = serde_json::from_value(json!({
            "id": "4a3c43f5-0b3e-4d55-9a8e-7c2b0e0f4d21",
            "name": "Royal Velvet",
            "slug": "royal-velvet-Ab3_9z",
            "category": "velvet",
            "description": "Deep blue velvet",
            "imageUrl": "https://media.example/fabrics/royal.jpg",
            "thumbnailUrl": "https://media.example/fabrics/c_fill,w_200,h_200/royal.jpg",
            "colorHex": "#1d2a6b",
            "tags": ["blue", "plush"],
            "isActive": true,
            "sortOrder": 2,
            "createdAt": "2024-01-05T09:30:00.000Z",
            "updatedAt": "2024-01-06T09:30:00.000Z"
        }))
        .unwrap();

        assert_eq!(fabric.category, FabricCategory::Velvet);
        assert_eq!(fabric.sort_order, 2);
        assert!(fabric.is_active);
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let mut fabric: Fabric = serde_json::from_value(json!({
            "id": "4a3c43f5-0b3e-4d55-9a8e-7c2b0e0f4d21",
            "name": "Oat Linen",
            "slug": "oat-linen-x1y2z3",
            "category": "linen",
            "description": "Natural weave",
            "imageUrl": "a",
            "thumbnailUrl": "b",
            "colorHex": "#d8cbb0",
            "tags": [],
            "isActive": true,
            "sortOrder": 0,
            "createdAt": "2024-01-05T09:30:00Z",
            "updatedAt": "2024-01-05T09:30:00Z"
        }))
        .unwrap();

        FabricUpdate {
            description: Some("Washed linen".to_string()),
            sort_order: Some(7),
            ..Default::default()
        }
        .apply_to(&mut fabric);

        assert_eq!(fabric.name, "Oat Linen");
        assert_eq!(fabric.description, "Washed linen");
        assert_eq!(fabric.sort_order, 7);
        assert_eq!(fabric.category, FabricCategory::Linen);
    }
}
