use futures::future::try_join_all;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    errors::Result,
    kv::{keys, KvClient},
    models::{Fabric, FabricCategory, FabricInput, FabricUpdate, ReconcileReport},
    utils::{slug, Clock},
};

/// Fabric records plus two kinds of index sets: `fabrics:index` for every fabric and one
/// `fabrics:category:<category>` set per category.
///
/// Index maintenance is a sequence of independent writes. A failure part-way leaves the sets
/// out of step with the records; reads skip ids without a record and `reconcile_indexes`
/// repairs the rest.
#[derive(Clone)]
pub struct FabricCatalog {
    kv: KvClient,
    clock: Arc<dyn Clock>,
}

impl FabricCatalog {
    pub fn new(kv: KvClient, clock: Arc<dyn Clock>) -> Self {
        Self { kv, clock }
    }

    pub async fn create_fabric(
        &self,
        input: FabricInput,
        image_url: String,
        thumbnail_url: String,
    ) -> Result<Fabric> {
        let now = self.clock.now();
        let fabric = Fabric {
            id: Uuid::new_v4(),
            slug: slug::create_slug(&input.name),
            name: input.name,
            category: input.category,
            description: input.description,
            image_url,
            thumbnail_url,
            color_hex: input.color_hex,
            tags: input.tags,
            is_active: input.is_active.unwrap_or(true),
            sort_order: input.sort_order.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        let id = fabric.id.to_string();
        self.kv.set_json(&keys::fabric(fabric.id), &fabric, None).await?;
        self.kv.set_add(keys::FABRIC_INDEX, &id).await?;
        self.kv
            .set_add(&keys::fabrics_by_category(fabric.category), &id)
            .await?;

        tracing::info!(fabric_id = %fabric.id, slug = %fabric.slug, "Created fabric");
        Ok(fabric)
    }

    pub async fn get_fabric(&self, id: Uuid) -> Result<Option<Fabric>> {
        self.kv.get_json(&keys::fabric(id)).await
    }

    pub async fn get_fabric_by_slug(&self, slug: &str) -> Result<Option<Fabric>> {
        let fabrics = self.get_all_fabrics().await?;
        Ok(fabrics.into_iter().find(|fabric| fabric.slug == slug))
    }

    /// Every indexed fabric, active or not, ordered by `sort_order`.
    pub async fn get_all_fabrics(&self) -> Result<Vec<Fabric>> {
        let mut fabrics = self.load_indexed(keys::FABRIC_INDEX).await?;
        sort_for_display(&mut fabrics);
        Ok(fabrics)
    }

    pub async fn get_active_fabrics(&self) -> Result<Vec<Fabric>> {
        let mut fabrics = self.get_all_fabrics().await?;
        fabrics.retain(|fabric| fabric.is_active);
        Ok(fabrics)
    }

    pub async fn get_fabrics_by_category(&self, category: FabricCategory) -> Result<Vec<Fabric>> {
        let mut fabrics = self
            .load_indexed(&keys::fabrics_by_category(category))
            .await?;
        // An interrupted category move can leave the id in its old set as well.
        fabrics.retain(|fabric| fabric.is_active && fabric.category == category);
        sort_for_display(&mut fabrics);
        Ok(fabrics)
    }

    /// Returns `None` when the fabric does not exist.
    pub async fn update_fabric(&self, id: Uuid, updates: FabricUpdate) -> Result<Option<Fabric>> {
        let Some(mut fabric) = self.get_fabric(id).await? else {
            return Ok(None);
        };

        let previous_category = fabric.category;
        updates.apply_to(&mut fabric);
        fabric.updated_at = self.clock.now();

        if fabric.category != previous_category {
            let member = id.to_string();
            self.kv
                .set_remove(&keys::fabrics_by_category(previous_category), &member)
                .await?;
            self.kv
                .set_add(&keys::fabrics_by_category(fabric.category), &member)
                .await?;
            tracing::info!(
                fabric_id = %id,
                from = %previous_category,
                to = %fabric.category,
                "Moved fabric between categories"
            );
        }

        self.kv.set_json(&keys::fabric(id), &fabric, None).await?;
        Ok(Some(fabric))
    }

    /// Returns `false` when there was nothing to delete.
    pub async fn delete_fabric(&self, id: Uuid) -> Result<bool> {
        let Some(fabric) = self.get_fabric(id).await? else {
            return Ok(false);
        };

        let member = id.to_string();
        self.kv.set_remove(keys::FABRIC_INDEX, &member).await?;
        self.kv
            .set_remove(&keys::fabrics_by_category(fabric.category), &member)
            .await?;
        self.kv.delete(&keys::fabric(id)).await?;

        tracing::info!(fabric_id = %id, "Deleted fabric");
        Ok(true)
    }

    pub async fn toggle_fabric_active(&self, id: Uuid) -> Result<Option<Fabric>> {
        let Some(fabric) = self.get_fabric(id).await? else {
            return Ok(None);
        };

        self.update_fabric(
            id,
            FabricUpdate {
                is_active: Some(!fabric.is_active),
                ..Default::default()
            },
        )
        .await
    }

    /// Brings the index sets back in line with the stored records: drops ids whose record is
    /// gone and puts every fabric in the global index and in exactly its own category set.
    ///
    /// Fabrics missing from the global index are only found through a category set.
    pub async fn reconcile_indexes(&self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        let global = self.kv.set_members(keys::FABRIC_INDEX).await?;
        let mut category_sets = Vec::with_capacity(FabricCategory::ALL.len());
        for category in FabricCategory::ALL {
            let key = keys::fabrics_by_category(category);
            let members = self.kv.set_members(&key).await?;
            category_sets.push((category, key, members));
        }

        let mut candidate_ids = global.clone();
        for (_, _, members) in &category_sets {
            candidate_ids.extend(members.iter().cloned());
        }
        candidate_ids.sort();
        candidate_ids.dedup();

        for raw_id in candidate_ids {
            let fabric = match Uuid::parse_str(&raw_id) {
                Ok(id) => self.get_fabric(id).await?,
                Err(_) => None,
            };

            match fabric {
                Some(fabric) => {
                    report.fabrics_checked += 1;
                    if !global.contains(&raw_id) {
                        self.kv.set_add(keys::FABRIC_INDEX, &raw_id).await?;
                        report.missing_entries_added += 1;
                    }
                    for (category, key, members) in &category_sets {
                        let listed = members.contains(&raw_id);
                        if *category == fabric.category && !listed {
                            self.kv.set_add(key, &raw_id).await?;
                            report.missing_entries_added += 1;
                        } else if *category != fabric.category && listed {
                            self.kv.set_remove(key, &raw_id).await?;
                            report.dangling_entries_removed += 1;
                        }
                    }
                }
                None => {
                    self.kv.set_remove(keys::FABRIC_INDEX, &raw_id).await?;
                    for (_, key, _) in &category_sets {
                        self.kv.set_remove(key, &raw_id).await?;
                    }
                    report.dangling_entries_removed += 1;
                }
            }
        }

        tracing::info!(
            checked = report.fabrics_checked,
            removed = report.dangling_entries_removed,
            added = report.missing_entries_added,
            "Reconciled fabric indexes"
        );
        Ok(report)
    }

    /// Loads the records behind an index set concurrently, skipping ids without a record.
    async fn load_indexed(&self, index_key: &str) -> Result<Vec<Fabric>> {
        let ids = self.kv.set_members(index_key).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let lookups = ids.iter().map(|raw_id| async move {
            match Uuid::parse_str(raw_id) {
                Ok(id) => self.get_fabric(id).await,
                Err(_) => Ok(None),
            }
        });
        let fabrics: Vec<Fabric> = try_join_all(lookups).await?.into_iter().flatten().collect();

        if fabrics.len() < ids.len() {
            tracing::debug!(
                index = index_key,
                dangling = ids.len() - fabrics.len(),
                "Skipped index entries without a fabric record"
            );
        }

        Ok(fabrics)
    }
}

fn sort_for_display(fabrics: &mut [Fabric]) {
    fabrics.sort_by_key(|fabric| fabric.sort_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::AppError,
        kv::{MemoryStore, MockKvStore},
        utils::time::testing::FixedClock,
    };
    use chrono::Duration;

    fn setup() -> (FabricCatalog, KvClient, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::at("2024-06-01T12:00:00Z"));
        let kv = KvClient::new(Arc::new(MemoryStore::with_clock(clock.clone())));
        (FabricCatalog::new(kv.clone(), clock.clone()), kv, clock)
    }

    fn input(name: &str, category: FabricCategory, sort_order: i32) -> FabricInput {
        FabricInput {
            name: name.to_string(),
            category,
            description: format!("{} upholstery", name),
            color_hex: "#808080".to_string(),
            tags: vec!["sample".to_string()],
            is_active: None,
            sort_order: Some(sort_order),
        }
    }

    async fn create(
        catalog: &FabricCatalog,
        name: &str,
        category: FabricCategory,
        sort_order: i32,
    ) -> Fabric {
        catalog
            .create_fabric(
                input(name, category, sort_order),
                format!("https://media.example/fabrics/{}.jpg", name),
                format!("https://media.example/fabrics/{}_thumb.jpg", name),
            )
            .await
            .unwrap()
    }

    async fn members(kv: &KvClient, key: &str) -> Vec<String> {
        let mut members = kv.set_members(key).await.unwrap();
        members.sort();
        members
    }

    #[tokio::test]
    async fn test_create_writes_record_and_indexes() {
        let (catalog, kv, _clock) = setup();

        let fabric = create(&catalog, "Royal Blue Velvet", FabricCategory::Velvet, 0).await;

        assert!(fabric.is_active);
        assert!(fabric.slug.starts_with("royal-blue-velvet-"));
        assert_eq!(fabric.created_at, fabric.updated_at);
        assert_eq!(catalog.get_fabric(fabric.id).await.unwrap(), Some(fabric.clone()));
        assert_eq!(members(&kv, "fabrics:index").await, vec![fabric.id.to_string()]);
        assert_eq!(
            members(&kv, "fabrics:category:velvet").await,
            vec![fabric.id.to_string()]
        );
    }

    #[tokio::test]
    async fn test_active_fabrics_sorted_and_filtered() {
        let (catalog, _kv, _clock) = setup();
        let late = create(&catalog, "Late", FabricCategory::Cotton, 9).await;
        let early = create(&catalog, "Early", FabricCategory::Wool, 1).await;
        let hidden = catalog
            .create_fabric(
                FabricInput {
                    is_active: Some(false),
                    ..input("Hidden", FabricCategory::Linen, 0)
                },
                "i".to_string(),
                "t".to_string(),
            )
            .await
            .unwrap();

        let active = catalog.get_active_fabrics().await.unwrap();
        let all = catalog.get_all_fabrics().await.unwrap();

        assert_eq!(active, vec![early.clone(), late.clone()]);
        assert_eq!(all, vec![hidden, early, late]);
    }

    #[tokio::test]
    async fn test_by_category_skips_dangling_ids() {
        let (catalog, kv, _clock) = setup();
        let kept = create(&catalog, "Kept", FabricCategory::Leather, 0).await;
        kv.set_add("fabrics:category:leather", &Uuid::new_v4().to_string())
            .await
            .unwrap();
        kv.set_add("fabrics:category:leather", "not-a-uuid")
            .await
            .unwrap();

        let fabrics = catalog
            .get_fabrics_by_category(FabricCategory::Leather)
            .await
            .unwrap();

        assert_eq!(fabrics, vec![kept]);
    }

    #[tokio::test]
    async fn test_update_moves_category_index() {
        let (catalog, kv, clock) = setup();
        let fabric = create(&catalog, "Sage", FabricCategory::Cotton, 0).await;
        clock.advance(Duration::minutes(5));

        let updated = catalog
            .update_fabric(
                fabric.id,
                FabricUpdate {
                    category: Some(FabricCategory::Linen),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.category, FabricCategory::Linen);
        assert_eq!(updated.created_at, fabric.created_at);
        assert!(updated.updated_at > fabric.updated_at);
        assert!(members(&kv, "fabrics:category:cotton").await.is_empty());
        assert_eq!(
            members(&kv, "fabrics:category:linen").await,
            vec![fabric.id.to_string()]
        );
        assert!(catalog
            .get_fabrics_by_category(FabricCategory::Cotton)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_same_category_leaves_indexes() {
        let mut store = MockKvStore::new();
        let clock = Arc::new(FixedClock::at("2024-06-01T12:00:00Z"));
        let existing = {
            let (catalog, _kv, _clock) = setup();
            create(&catalog, "Plain", FabricCategory::Wool, 0).await
        };
        let stored = serde_json::to_value(&existing).unwrap();

        store.expect_get().returning(move |_| Ok(Some(stored.clone())));
        store.expect_set_add().never();
        store.expect_set_remove().never();
        store.expect_set().times(1).returning(|_, _, _| Ok(()));

        let catalog = FabricCatalog::new(KvClient::new(Arc::new(store)), clock);
        let updated = catalog
            .update_fabric(
                existing.id,
                FabricUpdate {
                    category: Some(FabricCategory::Wool),
                    name: Some("Plain Wool".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Plain Wool");
    }

    #[tokio::test]
    async fn test_update_missing_fabric() {
        let (catalog, _kv, _clock) = setup();

        let result = catalog
            .update_fabric(Uuid::new_v4(), FabricUpdate::default())
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_failed_record_write_leaves_indexes_moved() {
        let existing = {
            let (catalog, _kv, _clock) = setup();
            create(&catalog, "Moving", FabricCategory::Cotton, 0).await
        };
        let stored = serde_json::to_value(&existing).unwrap();

        let mut store = MockKvStore::new();
        store.expect_get().returning(move |_| Ok(Some(stored.clone())));
        store
            .expect_set_remove()
            .withf(|key, _| key == "fabrics:category:cotton")
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_set_add()
            .withf(|key, _| key == "fabrics:category:velvet")
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_set()
            .returning(|_, _, _| Err(AppError::Internal(anyhow::anyhow!("write timed out"))));

        let catalog = FabricCatalog::new(
            KvClient::new(Arc::new(store)),
            Arc::new(FixedClock::at("2024-06-01T12:00:00Z")),
        );
        let result = catalog
            .update_fabric(
                existing.id,
                FabricUpdate {
                    category: Some(FabricCategory::Velvet),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_indexes() {
        let (catalog, kv, _clock) = setup();
        let fabric = create(&catalog, "Gone", FabricCategory::Synthetic, 0).await;

        assert!(catalog.delete_fabric(fabric.id).await.unwrap());

        assert_eq!(catalog.get_fabric(fabric.id).await.unwrap(), None);
        assert!(members(&kv, "fabrics:index").await.is_empty());
        assert!(members(&kv, "fabrics:category:synthetic").await.is_empty());
        assert!(!catalog.delete_fabric(fabric.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_active() {
        let (catalog, _kv, _clock) = setup();
        let fabric = create(&catalog, "Toggle", FabricCategory::Patterned, 0).await;

        let toggled = catalog.toggle_fabric_active(fabric.id).await.unwrap().unwrap();
        assert!(!toggled.is_active);
        assert!(catalog.get_active_fabrics().await.unwrap().is_empty());

        let toggled = catalog.toggle_fabric_active(fabric.id).await.unwrap().unwrap();
        assert!(toggled.is_active);

        assert!(catalog
            .toggle_fabric_active(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_get_by_slug() {
        let (catalog, _kv, _clock) = setup();
        let fabric = create(&catalog, "Ocean Linen", FabricCategory::Linen, 0).await;

        assert_eq!(
            catalog.get_fabric_by_slug(&fabric.slug).await.unwrap(),
            Some(fabric)
        );
        assert_eq!(catalog.get_fabric_by_slug("ocean-linen").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reconcile_repairs_indexes() {
        let (catalog, kv, _clock) = setup();
        let moved = create(&catalog, "Moved", FabricCategory::Cotton, 0).await;
        let orphan = create(&catalog, "Orphan", FabricCategory::Wool, 0).await;
        let dangling = Uuid::new_v4().to_string();

        // Interrupted category move: the record says velvet, both sets still list it.
        let mut record = moved.clone();
        record.category = FabricCategory::Velvet;
        kv.set_json(&keys::fabric(moved.id), &record, None).await.unwrap();
        // Fabric dropped from the global index only.
        kv.set_remove("fabrics:index", &orphan.id.to_string()).await.unwrap();
        // Index entry whose record was deleted.
        kv.set_add("fabrics:index", &dangling).await.unwrap();
        kv.set_add("fabrics:category:linen", &dangling).await.unwrap();

        let report = catalog.reconcile_indexes().await.unwrap();

        assert_eq!(report.fabrics_checked, 2);
        // Old cotton entry for `moved` and the deleted record.
        assert_eq!(report.dangling_entries_removed, 2);
        // Velvet entry for `moved` and global entry for `orphan`.
        assert_eq!(report.missing_entries_added, 2);

        let mut expected_global = vec![moved.id.to_string(), orphan.id.to_string()];
        expected_global.sort();
        assert_eq!(members(&kv, "fabrics:index").await, expected_global);
        assert!(members(&kv, "fabrics:category:cotton").await.is_empty());
        assert!(members(&kv, "fabrics:category:linen").await.is_empty());
        assert_eq!(
            members(&kv, "fabrics:category:velvet").await,
            vec![moved.id.to_string()]
        );

        let again = catalog.reconcile_indexes().await.unwrap();
        assert_eq!(again.dangling_entries_removed, 0);
        assert_eq!(again.missing_entries_added, 0);
    }

    #[tokio::test]
    async fn test_reconcile_reads_each_index_once() {
        let (seed, _kv, _clock) = setup();
        let linen = create(&seed, "Linen", FabricCategory::Linen, 0).await;
        let wool = create(&seed, "Wool", FabricCategory::Wool, 1).await;

        let records: Vec<(String, serde_json::Value)> = [&linen, &wool]
            .iter()
            .map(|fabric| (keys::fabric(fabric.id), serde_json::to_value(fabric).unwrap()))
            .collect();
        let linen_id = linen.id.to_string();
        let wool_id = wool.id.to_string();

        let mut store = MockKvStore::new();
        store
            .expect_set_members()
            .times(FabricCategory::ALL.len() + 1)
            .returning(move |key| {
                Ok(match key {
                    "fabrics:index" => vec![linen_id.clone(), wool_id.clone()],
                    "fabrics:category:linen" => vec![linen_id.clone()],
                    "fabrics:category:wool" => vec![wool_id.clone()],
                    _ => Vec::new(),
                })
            });
        store.expect_get().returning(move |key| {
            Ok(records
                .iter()
                .find(|(record_key, _)| record_key == key)
                .map(|(_, value)| value.clone()))
        });
        store.expect_set_add().never();
        store.expect_set_remove().never();

        let catalog = FabricCatalog::new(
            KvClient::new(Arc::new(store)),
            Arc::new(FixedClock::at("2024-06-01T12:00:00Z")),
        );
        let report = catalog.reconcile_indexes().await.unwrap();

        assert_eq!(
            report,
            ReconcileReport {
                fabrics_checked: 2,
                dangling_entries_removed: 0,
                missing_entries_added: 0,
            }
        );
    }
}
