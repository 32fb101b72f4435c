//! Top-level world items and actors
//!
//! Both filter the store's global collection by type tag. `create` always
//! performs a follow-up update writing the record overlaid onto the type's
//! default record, so records created with a partial payload come back
//! fully populated.

use std::sync::Arc;

use async_trait::async_trait;

use hangar_core::{DocumentKind, EntityType, HangarResult, RawRecord, WriteOutcome};
use hangar_storage::{CollectionKey, Document, DocumentMeta, DocumentStore};

use crate::scoped::ScopedCollection;
use crate::wrapper::CollectionWrapper;

/// Top-level items of one type
#[derive(Clone)]
pub struct WorldItems {
    inner: ScopedCollection,
}

impl WorldItems {
    /// Bind an item type to the world item collection
    ///
    /// # Arguments
    ///
    /// * `store` - Shared document store
    /// * `ty` - An item-backed entity type
    pub fn new(store: Arc<dyn DocumentStore>, ty: EntityType) -> Self {
        Self {
            inner: ScopedCollection::new(store, CollectionKey::world(DocumentKind::Item), ty),
        }
    }
}

/// Top-level actors of one type
#[derive(Clone)]
pub struct WorldActors {
    inner: ScopedCollection,
}

impl WorldActors {
    /// Bind an actor type to the world actor collection
    ///
    /// # Arguments
    ///
    /// * `store` - Shared document store
    /// * `ty` - An actor-backed entity type
    pub fn new(store: Arc<dyn DocumentStore>, ty: EntityType) -> Self {
        Self {
            inner: ScopedCollection::new(store, CollectionKey::world(DocumentKind::Actor), ty),
        }
    }
}

macro_rules! delegate_wrapper {
    ($ty:ty) => {
        #[async_trait]
        impl CollectionWrapper for $ty {
            fn entity_type(&self) -> EntityType {
                self.inner.entity_type()
            }

            fn describe(&self) -> String {
                self.inner.collection().to_string()
            }

            async fn create(&self, raw: RawRecord) -> HangarResult<Document> {
                self.inner.create(raw).await
            }

            async fn get(&self, id: &str) -> HangarResult<Option<Document>> {
                self.inner.get(id).await
            }

            async fn update(&self, id: &str, raw: RawRecord) -> HangarResult<WriteOutcome> {
                self.inner.update(id, raw).await
            }

            async fn set_meta(&self, id: &str, meta: DocumentMeta) -> HangarResult<WriteOutcome> {
                self.inner.set_meta(id, meta).await
            }

            async fn destroy(&self, id: &str) -> HangarResult<Option<RawRecord>> {
                self.inner.destroy(id).await
            }

            async fn enumerate(&self) -> HangarResult<Vec<Document>> {
                self.inner.enumerate().await
            }
        }
    };
}

pub(crate) use delegate_wrapper;

delegate_wrapper!(WorldItems);
delegate_wrapper!(WorldActors);

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_storage::MemoryStore;
    use serde_json::json;

    fn setup() -> Arc<dyn DocumentStore> {
        Arc::new(MemoryStore::new())
    }

    fn raw(value: serde_json::Value) -> RawRecord {
        RawRecord::from_value(value)
    }

    #[tokio::test]
    async fn test_create_populates_defaults() {
        let frames = WorldItems::new(setup(), EntityType::Frame);
        let doc = frames
            .create(raw(json!({"lid": "mf_everest", "name": "Everest"})))
            .await
            .unwrap();

        assert_eq!(doc.data.lid(), Some("mf_everest"));
        assert_eq!(doc.data["stats"]["hp"], json!(10));
        assert_eq!(doc.meta.name, "Everest");

        let fetched = frames.get(&doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.data, doc.data);
    }

    #[tokio::test]
    async fn test_get_filters_by_type() {
        let store = setup();
        let frames = WorldItems::new(store.clone(), EntityType::Frame);
        let skills = WorldItems::new(store, EntityType::Skill);
        let doc = frames.create(raw(json!({"name": "Everest"}))).await.unwrap();

        assert!(frames.get(&doc.id).await.unwrap().is_some());
        assert!(skills.get(&doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enumerate_only_bound_type() {
        let store = setup();
        let frames = WorldItems::new(store.clone(), EntityType::Frame);
        let skills = WorldItems::new(store, EntityType::Skill);
        frames.create(raw(json!({"name": "Everest"}))).await.unwrap();
        frames.create(raw(json!({"name": "Sagarmatha"}))).await.unwrap();
        skills.create(raw(json!({"name": "Hack"}))).await.unwrap();

        let names: Vec<_> = frames
            .enumerate()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.meta.name)
            .collect();
        assert_eq!(names, vec!["Everest", "Sagarmatha"]);
    }

    #[tokio::test]
    async fn test_update_missing_is_stale() {
        let frames = WorldItems::new(setup(), EntityType::Frame);
        frames.create(raw(json!({"name": "Everest"}))).await.unwrap();
        let before = frames.enumerate().await.unwrap();

        let outcome = frames
            .update("missing", raw(json!({"name": "x"})))
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::StaleHandle);
        assert_eq!(frames.enumerate().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_and_destroy() {
        let pilots = WorldActors::new(setup(), EntityType::Pilot);
        let doc = pilots.create(raw(json!({"name": "Ace"}))).await.unwrap();

        let mut data = doc.data.clone();
        data["callsign"] = json!("Maverick");
        assert!(pilots.update(&doc.id, data).await.unwrap().is_applied());
        let fetched = pilots.get(&doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.data["callsign"], json!("Maverick"));

        let removed = pilots.destroy(&doc.id).await.unwrap().unwrap();
        assert_eq!(removed["callsign"], json!("Maverick"));
        assert!(pilots.get(&doc.id).await.unwrap().is_none());
        assert!(pilots.destroy(&doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_meta() {
        let pilots = WorldActors::new(setup(), EntityType::Pilot);
        let doc = pilots.create(raw(json!({"name": "Ace"}))).await.unwrap();
        let meta = DocumentMeta {
            name: "Ace".into(),
            img: Some("ace.png".into()),
            token: None,
        };
        assert!(pilots.set_meta(&doc.id, meta.clone()).await.unwrap().is_applied());
        assert_eq!(pilots.get(&doc.id).await.unwrap().unwrap().meta, meta);
        assert_eq!(
            pilots.set_meta("missing", meta).await.unwrap(),
            WriteOutcome::StaleHandle
        );
    }

    #[tokio::test]
    async fn test_lookup_by_display_id() {
        let weapons = WorldItems::new(setup(), EntityType::MechWeapon);
        weapons
            .create(raw(json!({"lid": "mw_rifle", "name": "Rifle"})))
            .await
            .unwrap();
        let cannon = weapons
            .create(raw(json!({"lid": "mw_cannon", "name": "Cannon"})))
            .await
            .unwrap();

        let found = weapons.lookup_by_display_id("mw_cannon").await.unwrap();
        assert_eq!(found.map(|d| d.id), Some(cannon.id));
        assert!(weapons.lookup_by_display_id("mw_nope").await.unwrap().is_none());
    }

    #[test]
    fn test_describe() {
        let frames = WorldItems::new(setup(), EntityType::Frame);
        assert_eq!(frames.describe(), "world/items");
        assert_eq!(frames.entity_type(), EntityType::Frame);
    }
}
