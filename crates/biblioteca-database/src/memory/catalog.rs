//! Category, folder, document, and tag stores.

use async_trait::async_trait;
use uuid::Uuid;

use biblioteca_core::error::AppError;
use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_entity::category::{Category, CreateCategory, UpdateCategory};
use biblioteca_entity::document::{CreateDocument, Document, DocumentSearch, UpdateDocument};
use biblioteca_entity::folder::{CreateFolder, Folder};
use biblioteca_entity::tag::Tag;

use super::{MemoryState, MemoryStore, now, strictly_after};
use crate::store::{
    CategoryDeletion, CategoryStore, DocumentStore, FolderDeletion, FolderStore, LocationError,
    Placement, TagStore,
};

/// Upper bound on ancestor walks, guarding against corrupted cycles.
const MAX_FOLDER_DEPTH: usize = 256;

/// Checks a location against the state held under the caller's lock.
fn check_location(
    state: &MemoryState,
    category_id: Uuid,
    folder_id: Option<Uuid>,
) -> Option<LocationError> {
    if !state.categories.contains_key(&category_id) {
        return Some(LocationError::CategoryNotFound);
    }
    let folder_id = folder_id?;
    match state.folders.get(&folder_id) {
        None => Some(LocationError::FolderNotFound),
        Some(folder) if folder.category_id != category_id => {
            Some(LocationError::FolderOutsideCategory)
        }
        Some(_) => None,
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut all: Vec<Category> = state.categories.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        let ts = now();
        let category = Category {
            id: Uuid::now_v7(),
            name: data.name.clone(),
            description: data.description.clone(),
            created_by: data.created_by,
            created_at: ts,
            updated_at: ts,
        };
        self.state
            .write()
            .await
            .categories
            .insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: Uuid, data: &UpdateCategory) -> AppResult<Option<Category>> {
        let mut state = self.state.write().await;
        Ok(state.categories.get_mut(&id).map(|category| {
            if let Some(name) = &data.name {
                category.name = name.clone();
            }
            if let Some(description) = &data.description {
                category.description = Some(description.clone());
            }
            category.updated_at = now();
            category.clone()
        }))
    }

    async fn delete_if_unused(&self, id: Uuid) -> AppResult<CategoryDeletion> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&id) {
            return Ok(CategoryDeletion::NotFound);
        }
        let folders = state.folders.values().filter(|f| f.category_id == id).count() as u64;
        let documents = state
            .documents
            .values()
            .filter(|d| d.category_id == id)
            .count() as u64;
        if folders > 0 || documents > 0 {
            return Ok(CategoryDeletion::InUse { folders, documents });
        }
        state.categories.remove(&id);
        Ok(CategoryDeletion::Deleted)
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn list_roots(&self, category_id: Uuid) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut roots: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.category_id == category_id && f.is_root())
            .cloned()
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roots)
    }

    async fn list_children(&self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut children: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut chain = Vec::new();
        let mut cursor = state.folders.get(&id);
        while let Some(folder) = cursor {
            chain.push(folder.clone());
            if chain.len() > MAX_FOLDER_DEPTH {
                break;
            }
            cursor = folder.parent_id.and_then(|p| state.folders.get(&p));
        }
        chain.reverse();
        Ok(chain)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Placement<Folder>> {
        let mut state = self.state.write().await;
        if let Some(reason) = check_location(&state, data.category_id, data.parent_id) {
            return Ok(Placement::Rejected(reason));
        }
        let ts = now();
        let folder = Folder {
            id: Uuid::now_v7(),
            category_id: data.category_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            created_by: data.created_by,
            created_at: ts,
            updated_at: ts,
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(Placement::Placed(folder))
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Folder>> {
        let mut state = self.state.write().await;
        Ok(state.folders.get_mut(&id).map(|folder| {
            folder.name = name.to_string();
            folder.updated_at = now();
            folder.clone()
        }))
    }

    async fn delete_if_empty(&self, id: Uuid) -> AppResult<FolderDeletion> {
        let mut state = self.state.write().await;
        if !state.folders.contains_key(&id) {
            return Ok(FolderDeletion::NotFound);
        }
        let documents = state
            .documents
            .values()
            .filter(|d| d.folder_id == Some(id))
            .count() as u64;
        if documents > 0 {
            return Ok(FolderDeletion::HasDocuments(documents));
        }
        state.folders.remove(&id);
        Ok(FolderDeletion::Deleted)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        Ok(self.state.read().await.documents.get(&id).cloned())
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<Document>> {
        let state = self.state.read().await;
        let mut all: Vec<Document> = state.documents.values().cloned().collect();
        all.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(PageResponse::from_slice(all, page))
    }

    async fn list_root(&self, category_id: Uuid) -> AppResult<Vec<Document>> {
        let state = self.state.read().await;
        let mut docs: Vec<Document> = state
            .documents
            .values()
            .filter(|d| d.category_id == category_id && d.folder_id.is_none())
            .cloned()
            .collect();
        docs.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(docs)
    }

    async fn list_in_folder(&self, folder_id: Uuid) -> AppResult<Vec<Document>> {
        let state = self.state.read().await;
        let mut docs: Vec<Document> = state
            .documents
            .values()
            .filter(|d| d.folder_id == Some(folder_id))
            .cloned()
            .collect();
        docs.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(docs)
    }

    async fn create(&self, data: &CreateDocument) -> AppResult<Placement<Document>> {
        let mut state = self.state.write().await;
        if let Some(reason) = check_location(&state, data.category_id, data.folder_id) {
            return Ok(Placement::Rejected(reason));
        }
        let ts = now();
        let document = Document {
            id: Uuid::now_v7(),
            category_id: data.category_id,
            folder_id: data.folder_id,
            title: data.title.clone(),
            author: data.author.clone(),
            year: data.year,
            description: data.description.clone(),
            subject: data.subject.clone(),
            version: data.version.clone(),
            file_url: data.file_url.clone(),
            thumbnail_url: data.thumbnail_url.clone(),
            tag_ids: data.tag_ids.clone(),
            created_by: data.created_by,
            created_at: ts,
            last_updated: ts,
        };
        state.documents.insert(document.id, document.clone());
        Ok(Placement::Placed(document))
    }

    async fn update(&self, id: Uuid, data: &UpdateDocument) -> AppResult<Option<Document>> {
        let mut state = self.state.write().await;
        Ok(state.documents.get_mut(&id).map(|doc| {
            if let Some(v) = &data.title {
                doc.title = v.clone();
            }
            if let Some(v) = &data.author {
                doc.author = v.clone();
            }
            if let Some(v) = data.year {
                doc.year = Some(v);
            }
            if let Some(v) = &data.description {
                doc.description = Some(v.clone());
            }
            if let Some(v) = &data.subject {
                doc.subject = Some(v.clone());
            }
            if let Some(v) = &data.version {
                doc.version = Some(v.clone());
            }
            if let Some(v) = &data.file_url {
                doc.file_url = v.clone();
            }
            if let Some(v) = &data.thumbnail_url {
                doc.thumbnail_url = Some(v.clone());
            }
            if let Some(v) = &data.tag_ids {
                doc.tag_ids = v.clone();
            }
            doc.last_updated = strictly_after(doc.last_updated);
            doc.clone()
        }))
    }

    async fn move_to(
        &self,
        id: Uuid,
        category_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Placement<Document>> {
        let mut state = self.state.write().await;
        if !state.documents.contains_key(&id) {
            return Ok(Placement::Missing);
        }
        if let Some(reason) = check_location(&state, category_id, folder_id) {
            return Ok(Placement::Rejected(reason));
        }
        Ok(match state.documents.get_mut(&id) {
            Some(doc) => {
                doc.category_id = category_id;
                doc.folder_id = folder_id;
                doc.last_updated = strictly_after(doc.last_updated);
                Placement::Placed(doc.clone())
            }
            None => Placement::Missing,
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Document>> {
        Ok(self.state.write().await.documents.remove(&id))
    }

    async fn search(&self, search: &DocumentSearch) -> AppResult<Vec<Document>> {
        let state = self.state.read().await;
        let mut hits: Vec<Document> = state
            .documents
            .values()
            .filter(|d| search.matches(d))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        hits.truncate(search.limit as usize);
        Ok(hits)
    }

    async fn remove_tag(&self, tag_id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut state = self.state.write().await;
        let mut changed = Vec::new();
        for doc in state.documents.values_mut() {
            if doc.tag_ids.contains(&tag_id) {
                doc.tag_ids.retain(|t| *t != tag_id);
                doc.last_updated = strictly_after(doc.last_updated);
                changed.push(doc.id);
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tag>> {
        Ok(self.state.read().await.tags.get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut all: Vec<Tag> = state.tags.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn count_existing(&self, ids: &[Uuid]) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(ids.iter().filter(|id| state.tags.contains_key(id)).count() as u64)
    }

    async fn create(&self, name: &str, created_by: Uuid) -> AppResult<Tag> {
        let mut state = self.state.write().await;
        if state.tags.values().any(|t| t.name.eq_ignore_ascii_case(name)) {
            return Err(AppError::conflict(format!("Tag '{name}' already exists")));
        }
        let tag = Tag {
            id: Uuid::now_v7(),
            name: name.to_string(),
            created_by,
            created_at: now(),
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Tag>> {
        let mut state = self.state.write().await;
        if state
            .tags
            .values()
            .any(|t| t.id != id && t.name.eq_ignore_ascii_case(name))
        {
            return Err(AppError::conflict(format!("Tag '{name}' already exists")));
        }
        Ok(state.tags.get_mut(&id).map(|tag| {
            tag.name = name.to_string();
            tag.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.state.write().await.tags.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_category(store: &MemoryStore) -> Category {
        CategoryStore::create(
            store,
            &CreateCategory {
                name: "Ingeniería".into(),
                description: None,
                created_by: Uuid::new_v4(),
            },
        )
        .await
        .unwrap()
    }

    async fn seed_folder(store: &MemoryStore, category_id: Uuid, parent_id: Option<Uuid>) -> Folder {
        FolderStore::create(
            store,
            &CreateFolder {
                category_id,
                parent_id,
                name: "Apuntes".into(),
                created_by: Uuid::new_v4(),
            },
        )
        .await
        .unwrap()
        .placed()
        .unwrap()
    }

    async fn seed_document(store: &MemoryStore, category_id: Uuid, folder_id: Option<Uuid>) -> Document {
        DocumentStore::create(
            store,
            &CreateDocument {
                category_id,
                folder_id,
                title: "Cálculo I".into(),
                author: "Stewart".into(),
                year: None,
                description: None,
                subject: None,
                version: None,
                file_url: "http://localhost/files/a.pdf".into(),
                thumbnail_url: None,
                tag_ids: vec![],
                created_by: Uuid::new_v4(),
            },
        )
        .await
        .unwrap()
        .placed()
        .unwrap()
    }

    #[tokio::test]
    async fn test_delete_if_empty_checks_direct_documents_only() {
        let store = MemoryStore::new();
        let category = seed_category(&store).await;
        let parent = seed_folder(&store, category.id, None).await;
        let child = seed_folder(&store, category.id, Some(parent.id)).await;
        seed_document(&store, category.id, Some(child.id)).await;

        assert_eq!(
            store.delete_if_empty(parent.id).await.unwrap(),
            FolderDeletion::Deleted
        );
        assert_eq!(
            store.delete_if_empty(child.id).await.unwrap(),
            FolderDeletion::HasDocuments(1)
        );
        let orphan = FolderStore::find_by_id(&store, child.id).await.unwrap().unwrap();
        assert_eq!(orphan.parent_id, Some(parent.id));
        assert_eq!(
            store.delete_if_empty(parent.id).await.unwrap(),
            FolderDeletion::NotFound
        );
    }

    #[tokio::test]
    async fn test_category_delete_blocked_while_in_use() {
        let store = MemoryStore::new();
        let category = seed_category(&store).await;
        let doc = seed_document(&store, category.id, None).await;
        assert_eq!(
            store.delete_if_unused(category.id).await.unwrap(),
            CategoryDeletion::InUse {
                folders: 0,
                documents: 1
            }
        );
        DocumentStore::delete(&store, doc.id).await.unwrap();
        assert_eq!(
            store.delete_if_unused(category.id).await.unwrap(),
            CategoryDeletion::Deleted
        );
    }

    #[tokio::test]
    async fn test_move_replaces_location_and_bumps_timestamp() {
        let store = MemoryStore::new();
        let from = seed_category(&store).await;
        let to = seed_category(&store).await;
        let folder = seed_folder(&store, to.id, None).await;
        let doc = seed_document(&store, from.id, None).await;

        let moved = store
            .move_to(doc.id, to.id, Some(folder.id))
            .await
            .unwrap()
            .placed()
            .unwrap();
        assert_eq!(moved.category_id, to.id);
        assert_eq!(moved.folder_id, Some(folder.id));
        assert!(moved.last_updated > doc.last_updated);

        let again = store.move_to(doc.id, to.id, Some(folder.id)).await.unwrap().placed().unwrap();
        assert!(again.last_updated > moved.last_updated);

        assert!(matches!(
            store.move_to(Uuid::new_v4(), to.id, None).await.unwrap(),
            Placement::Missing
        ));
    }

    #[tokio::test]
    async fn test_placement_rejects_invalid_locations() {
        let store = MemoryStore::new();
        let a = seed_category(&store).await;
        let b = seed_category(&store).await;
        let in_a = seed_folder(&store, a.id, None).await;
        let doc = seed_document(&store, b.id, None).await;

        let rejected = store.move_to(doc.id, b.id, Some(in_a.id)).await.unwrap();
        assert!(matches!(
            rejected,
            Placement::Rejected(LocationError::FolderOutsideCategory)
        ));
        let folder = FolderStore::create(
            &store,
            &CreateFolder {
                category_id: b.id,
                parent_id: Some(in_a.id),
                name: "Cruzada".into(),
                created_by: Uuid::new_v4(),
            },
        )
        .await
        .unwrap();
        assert!(matches!(
            folder,
            Placement::Rejected(LocationError::FolderOutsideCategory)
        ));

        store.delete_if_empty(in_a.id).await.unwrap();
        assert!(matches!(
            store.move_to(doc.id, a.id, Some(in_a.id)).await.unwrap(),
            Placement::Rejected(LocationError::FolderNotFound)
        ));
        assert!(matches!(
            store.move_to(doc.id, Uuid::new_v4(), None).await.unwrap(),
            Placement::Rejected(LocationError::CategoryNotFound)
        ));
        let unchanged = DocumentStore::find_by_id(&store, doc.id).await.unwrap().unwrap();
        assert_eq!(unchanged.category_id, b.id);
        assert_eq!(unchanged.last_updated, doc.last_updated);
    }

    #[tokio::test]
    async fn test_deleted_folder_never_receives_documents() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let category = seed_category(&store).await;

        // Each round races a placement into a fresh empty folder against
        // that folder's delete. Whatever the interleaving, a folder that
        // was deleted holds no document.
        for _ in 0..50 {
            let folder_id = seed_folder(&store, category.id, None).await.id;
            let doc_id = seed_document(&store, category.id, None).await.id;
            let category_id = category.id;
            let mover = {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move { store.move_to(doc_id, category_id, Some(folder_id)).await })
            };
            let deleter = {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move { store.delete_if_empty(folder_id).await })
            };
            let moved = mover.await.unwrap().unwrap();
            let deleted = deleter.await.unwrap().unwrap();

            match (moved, deleted) {
                (Placement::Placed(doc), FolderDeletion::HasDocuments(1)) => {
                    assert_eq!(doc.folder_id, Some(folder_id));
                }
                (Placement::Rejected(LocationError::FolderNotFound), FolderDeletion::Deleted) => {
                    let doc = DocumentStore::find_by_id(&*store, doc_id).await.unwrap().unwrap();
                    assert_eq!(doc.folder_id, None);
                }
                other => panic!("inconsistent outcome: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_root_listings() {
        let store = MemoryStore::new();
        let category = seed_category(&store).await;
        let root = seed_folder(&store, category.id, None).await;
        seed_folder(&store, category.id, Some(root.id)).await;
        seed_document(&store, category.id, None).await;
        seed_document(&store, category.id, Some(root.id)).await;

        let roots = store.list_roots(category.id).await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, root.id);
        assert_eq!(store.list_root(category.id).await.unwrap().len(), 1);
        assert_eq!(store.list_in_folder(root.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ancestors_stop_at_deleted_parent() {
        let store = MemoryStore::new();
        let category = seed_category(&store).await;
        let a = seed_folder(&store, category.id, None).await;
        let b = seed_folder(&store, category.id, Some(a.id)).await;
        let c = seed_folder(&store, category.id, Some(b.id)).await;

        let chain: Vec<Uuid> = store.ancestors(c.id).await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(chain, vec![a.id, b.id, c.id]);

        store.delete_if_empty(b.id).await.unwrap();
        let chain: Vec<Uuid> = store.ancestors(c.id).await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(chain, vec![c.id]);
    }

    #[tokio::test]
    async fn test_remove_tag_strips_from_documents() {
        let store = MemoryStore::new();
        let category = seed_category(&store).await;
        let tag = TagStore::create(&store, "tesis", Uuid::new_v4()).await.unwrap();
        let doc = seed_document(&store, category.id, None).await;
        DocumentStore::update(
            &store,
            doc.id,
            &UpdateDocument {
                tag_ids: Some(vec![tag.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let changed = store.remove_tag(tag.id).await.unwrap();
        assert_eq!(changed, vec![doc.id]);
        let doc = DocumentStore::find_by_id(&store, doc.id).await.unwrap().unwrap();
        assert!(doc.tag_ids.is_empty());
    }

    #[tokio::test]
    async fn test_tag_names_unique_ignoring_case() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let tag = TagStore::create(&store, "Tesis", owner).await.unwrap();
        assert!(TagStore::create(&store, "tesis", owner).await.is_err());
        assert!(TagStore::rename(&store, tag.id, "TESIS").await.unwrap().is_some());
    }
}
