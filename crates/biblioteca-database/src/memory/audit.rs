//! Audit log store.

use async_trait::async_trait;
use uuid::Uuid;

use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use super::{MemoryStore, now};
use crate::store::AuditStore;

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, data: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let mut state = self.state.write().await;
        state.next_seq += 1;
        let entry = AuditLogEntry {
            seq: state.next_seq,
            actor_id: data.actor_id,
            actor_name: data.actor_name.clone(),
            action: data.action,
            entity_type: data.entity_type,
            entity_id: data.entity_id,
            entity_name: data.entity_name.clone(),
            details: data.details.clone(),
            ip_address: data.ip_address.clone(),
            created_at: now(),
        };
        state.audit.push(entry.clone());
        Ok(entry)
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<AuditLogEntry>> {
        let state = self.state.read().await;
        let newest_first: Vec<AuditLogEntry> = state.audit.iter().rev().cloned().collect();
        Ok(PageResponse::from_slice(newest_first, page))
    }

    async fn list_by_actor(
        &self,
        actor_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let state = self.state.read().await;
        let newest_first: Vec<AuditLogEntry> = state
            .audit
            .iter()
            .rev()
            .filter(|e| e.actor_id == actor_id)
            .cloned()
            .collect();
        Ok(PageResponse::from_slice(newest_first, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblioteca_entity::audit::{AuditAction, AuditEntityType};

    fn entry(actor_id: Uuid) -> CreateAuditLogEntry {
        CreateAuditLogEntry {
            actor_id,
            actor_name: "Ana".into(),
            action: AuditAction::Create,
            entity_type: AuditEntityType::Document,
            entity_id: Uuid::new_v4(),
            entity_name: "Cálculo I".into(),
            details: None,
            ip_address: None,
        }
    }

    #[tokio::test]
    async fn test_sequence_is_monotonic_and_listing_newest_first() {
        let store = MemoryStore::new();
        let ana = Uuid::new_v4();
        let luis = Uuid::new_v4();
        let first = store.append(&entry(ana)).await.unwrap();
        let second = store.append(&entry(luis)).await.unwrap();
        let third = store.append(&entry(ana)).await.unwrap();
        assert!(first.seq < second.seq && second.seq < third.seq);

        let all = store.list(&PageRequest::default()).await.unwrap();
        let seqs: Vec<i64> = all.items.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![third.seq, second.seq, first.seq]);

        let mine = store.list_by_actor(ana, &PageRequest::default()).await.unwrap();
        assert_eq!(mine.total_items, 2);
        assert!(mine.items.iter().all(|e| e.actor_id == ana));
    }
}
