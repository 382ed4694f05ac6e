//! Which live queries a domain event can change.

use uuid::Uuid;

use biblioteca_core::events::{CatalogEvent, DomainEvent, EventPayload, UserEvent};

use super::types::LiveQuery;

impl LiveQuery {
    /// Whether `event` may change this query's result as seen by
    /// `subscriber`. False positives only cost a redundant snapshot.
    pub fn affected_by(&self, event: &DomainEvent, subscriber: Uuid) -> bool {
        match &event.payload {
            EventPayload::Catalog(catalog) => self.affected_by_catalog(catalog),
            EventPayload::User(user) => self.affected_by_user(user),
            EventPayload::AuditRecorded { actor_id, .. } => match self {
                Self::Audit => true,
                Self::AuditMine => *actor_id == subscriber,
                _ => false,
            },
            EventPayload::Upload(_) => false,
        }
    }

    fn affected_by_catalog(&self, event: &CatalogEvent) -> bool {
        match (event, self) {
            (CatalogEvent::CategoryChanged { .. }, Self::Categories) => true,
            (
                CatalogEvent::CategoryChanged { category_id },
                Self::CategoryFolders(id) | Self::CategoryDocuments(id),
            ) => id == category_id,

            (
                CatalogEvent::FolderChanged {
                    category_id,
                    parent_id: None,
                    ..
                },
                Self::CategoryFolders(id),
            ) => id == category_id,
            (
                CatalogEvent::FolderChanged {
                    folder_id,
                    parent_id,
                    ..
                },
                Self::FolderChildren(id),
            ) => id == folder_id || parent_id.as_ref() == Some(id),
            (CatalogEvent::FolderChanged { folder_id, .. }, Self::FolderDocuments(id)) => {
                id == folder_id
            }

            (CatalogEvent::DocumentChanged { document_id, .. }, Self::Document(id)) => {
                id == document_id
            }
            (
                CatalogEvent::DocumentChanged {
                    category_id,
                    folder_id: None,
                    ..
                },
                Self::CategoryDocuments(id),
            ) => id == category_id,
            (
                CatalogEvent::DocumentChanged {
                    folder_id: Some(folder_id),
                    ..
                },
                Self::FolderDocuments(id),
            ) => id == folder_id,

            (CatalogEvent::DocumentMoved { document_id, .. }, Self::Document(id)) => {
                id == document_id
            }
            (
                CatalogEvent::DocumentMoved {
                    from_category_id,
                    from_folder_id,
                    to_category_id,
                    to_folder_id,
                    ..
                },
                Self::CategoryDocuments(id),
            ) => {
                (from_folder_id.is_none() && id == from_category_id)
                    || (to_folder_id.is_none() && id == to_category_id)
            }
            (
                CatalogEvent::DocumentMoved {
                    from_folder_id,
                    to_folder_id,
                    ..
                },
                Self::FolderDocuments(id),
            ) => from_folder_id.as_ref() == Some(id) || to_folder_id.as_ref() == Some(id),

            (CatalogEvent::TagsChanged, Self::Tags) => true,
            // Stripped tag IDs show up in every listing that holds those
            // documents; listings are not indexed by document.
            (CatalogEvent::TagRemovedFromDocuments { document_ids }, Self::Document(id)) => {
                document_ids.contains(id)
            }
            (
                CatalogEvent::TagRemovedFromDocuments { document_ids },
                Self::CategoryDocuments(_) | Self::FolderDocuments(_),
            ) => !document_ids.is_empty(),

            _ => false,
        }
    }

    fn affected_by_user(&self, event: &UserEvent) -> bool {
        match event {
            UserEvent::ProfileCreated { .. }
            | UserEvent::ProfileUpdated { .. }
            | UserEvent::RoleChanged { .. } => matches!(self, Self::Users),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(event: CatalogEvent) -> DomainEvent {
        DomainEvent::new(None, EventPayload::Catalog(event))
    }

    #[test]
    fn test_document_move_touches_both_locations() {
        let (doc, cat_a, cat_b, folder) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let event = catalog(CatalogEvent::DocumentMoved {
            document_id: doc,
            from_category_id: cat_a,
            from_folder_id: None,
            to_category_id: cat_b,
            to_folder_id: Some(folder),
        });
        let nobody = Uuid::nil();

        assert!(LiveQuery::Document(doc).affected_by(&event, nobody));
        assert!(LiveQuery::CategoryDocuments(cat_a).affected_by(&event, nobody));
        assert!(LiveQuery::FolderDocuments(folder).affected_by(&event, nobody));
        // The document lands in a folder, so category B's root list is unchanged.
        assert!(!LiveQuery::CategoryDocuments(cat_b).affected_by(&event, nobody));
        assert!(!LiveQuery::Categories.affected_by(&event, nobody));
    }

    #[test]
    fn test_subfolder_change_touches_parent_not_category_roots() {
        let (folder, parent, category) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let event = catalog(CatalogEvent::FolderChanged {
            folder_id: folder,
            category_id: category,
            parent_id: Some(parent),
        });
        let nobody = Uuid::nil();

        assert!(LiveQuery::FolderChildren(parent).affected_by(&event, nobody));
        assert!(LiveQuery::FolderChildren(folder).affected_by(&event, nobody));
        assert!(!LiveQuery::CategoryFolders(category).affected_by(&event, nobody));
    }

    #[test]
    fn test_own_audit_trail_only_for_matching_actor() {
        let actor = Uuid::new_v4();
        let event = DomainEvent::new(
            Some(actor),
            EventPayload::AuditRecorded {
                seq: 7,
                actor_id: actor,
            },
        );

        assert!(LiveQuery::AuditMine.affected_by(&event, actor));
        assert!(!LiveQuery::AuditMine.affected_by(&event, Uuid::new_v4()));
        assert!(LiveQuery::Audit.affected_by(&event, Uuid::new_v4()));
    }

    #[test]
    fn test_role_change_refreshes_user_list() {
        let event = DomainEvent::new(
            None,
            EventPayload::User(UserEvent::RoleChanged {
                user_id: Uuid::new_v4(),
                old_role: "user".into(),
                new_role: "editor".into(),
            }),
        );
        assert!(LiveQuery::Users.affected_by(&event, Uuid::nil()));
        assert!(!LiveQuery::Categories.affected_by(&event, Uuid::nil()));
    }
}
