use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Domain representation linking a product to a tag record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ProductTag {
    /// Unique identifier of the product-tag association.
    pub id: i32,
    /// Identifier of the product the tag is attached to.
    pub product_id: i32,
    /// Identifier of the referenced tag record.
    pub tag_id: i32,
    /// Timestamp for when the association was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the association.
    pub updated_at: NaiveDateTime,
}

/// Payload required to associate an existing tag with a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NewProductTag {
    /// Identifier of the product receiving the tag.
    pub product_id: i32,
    /// Identifier of the tag being attached to the product.
    pub tag_id: i32,
}

impl NewProductTag {
    /// Construct a new association payload between a product and a tag.
    pub fn new(product_id: i32, tag_id: i32) -> Self {
        Self { product_id, tag_id }
    }
}

/// Minimal set of link changes that moves a product's persisted tag set to a
/// desired tag set.
///
/// Pure computation over already-loaded rows; applying the diff is the
/// repository's job. Links whose tag id appears in both the current and the
/// desired set are left alone, so their link ids survive reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    /// Tag ids that need a new link row, sorted for deterministic application.
    pub tag_ids_to_add: Vec<i32>,
    /// Link row ids that need deleting, sorted for deterministic application.
    pub link_ids_to_remove: Vec<i32>,
}

impl TagDiff {
    /// Diff the currently persisted links against the desired tag ids.
    ///
    /// Duplicates in `desired_tag_ids` collapse; input order is irrelevant.
    /// Removals are expressed as link ids because deletion addresses link
    /// rows, not tag rows.
    pub fn compute(current_links: &[ProductTag], desired_tag_ids: &[i32]) -> Self {
        let desired: HashSet<i32> = desired_tag_ids.iter().copied().collect();
        let current: HashSet<i32> = current_links.iter().map(|link| link.tag_id).collect();

        let mut tag_ids_to_add: Vec<i32> = desired.difference(&current).copied().collect();
        tag_ids_to_add.sort_unstable();

        let mut link_ids_to_remove: Vec<i32> = current_links
            .iter()
            .filter(|link| !desired.contains(&link.tag_id))
            .map(|link| link.id)
            .collect();
        link_ids_to_remove.sort_unstable();

        Self {
            tag_ids_to_add,
            link_ids_to_remove,
        }
    }

    /// Whether the persisted state already matches the desired state.
    pub fn is_empty(&self) -> bool {
        self.tag_ids_to_add.is_empty() && self.link_ids_to_remove.is_empty()
    }
}
