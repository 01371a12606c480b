//! Link-table primitives for the product-tag many-to-many relation.
//!
//! The free functions take an explicit connection so the coordinator in
//! [`crate::repository::product`] can run them inside the transaction that
//! also carries the product's scalar update.

use std::collections::HashSet;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::product_tag::{
    NewProductTag as DomainNewProductTag, ProductTag as DomainProductTag, TagDiff,
};
use crate::models::product_tag::{NewProductTag as DbNewProductTag, ProductTag as DbProductTag};
use crate::repository::{DieselRepository, ProductTagReader, RepositoryError, RepositoryResult};

impl ProductTagReader for DieselRepository {
    fn links_for_product(&self, product_id: i32) -> RepositoryResult<Vec<DomainProductTag>> {
        let mut conn = self.conn()?;
        links_for_product(&mut conn, product_id)
    }
}

/// Fetch every link row for `product_id` as seen by the current transaction.
pub(crate) fn links_for_product(
    conn: &mut SqliteConnection,
    product_id: i32,
) -> RepositoryResult<Vec<DomainProductTag>> {
    use crate::schema::product_tags;

    let rows = product_tags::table
        .filter(product_tags::product_id.eq(product_id))
        .order(product_tags::id.asc())
        .load::<DbProductTag>(conn)?;

    Ok(rows.into_iter().map(DomainProductTag::from).collect())
}

/// Reconcile the persisted links of `product_id` with `desired_tag_ids`.
///
/// Reads the current links, computes the minimal diff, validates that every
/// tag to be added exists, then applies insertions and deletions. Unchanged
/// links are never touched, so their link ids remain stable. Must run inside
/// the caller's transaction.
pub(crate) fn reconcile_links(
    conn: &mut SqliteConnection,
    product_id: i32,
    desired_tag_ids: &[i32],
) -> RepositoryResult<()> {
    let current = links_for_product(conn, product_id)?;
    let diff = TagDiff::compute(&current, desired_tag_ids);
    if diff.is_empty() {
        return Ok(());
    }

    ensure_tags_exist(conn, &diff.tag_ids_to_add)?;

    let new_links: Vec<DomainNewProductTag> = diff
        .tag_ids_to_add
        .iter()
        .map(|&tag_id| DomainNewProductTag::new(product_id, tag_id))
        .collect();

    bulk_insert_links(conn, &new_links)?;
    bulk_delete_links(conn, &diff.link_ids_to_remove)?;

    Ok(())
}

/// Pre-commit referential check: every id in `tag_ids` must name an existing
/// tag. Runs before the insert so the caller gets a precise error instead of
/// a bare foreign-key failure.
pub(crate) fn ensure_tags_exist(
    conn: &mut SqliteConnection,
    tag_ids: &[i32],
) -> RepositoryResult<()> {
    use crate::schema::tags;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let found: HashSet<i32> = tags::table
        .filter(tags::id.eq_any(tag_ids))
        .select(tags::id)
        .load::<i32>(conn)?
        .into_iter()
        .collect();

    let mut missing: Vec<i32> = tag_ids
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    missing.sort_unstable();
    missing.dedup();
    Err(RepositoryError::ReferentialIntegrity(format!(
        "unknown tag ids: {missing:?}"
    )))
}

/// Insert one link row per payload.
pub(crate) fn bulk_insert_links(
    conn: &mut SqliteConnection,
    new_links: &[DomainNewProductTag],
) -> RepositoryResult<()> {
    use crate::schema::product_tags;

    if new_links.is_empty() {
        return Ok(());
    }

    let rows: Vec<DbNewProductTag> = new_links.iter().map(DbNewProductTag::from).collect();

    diesel::insert_into(product_tags::table)
        .values(&rows)
        .execute(conn)?;

    Ok(())
}

/// Delete exactly the named link rows. Ids that are already gone are skipped,
/// which keeps deletion idempotent.
pub(crate) fn bulk_delete_links(
    conn: &mut SqliteConnection,
    link_ids: &[i32],
) -> RepositoryResult<()> {
    use crate::schema::product_tags;

    if link_ids.is_empty() {
        return Ok(());
    }

    diesel::delete(product_tags::table.filter(product_tags::id.eq_any(link_ids)))
        .execute(conn)?;

    Ok(())
}
