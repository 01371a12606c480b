use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::category::Category as DomainCategory;
use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, UpdateProduct as DomainUpdateProduct,
};
use crate::domain::tag::Tag as DomainTag;
use crate::models::category::Category as DbCategory;
use crate::models::product::{
    NewProduct as DbNewProduct, Product as DbProduct, UpdateProduct as DbUpdateProduct,
};
use crate::models::tag::Tag as DbTag;
use crate::repository::{
    DieselRepository, ProductReader, ProductWriter, RepositoryError, RepositoryResult, product_tag,
};

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let product = products::table
            .find(id)
            .first::<DbProduct>(&mut conn)
            .optional()?;

        match product {
            Some(db_product) => Ok(Some(attach_relations(&mut conn, db_product)?)),
            None => Ok(None),
        }
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(
        &self,
        new_product: &DomainNewProduct,
        tag_ids: &[i32],
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            let db_new = DbNewProduct::from(new_product);

            let created = diesel::insert_into(products::table)
                .values(&db_new)
                .get_result::<DbProduct>(conn)?;

            if !tag_ids.is_empty() {
                product_tag::reconcile_links(conn, created.id, tag_ids)?;
            }

            attach_relations(conn, created)
        })
    }

    /// Atomic update of a product's scalar fields and, when a desired tag
    /// list is supplied, its tag links.
    ///
    /// Runs as one IMMEDIATE transaction: the write lock is taken before the
    /// current links are read, so two concurrent reconciliations of the same
    /// product serialize instead of diffing against a stale snapshot. Any
    /// failure rolls back the scalar update and every link change together.
    fn update_product(
        &self,
        product_id: i32,
        updates: &DomainUpdateProduct,
        desired_tag_ids: Option<Vec<i32>>,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| {
            let db_updates = DbUpdateProduct::from(updates);

            // Fails with NotFound when the product does not exist; the
            // changeset always carries updated_at, so it is never empty.
            let updated = diesel::update(products::table.find(product_id))
                .set(&db_updates)
                .get_result::<DbProduct>(conn)?;

            if let Some(desired) = desired_tag_ids.as_deref() {
                product_tag::reconcile_links(conn, product_id, desired)?;
            }

            attach_relations(conn, updated)
        })
    }

    fn delete_product(&self, product_id: i32) -> RepositoryResult<()> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        // Link rows go with the product via ON DELETE CASCADE.
        let deleted = diesel::delete(products::table.find(product_id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Resolve the category and tag associations for a freshly loaded product row.
fn attach_relations(
    conn: &mut SqliteConnection,
    db_product: DbProduct,
) -> RepositoryResult<DomainProduct> {
    use crate::schema::{categories, product_tags, tags};

    let mut domain: DomainProduct = db_product.into();

    if let Some(category_id) = domain.category_id {
        let category = categories::table
            .find(category_id)
            .first::<DbCategory>(conn)
            .optional()?;
        domain.category = category.map(DomainCategory::from);
    }

    let tag_rows = product_tags::table
        .inner_join(tags::table)
        .filter(product_tags::product_id.eq(domain.id))
        .select(DbTag::as_select())
        .order(tags::name.asc())
        .load::<DbTag>(conn)?;

    domain.tags = tag_rows.into_iter().map(DomainTag::from).collect();

    Ok(domain)
}
