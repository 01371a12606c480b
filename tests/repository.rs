use std::collections::HashSet;

use catalog_api::domain::category::NewCategory;
use catalog_api::domain::product::{NewProduct, UpdateProduct};
use catalog_api::domain::tag::NewTag;
use catalog_api::repository::{
    CategoryWriter, DieselRepository, ProductReader, ProductTagReader, ProductWriter,
    RepositoryError, TagWriter,
};

mod common;

fn tag_ids(repo: &DieselRepository, names: &[&str]) -> Vec<i32> {
    names
        .iter()
        .map(|name| repo.create_tag(&NewTag::new(*name)).unwrap().id)
        .collect()
}

fn linked_tag_ids(repo: &DieselRepository, product_id: i32) -> HashSet<i32> {
    repo.links_for_product(product_id)
        .unwrap()
        .into_iter()
        .map(|link| link.tag_id)
        .collect()
}

#[test]
fn test_product_crud_with_relations() {
    let test_db = common::TestDb::new("test_product_crud_with_relations.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = repo.create_category(&NewCategory::new("Beverages")).unwrap();
    let tags = tag_ids(&repo, &["organic", "fairtrade"]);

    let new_product = NewProduct::new("Coffee", 1299)
        .with_stock(25)
        .with_category_id(category.id);
    let created = repo.create_product(&new_product, &tags).unwrap();

    assert_eq!(created.name, "Coffee");
    assert_eq!(created.price_cents, 1299);
    assert_eq!(created.stock, 25);
    assert_eq!(
        created.category.as_ref().map(|c| c.name.as_str()),
        Some("Beverages")
    );
    assert_eq!(created.tags.len(), 2);

    let fetched = repo.get_product_by_id(created.id).unwrap().unwrap();
    assert_eq!(fetched.tags.len(), 2);

    repo.delete_product(created.id).unwrap();
    assert!(repo.get_product_by_id(created.id).unwrap().is_none());

    let err = repo
        .delete_product(created.id)
        .expect_err("expected second delete to fail");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_stock_defaults_to_ten() {
    let test_db = common::TestDb::new("test_stock_defaults_to_ten.db");
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_product(&NewProduct::new("Widget", 100), &[])
        .unwrap();

    assert_eq!(created.stock, 10);
}

#[test]
fn test_reconciliation_swaps_only_the_difference() {
    let test_db = common::TestDb::new("test_reconciliation_swaps_only_the_difference.db");
    let repo = DieselRepository::new(test_db.pool());

    let tags = tag_ids(&repo, &["alpha", "beta", "gamma"]);
    let (kept, removed, added) = (tags[1], tags[0], tags[2]);

    let product = repo
        .create_product(&NewProduct::new("Widget", 100), &[removed, kept])
        .unwrap();

    let before = repo.links_for_product(product.id).unwrap();
    assert_eq!(before.len(), 2);
    let kept_link_id = before
        .iter()
        .find(|link| link.tag_id == kept)
        .map(|link| link.id)
        .unwrap();

    let updated = repo
        .update_product(product.id, &UpdateProduct::new(), Some(vec![kept, added]))
        .unwrap();

    let updated_tag_ids: HashSet<i32> = updated.tags.iter().map(|tag| tag.id).collect();
    assert_eq!(updated_tag_ids, HashSet::from([kept, added]));

    let after = repo.links_for_product(product.id).unwrap();
    assert_eq!(after.len(), 2);

    // The unchanged link survives with its original row id.
    let kept_link_after = after
        .iter()
        .find(|link| link.tag_id == kept)
        .expect("kept tag should still be linked");
    assert_eq!(kept_link_after.id, kept_link_id);

    assert!(after.iter().all(|link| link.tag_id != removed));
}

#[test]
fn test_reconciliation_is_idempotent() {
    let test_db = common::TestDb::new("test_reconciliation_is_idempotent.db");
    let repo = DieselRepository::new(test_db.pool());

    let tags = tag_ids(&repo, &["one", "two"]);

    let product = repo
        .create_product(&NewProduct::new("Widget", 100), &tags)
        .unwrap();

    let first: Vec<_> = repo.links_for_product(product.id).unwrap();

    repo.update_product(product.id, &UpdateProduct::new(), Some(tags.clone()))
        .unwrap();
    let second: Vec<_> = repo.links_for_product(product.id).unwrap();

    // Same rows, same ids: nothing was deleted and reinserted.
    assert_eq!(
        first.iter().map(|link| link.id).collect::<Vec<_>>(),
        second.iter().map(|link| link.id).collect::<Vec<_>>()
    );
}

#[test]
fn test_reconciliation_deduplicates_desired_tags() {
    let test_db = common::TestDb::new("test_reconciliation_deduplicates_desired_tags.db");
    let repo = DieselRepository::new(test_db.pool());

    let tags = tag_ids(&repo, &["three", "four"]);

    let product = repo
        .create_product(
            &NewProduct::new("Widget", 100),
            &[tags[0], tags[0], tags[1]],
        )
        .unwrap();

    assert_eq!(repo.links_for_product(product.id).unwrap().len(), 2);
    assert_eq!(
        linked_tag_ids(&repo, product.id),
        tags.iter().copied().collect()
    );
}

#[test]
fn test_empty_desired_list_removes_all_links() {
    let test_db = common::TestDb::new("test_empty_desired_list_removes_all_links.db");
    let repo = DieselRepository::new(test_db.pool());

    let tags = tag_ids(&repo, &["solo"]);

    let product = repo
        .create_product(&NewProduct::new("Widget", 100), &tags)
        .unwrap();
    assert_eq!(repo.links_for_product(product.id).unwrap().len(), 1);

    let updated = repo
        .update_product(product.id, &UpdateProduct::new(), Some(Vec::new()))
        .unwrap();

    assert!(updated.tags.is_empty());
    assert!(repo.links_for_product(product.id).unwrap().is_empty());
}

#[test]
fn test_absent_desired_list_leaves_links_untouched() {
    let test_db = common::TestDb::new("test_absent_desired_list_leaves_links_untouched.db");
    let repo = DieselRepository::new(test_db.pool());

    let tags = tag_ids(&repo, &["keepme"]);

    let product = repo
        .create_product(&NewProduct::new("Widget", 100), &tags)
        .unwrap();
    let before = repo.links_for_product(product.id).unwrap();

    let updated = repo
        .update_product(product.id, &UpdateProduct::new().stock(3), None)
        .unwrap();

    assert_eq!(updated.stock, 3);
    assert_eq!(repo.links_for_product(product.id).unwrap(), before);
}

#[test]
fn test_unknown_tag_rolls_back_everything() {
    let test_db = common::TestDb::new("test_unknown_tag_rolls_back_everything.db");
    let repo = DieselRepository::new(test_db.pool());

    let tags = tag_ids(&repo, &["existing"]);

    let product = repo
        .create_product(
            &NewProduct::new("Widget", 100).with_stock(7),
            &tags,
        )
        .unwrap();
    let before = repo.links_for_product(product.id).unwrap();

    let err = repo
        .update_product(
            product.id,
            &UpdateProduct::new().name("Renamed").stock(1),
            Some(vec![tags[0], 9999]),
        )
        .expect_err("expected referential failure");
    assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));

    // Scalar fields and links are exactly as they were before the call.
    let unchanged = repo.get_product_by_id(product.id).unwrap().unwrap();
    assert_eq!(unchanged.name, "Widget");
    assert_eq!(unchanged.stock, 7);
    assert_eq!(repo.links_for_product(product.id).unwrap(), before);
}

#[test]
fn test_partial_update_keeps_absent_fields() {
    let test_db = common::TestDb::new("test_partial_update_keeps_absent_fields.db");
    let repo = DieselRepository::new(test_db.pool());

    let product = repo
        .create_product(&NewProduct::new("Widget", 450).with_stock(2), &[])
        .unwrap();

    let updated = repo
        .update_product(product.id, &UpdateProduct::new().price_cents(500), None)
        .unwrap();

    assert_eq!(updated.name, "Widget");
    assert_eq!(updated.price_cents, 500);
    assert_eq!(updated.stock, 2);
}

#[test]
fn test_update_missing_product_is_not_found() {
    let test_db = common::TestDb::new("test_update_missing_product_is_not_found.db");
    let repo = DieselRepository::new(test_db.pool());

    let err = repo
        .update_product(12345, &UpdateProduct::new().name("Ghost"), None)
        .expect_err("expected missing product to fail");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_deleting_product_cascades_to_links() {
    let test_db = common::TestDb::new("test_deleting_product_cascades_to_links.db");
    let repo = DieselRepository::new(test_db.pool());

    let tags = tag_ids(&repo, &["cascade1", "cascade2"]);

    let product = repo
        .create_product(&NewProduct::new("Widget", 100), &tags)
        .unwrap();

    repo.delete_product(product.id).unwrap();

    assert!(repo.links_for_product(product.id).unwrap().is_empty());
}

#[test]
fn test_deleting_category_cascades_to_products_and_links() {
    let test_db = common::TestDb::new("test_deleting_category_cascades_to_products_and_links.db");
    let repo = DieselRepository::new(test_db.pool());

    let category = repo.create_category(&NewCategory::new("Doomed")).unwrap();
    let tags = tag_ids(&repo, &["survivor"]);

    let product = repo
        .create_product(
            &NewProduct::new("Widget", 100).with_category_id(category.id),
            &tags,
        )
        .unwrap();

    repo.delete_category(category.id).unwrap();

    assert!(repo.get_product_by_id(product.id).unwrap().is_none());
    assert!(repo.links_for_product(product.id).unwrap().is_empty());
}

#[test]
fn test_unknown_category_is_a_referential_error() {
    let test_db = common::TestDb::new("test_unknown_category_is_a_referential_error.db");
    let repo = DieselRepository::new(test_db.pool());

    let err = repo
        .create_product(&NewProduct::new("Widget", 100).with_category_id(777), &[])
        .expect_err("expected foreign key failure");
    assert!(matches!(err, RepositoryError::ReferentialIntegrity(_)));
}

#[test]
fn test_tag_names_must_be_alphanumeric_and_unique() {
    let test_db = common::TestDb::new("test_tag_names_must_be_alphanumeric_and_unique.db");
    let repo = DieselRepository::new(test_db.pool());

    repo.create_tag(&NewTag::new("valid123")).unwrap();

    let err = repo
        .create_tag(&NewTag::new("valid123"))
        .expect_err("expected duplicate name to fail");
    assert!(matches!(err, RepositoryError::ConstraintViolation(_)));

    let err = repo
        .create_tag(&NewTag::new("not valid!"))
        .expect_err("expected non-alphanumeric name to fail");
    assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
}
