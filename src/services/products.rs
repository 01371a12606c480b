use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::product::Product;
use crate::domain::tag::Tag;
use crate::forms::products::{AddProductForm, EditProductForm};
use crate::repository::{ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult};

/// Fetches a single product with its category and tag associations.
pub fn get_product<R>(repo: &R, product_id: i32) -> ServiceResult<ProductView>
where
    R: ProductReader + ?Sized,
{
    let product = repo
        .get_product_by_id(product_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    Ok(ProductView::from_product(product))
}

/// Creates a new product, linking the requested tags in the same transaction.
pub fn create_product<R>(repo: &R, form: AddProductForm) -> ServiceResult<ProductView>
where
    R: ProductWriter + ?Sized,
{
    let (new_product, tag_ids) = form
        .into_new_product()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let created = repo
        .create_product(&new_product, &tag_ids)
        .map_err(ServiceError::from)?;

    Ok(ProductView::from_product(created))
}

/// Applies a partial update to a product and, when the payload carries a tag
/// list, reconciles its tag links against it.
///
/// The scalar update and the link changes commit together or not at all; a
/// payload without `tag_ids` never touches the link table.
pub fn update_product<R>(
    repo: &R,
    product_id: i32,
    form: EditProductForm,
) -> ServiceResult<ProductView>
where
    R: ProductWriter + ?Sized,
{
    let (updates, desired_tag_ids) = form
        .into_update_product()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let updated = repo
        .update_product(product_id, &updates, desired_tag_ids)
        .map_err(ServiceError::from)?;

    Ok(ProductView::from_product(updated))
}

/// Deletes a product; its tag links cascade away with it.
pub fn delete_product<R>(repo: &R, product_id: i32) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    repo.delete_product(product_id).map_err(ServiceError::from)
}

/// View model returned to API callers after any product operation.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    /// Price formatted as a two-decimal string, e.g. `"12.34"`.
    pub price: String,
    pub stock: i32,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub updated_at: chrono::NaiveDateTime,
}

impl ProductView {
    fn from_product(product: Product) -> Self {
        let Product {
            id,
            name,
            price_cents,
            stock,
            category,
            tags,
            updated_at,
            ..
        } = product;

        Self {
            id,
            name,
            price: format!("{:.2}", price_cents as f64 / 100.0),
            stock,
            category,
            tags,
            updated_at,
        }
    }
}
