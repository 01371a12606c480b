use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use serde_json::json;

use crate::forms::products::{AddProductForm, EditProductForm};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::products;

#[get("/products/{id}")]
pub async fn get_product(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let product_id = path.into_inner();

    match products::get_product(repo.get_ref(), product_id) {
        Ok(view) => HttpResponse::Ok().json(json!({
            "message": "Product retrieved successfully.",
            "data": view,
        })),
        Err(err) => error_response("product", err),
    }
}

#[post("/products")]
pub async fn add_product(
    form: web::Json<AddProductForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match products::create_product(repo.get_ref(), form.into_inner()) {
        Ok(view) => HttpResponse::Created().json(json!({
            "message": "Product created successfully.",
            "data": view,
        })),
        Err(err) => error_response("product", err),
    }
}

/// Partial product update; a `tag_ids` field in the payload reconciles the
/// product's tag links against it as part of the same transaction.
#[put("/products/{id}")]
pub async fn update_product(
    path: web::Path<i32>,
    form: web::Json<EditProductForm>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let product_id = path.into_inner();

    match products::update_product(repo.get_ref(), product_id, form.into_inner()) {
        Ok(view) => HttpResponse::Ok().json(json!({
            "message": "Product updated successfully.",
            "data": view,
        })),
        Err(err) => error_response("product", err),
    }
}

#[delete("/products/{id}")]
pub async fn delete_product(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let product_id = path.into_inner();

    match products::delete_product(repo.get_ref(), product_id) {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Product deleted successfully." })),
        Err(err) => error_response("product", err),
    }
}
