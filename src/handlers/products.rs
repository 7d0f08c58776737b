use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use super::extract::{ProductId, ValidatedJson};
use crate::{
    db::duplicate_name,
    error::{AppError, AppResult},
    models::{NewProduct, Product, ProductCreate, ProductUpdate},
    AppState,
};

fn id_not_found(id: i32) -> AppError {
    warn!(id, "Product not found");
    AppError::NotFound(format!("Product with id {} not found", id))
}

fn name_not_found(name: &str) -> AppError {
    warn!(name, "Product not found");
    AppError::NotFound(format!("Product with name '{}' not found", name))
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.store.list().await?;
    info!(count = products.len(), "Listed products");
    Ok(Json(products))
}

// ── Get ───────────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    ProductId(id): ProductId,
) -> AppResult<Json<Product>> {
    let product = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| id_not_found(id))?;

    info!(id, "Fetched product");
    Ok(Json(product))
}

pub async fn get_product_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state
        .store
        .find_by_name(&name)
        .await?
        .ok_or_else(|| name_not_found(&name))?;

    info!(id = product.id, name = %product.name, "Fetched product by name");
    Ok(Json(product))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProductCreate>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let new = NewProduct::from(payload);

    // Fast path only; a concurrent insert of the same name is still caught by the
    // store's unique constraint.
    if state.store.find_by_name(&new.name).await?.is_some() {
        warn!(name = %new.name, "Rejected duplicate product name");
        return Err(duplicate_name(&new.name));
    }

    let product = state.store.insert(&new).await?;

    info!(id = product.id, name = %product.name, "Created product");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "msg": "Product created successfully",
            "id": product.id,
            "name": product.name,
        })),
    ))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ValidatedJson(patch): ValidatedJson<ProductUpdate>,
) -> AppResult<Json<serde_json::Value>> {
    if patch.is_empty() {
        info!(name = %name, "Update with no fields, nothing written");
        return Ok(Json(json!({ "msg": "No fields to update" })));
    }

    let product = state
        .store
        .update_by_name(&name, &patch)
        .await?
        .ok_or_else(|| name_not_found(&name))?;

    let updated_fields = patch.supplied_fields();
    info!(id = product.id, name = %product.name, fields = ?updated_fields, "Updated product");

    Ok(Json(json!({
        "msg": "Product updated successfully",
        "id": product.id,
        "name": product.name,
        "updated_fields": updated_fields,
    })))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    ProductId(id): ProductId,
) -> AppResult<Json<serde_json::Value>> {
    let product = state
        .store
        .delete(id)
        .await?
        .ok_or_else(|| id_not_found(id))?;

    info!(id, name = %product.name, "Deleted product");

    Ok(Json(json!({
        "msg": "Product deleted successfully",
        "id": product.id,
        "name": product.name,
    })))
}
