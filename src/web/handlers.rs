use crate::core::catalog::Product;
use crate::core::customer::NewCustomer;
use crate::core::order::{FinalizedOrder, OrderRequest, PlacedOrder, QuoteRequest};
use crate::core::pricing::PricingResult;
use crate::service::QuoteService;
use crate::web::error::ApiError;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct CreatedCustomer {
    pub id: i64,
}

pub async fn list_products(State(service): State<Arc<QuoteService>>) -> Json<Vec<Product>> {
    Json(service.list_products().to_vec())
}

pub async fn create_customer(
    State(service): State<Arc<QuoteService>>,
    payload: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<Json<CreatedCustomer>, ApiError> {
    let Json(customer) = payload.map_err(ApiError::fields_for_body)?;
    let created = service
        .register_customer(customer)
        .await
        .map_err(ApiError::Fields)?;
    Ok(Json(CreatedCustomer { id: created.id }))
}

pub async fn quote(
    State(service): State<Arc<QuoteService>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<PricingResult>, ApiError> {
    let Json(request) = payload.map_err(ApiError::message_for_body)?;
    let result = service
        .quote(&request.items, request.target_currency.as_deref())
        .await
        .map_err(ApiError::Message)?;
    Ok(Json(result))
}

pub async fn create_order(
    State(service): State<Arc<QuoteService>>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<PlacedOrder>, ApiError> {
    let Json(request) = payload.map_err(ApiError::fields_for_body)?;
    let placed = service
        .place_order(&request)
        .await
        .map_err(ApiError::Fields)?;
    Ok(Json(placed))
}

pub async fn get_order(
    State(service): State<Arc<QuoteService>>,
    Path(order_id): Path<String>,
) -> Result<Json<FinalizedOrder>, ApiError> {
    let order = service
        .get_order(&order_id)
        .await
        .map_err(ApiError::Message)?;
    Ok(Json(order))
}
