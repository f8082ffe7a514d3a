//! http handlers for service listings
//!
//! authentication and ownership checks belong to the identity layer in front
//! of these routes; handlers here validate payloads and map outcomes to status
//! codes only.

use crate::app::AppState;
use crate::model::{NewService, ServiceUpdate, ValidationError};
use crate::store::{ServiceStore, StoreError};
use actix_web::{web, HttpResponse, Result as ActixResult};

fn validation_error(err: ValidationError) -> actix_web::Error {
    actix_web::error::ErrorUnprocessableEntity(err.to_string())
}

fn store_error(err: StoreError) -> actix_web::Error {
    let error = err.to_string();
    logfire::error!("service store failure", error = &error);
    actix_web::error::ErrorInternalServerError("service store unavailable")
}

fn not_found() -> actix_web::Error {
    actix_web::error::ErrorNotFound("service not found")
}

/// POST /api/services
pub async fn create(body: web::Json<NewService>, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let new = body.into_inner();
    new.validate().map_err(validation_error)?;

    logfire::info!("create service requested", service_name = &new.name, provider_id = &new.provider_id);

    let created = state.lifecycle.create_service(new).await.map_err(store_error)?;
    Ok(HttpResponse::Created().json(created))
}

/// GET /api/services/{id}
pub async fn get(path: web::Path<String>, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match state.store.find_by_id(&id).await.map_err(store_error)? {
        Some(service) => Ok(HttpResponse::Ok().json(service)),
        None => Err(not_found()),
    }
}

/// PUT /api/services/{id}
pub async fn update(
    path: web::Path<String>,
    body: web::Json<ServiceUpdate>,
    state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    let update = body.into_inner();
    update.validate().map_err(validation_error)?;

    match state.lifecycle.update_service(&id, update).await.map_err(store_error)? {
        Some(service) => Ok(HttpResponse::Ok().json(service)),
        None => Err(not_found()),
    }
}

/// DELETE /api/services/{id}
pub async fn delete(path: web::Path<String>, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    if !state.store.delete(&id).await.map_err(store_error)? {
        return Err(not_found());
    }
    logfire::info!("service deleted", id = &id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "service deleted" })))
}

/// POST /api/services/{id}/usage
pub async fn report_usage(path: web::Path<String>, state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    if !state.store.increment_usage(&id).await.map_err(store_error)? {
        return Err(not_found());
    }
    logfire::info!("service usage reported", id = &id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "usage reported" })))
}
