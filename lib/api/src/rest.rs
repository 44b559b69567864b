use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use actix_cors::Cors;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use estatex_search::AppContext;
use estatex_storage::{
    NewListing, NewSavedProperty, OwnedView, PropertyStore, SessionStore, StorageManager,
    UserProfile,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Shared state handed to every worker.
#[derive(Clone)]
pub struct ApiState {
    pub context: Arc<AppContext>,
    pub sessions: Arc<dyn SessionStore>,
    pub properties: Arc<dyn PropertyStore>,
}

impl ApiState {
    pub fn new(context: Arc<AppContext>, storage: Arc<StorageManager>) -> Self {
        Self {
            context,
            sessions: storage.clone(),
            properties: storage,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MoveMeterParams {
    from_city: Option<String>,
    to_city: Option<String>,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: ApiState, port: u16, workers: Option<usize>) -> std::io::Result<()> {
        info!(port, "Starting HTTP server");

        let mut server = HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(configure)
        });
        if let Some(workers) = workers {
            server = server.workers(workers);
        }

        server.bind(("0.0.0.0", port))?.run().await
    }
}

/// Register every route plus body/query error handlers that answer with
/// `{"error": ...}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::validation(format!("Invalid JSON body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::validation(err.to_string()).into()
    }))
    .route("/healthz", web::get().to(health))
    .route("/api/recommend_properties/", web::post().to(recommend_properties))
    .route("/api/move-meter/", web::get().to(move_meter))
    .route("/api/recommend/", web::post().to(recommend_rentals))
    .route("/api/estimate-price/", web::post().to(estimate_price))
    .route("/api/random-properties/", web::get().to(random_properties))
    .route("/api/save-property/", web::post().to(save_property))
    .route("/api/saved-properties/", web::get().to(saved_properties))
    .route("/api/remove-property/{id}/", web::delete().to(remove_property))
    .route("/api/properties_listings/", web::post().to(create_listing))
    .route("/api/properties_listings_get/", web::get().to(list_listings))
    .route("/api/properties_listings/{id}/", web::delete().to(delete_listing))
    .route("/api/me/", web::get().to(me))
    .default_service(web::to(not_found));
}

async fn not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(ApiError::not_found(format!("No route for {} {}", req.method(), req.path())))
}

async fn health(state: web::Data<ApiState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "properties": state.context.dataset().len()
    })))
}

async fn recommend_properties(
    state: web::Data<ApiState>,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let response = state.context.search().search_json(&body)?;
    Ok(HttpResponse::Ok().json(response))
}

async fn move_meter(
    state: web::Data<ApiState>,
    params: web::Query<MoveMeterParams>,
) -> ApiResult<HttpResponse> {
    let comparison = state
        .context
        .move_meter()?
        .compare(params.from_city.as_deref(), params.to_city.as_deref())?;
    Ok(HttpResponse::Ok().json(comparison))
}

async fn recommend_rentals(
    state: web::Data<ApiState>,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let results = state.context.rental()?.recommend(&body)?;
    Ok(HttpResponse::Ok().json(results))
}

async fn estimate_price(
    state: web::Data<ApiState>,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let valuation = state.context.valuation().estimate(&body)?;
    Ok(HttpResponse::Ok().json(valuation))
}

async fn random_properties(state: web::Data<ApiState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "properties": state.context.random_properties()
    })))
}

async fn save_property(
    state: web::Data<ApiState>,
    auth: AuthContext,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let new = NewSavedProperty::from_json(&body)?;
    let record = state.properties.save_property(auth.user_id(), new)?;
    Ok(HttpResponse::Created().json(OwnedView::new(&auth.user, &record)))
}

async fn saved_properties(
    state: web::Data<ApiState>,
    auth: AuthContext,
) -> ApiResult<HttpResponse> {
    let records = state.properties.saved_properties(auth.user_id())?;
    let views: Vec<_> = records.iter().map(|r| OwnedView::new(&auth.user, r)).collect();
    Ok(HttpResponse::Ok().json(views))
}

async fn remove_property(
    state: web::Data<ApiState>,
    auth: AuthContext,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    if state.properties.remove_property(auth.user_id(), path.into_inner())? {
        Ok(HttpResponse::Ok().json(json!({
            "message": "Property removed successfully"
        })))
    } else {
        Err(ApiError::not_found("Property not found or unauthorized"))
    }
}

async fn create_listing(
    state: web::Data<ApiState>,
    auth: AuthContext,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let new = NewListing::from_json(&body)?;
    let record = state.properties.create_listing(auth.user_id(), new)?;
    Ok(HttpResponse::Created().json(OwnedView::new(&auth.user, &record)))
}

async fn list_listings(
    state: web::Data<ApiState>,
    auth: AuthContext,
) -> ApiResult<HttpResponse> {
    let records = state.properties.listings(auth.user_id())?;
    let views: Vec<_> = records.iter().map(|r| OwnedView::new(&auth.user, r)).collect();
    Ok(HttpResponse::Ok().json(views))
}

async fn delete_listing(
    state: web::Data<ApiState>,
    auth: AuthContext,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    if state.properties.delete_listing(auth.user_id(), path.into_inner())? {
        Ok(HttpResponse::Ok().json(json!({
            "message": "Property deleted successfully"
        })))
    } else {
        Err(ApiError::not_found("Property not found or unauthorized"))
    }
}

async fn me(auth: AuthContext) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserProfile::from(&auth.user)))
}
