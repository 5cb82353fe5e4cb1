//! Route definitions for the warehouse inventory API

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Account routes, register and login are public
        .nest("/user", user_routes(state.clone()))
        // Everything below needs a bearer token
        .merge(protected_routes(state))
}

/// Account routes
fn user_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/getusers", get(handlers::list_users))
        .route("/me", get(handlers::get_me))
        .route(
            "/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/departments", department_routes())
        .nest("/warehouses", warehouse_routes())
        .nest("/materials", material_routes())
        .nest("/schemes", scheme_routes())
        .nest("/potracking", po_tracking_routes())
        .merge(stock_routes())
        .nest("/schemeMaterialMapping", mapping_routes())
        .merge(report_routes())
        .nest("/roles", role_routes())
        .nest("/notifications", notification_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_departments).post(handlers::create_department))
        .route(
            "/:id",
            get(handlers::get_department)
                .put(handlers::update_department)
                .delete(handlers::delete_department),
        )
}

fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouses).post(handlers::create_warehouse))
        .route(
            "/:id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
}

fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_materials).post(handlers::create_material))
        .route("/download", get(handlers::download_materials))
        .route("/upload", post(handlers::upload_materials))
        .route(
            "/:id",
            get(handlers::get_material)
                .put(handlers::update_material)
                .delete(handlers::delete_material),
        )
}

fn scheme_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_schemes).post(handlers::create_scheme))
        .route(
            "/:id",
            get(handlers::get_scheme)
                .put(handlers::update_scheme)
                .delete(handlers::delete_scheme),
        )
}

fn po_tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_po_tracking).post(handlers::create_po_tracking))
        .route(
            "/:id",
            get(handlers::get_po_tracking)
                .put(handlers::update_po_tracking)
                .delete(handlers::delete_po_tracking),
        )
}

/// Store-in, stock-out and remaining stock live at the API root
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/storein", get(handlers::list_store_in).post(handlers::save_store_in))
        .route("/storein/:id", delete(handlers::delete_store_in))
        .route("/checkscheme/:scheme", get(handlers::check_store_in_scheme))
        .route("/stockout", get(handlers::list_stock_out).post(handlers::save_stock_out))
        .route("/stockout/:id", delete(handlers::delete_stock_out))
        .route("/stockout/checkscheme/:scheme", get(handlers::check_stock_out_scheme))
        .route("/remaining-stock/:scheme", get(handlers::get_remaining_stock))
}

fn mapping_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_mappings).post(handlers::save_mappings))
        .route("/:scheme", get(handlers::get_scheme_mappings))
        .route("/item/:id", delete(handlers::delete_mapping))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/Stock-report-exl", post(handlers::stock_report_xlsx))
        .route("/StockPdf-report", post(handlers::stock_report_pdf))
        .route("/storein-report-by-scheme", post(handlers::store_in_report_pdf))
        .route("/stockout-report-by-scheme", post(handlers::stock_out_report_pdf))
}

fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_roles).post(handlers::create_role))
        .route("/specificRoles/:role_id", get(handlers::get_role_policies))
        .route(
            "/:role_id",
            get(handlers::get_role)
                .put(handlers::update_role)
                .delete(handlers::delete_role),
        )
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_notifications))
        .route("/unread-count", get(handlers::get_unread_count))
        .route("/read-all", put(handlers::mark_all_as_read))
        .route("/:id/read", put(handlers::mark_as_read))
}
