use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::shared::app_state::AppState;
use crate::{handlers, system};

/// All application routes
pub fn configure_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM: CONNECTION AND SCHEMA
        // ========================================
        .route(
            "/api/test-connection",
            post(system::handlers::connection::test_connection),
        )
        .route("/api/tablas", get(system::handlers::schema::list_tables))
        .route(
            "/api/estructura-tablas",
            get(system::handlers::schema::table_structure),
        )
        .route(
            "/api/estructura-cct-deudas",
            get(system::handlers::schema::debt_structure),
        )
        // ========================================
        // MASTER DATA
        // ========================================
        .route("/api/datos", get(handlers::a001_entity::list_all))
        .route("/api/clientes", get(handlers::a002_client::list))
        .route("/api/proveedores", get(handlers::a003_provider::list))
        // ========================================
        // PROJECTIONS
        // ========================================
        .route(
            "/api/datos-totales",
            get(handlers::p900_entity_totals::list),
        )
        .route(
            "/api/datos-relacionados",
            get(handlers::p901_related_data::get_related_data),
        )
        .route(
            "/api/factura/:id",
            get(handlers::p902_invoice_detail::get_invoice_detail),
        )
        .route(
            "/api/detalle-factura",
            get(handlers::p902_invoice_detail::detail_tables_usage)
                .post(handlers::p902_invoice_detail::check_detail_tables),
        )
        // D400 Sales statistics dashboard
        .route(
            "/api/estadisticas-ventas",
            get(handlers::d400_sales_statistics::get_sales_statistics),
        )
        .with_state(state)
        .layer(middleware::from_fn(system::middleware::request_logger::request_logger))
        .layer(cors)
}
