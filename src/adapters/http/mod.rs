//! HTTP API
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /api/customers` | [`customers::save_customer`] |
//! | `GET /api/customers/:id` | [`customers::find_customer`] |
//! | `PATCH /api/customers?customerId=` | [`customers::update_customer`] |
//! | `DELETE /api/customers/:id` | [`customers::delete_customer`] |
//! | `POST /api/credits` | [`credits::save_credit`] |
//! | `GET /api/credits?customerId=` | [`credits::list_credits`] |
//! | `GET /api/credits/:creditCode?customerId=` | [`credits::find_credit`] |

pub mod credits;
pub mod customers;
pub mod dto;
pub mod error;
pub mod validation;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::{
    commands::DomainLogic,
    ports::{credit::CreditPort, customer::CustomerPort},
};

/// Creates the API router over the given stores
pub fn router<CU, CR>(domain: DomainLogic<CU, CR>) -> Router
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: CreditPort + Send + Sync + 'static,
{
    let customer_routes = Router::new()
        .route(
            "/",
            post(customers::save_customer::<CU, CR>).patch(customers::update_customer::<CU, CR>),
        )
        .route(
            "/:id",
            get(customers::find_customer::<CU, CR>).delete(customers::delete_customer::<CU, CR>),
        );

    let credit_routes = Router::new()
        .route(
            "/",
            post(credits::save_credit::<CU, CR>).get(credits::list_credits::<CU, CR>),
        )
        .route("/:credit_code", get(credits::find_credit::<CU, CR>));

    Router::new()
        .route("/health", get(health))
        .nest("/api/customers", customer_routes)
        .nest("/api/credits", credit_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(domain)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}
