//! Customer handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tower::ServiceExt;

use super::{
    dto::{CustomerDto, CustomerIdQuery, CustomerUpdateDto, CustomerView},
    error::ApiError,
};
use crate::{
    commands::{
        customer::{DeleteCustomer, FindCustomer, SaveCustomer, UpdateCustomer},
        DomainLogic,
    },
    ports::customer::CustomerPort,
};

/// Registers a new customer
pub async fn save_customer<CU, CR>(
    State(domain): State<DomainLogic<CU, CR>>,
    Json(dto): Json<CustomerDto>,
) -> Result<(StatusCode, Json<CustomerView>), ApiError>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: Send + Sync + 'static,
{
    dto.validate()?;
    let customer = domain.oneshot(SaveCustomer(dto.into())).await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// Gets a customer by id
pub async fn find_customer<CU, CR>(
    State(domain): State<DomainLogic<CU, CR>>,
    Path(customer_id): Path<i64>,
) -> Result<Json<CustomerView>, ApiError>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: Send + Sync + 'static,
{
    let customer = domain.oneshot(FindCustomer { customer_id }).await?;
    Ok(Json(customer.into()))
}

/// Updates names, income and address of a customer
pub async fn update_customer<CU, CR>(
    State(domain): State<DomainLogic<CU, CR>>,
    Query(query): Query<CustomerIdQuery>,
    Json(dto): Json<CustomerUpdateDto>,
) -> Result<Json<CustomerView>, ApiError>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: Send + Sync + 'static,
{
    dto.validate()?;
    let customer = domain
        .oneshot(UpdateCustomer {
            customer_id: query.customer_id,
            patch: dto.into(),
        })
        .await?;
    Ok(Json(customer.into()))
}

/// Deletes a customer and their credits
pub async fn delete_customer<CU, CR>(
    State(domain): State<DomainLogic<CU, CR>>,
    Path(customer_id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: Send + Sync + 'static,
{
    domain.oneshot(DeleteCustomer { customer_id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
