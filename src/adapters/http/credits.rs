//! Credit handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use super::{
    dto::{CreditDto, CreditView, CustomerCreditView, CustomerIdQuery, ListCreditView},
    error::ApiError,
};
use crate::{
    commands::{
        credit::{FindCredit, ListCredits, SaveCredit},
        DomainLogic,
    },
    ports::{credit::CreditPort, customer::CustomerPort},
};

/// Creates a credit for an existing customer
pub async fn save_credit<CU, CR>(
    State(domain): State<DomainLogic<CU, CR>>,
    Json(dto): Json<CreditDto>,
) -> Result<(StatusCode, Json<CreditView>), ApiError>
where
    CU: CustomerPort + Send + Sync + 'static,
    CR: CreditPort + Send + Sync + 'static,
{
    let new_credit = dto.into_new_credit(Utc::now().date_naive())?;
    let credit = domain.oneshot(SaveCredit(new_credit)).await?;
    Ok((StatusCode::CREATED, Json(credit.into())))
}

/// Lists the credits of a customer
pub async fn list_credits<CU, CR>(
    State(domain): State<DomainLogic<CU, CR>>,
    Query(query): Query<CustomerIdQuery>,
) -> Result<Json<ListCreditView>, ApiError>
where
    CU: Send + Sync + 'static,
    CR: CreditPort + Send + Sync + 'static,
{
    let credits = domain
        .oneshot(ListCredits {
            customer_id: query.customer_id,
        })
        .await?;
    Ok(Json(ListCreditView {
        credits: credits.into_iter().map(Into::into).collect(),
    }))
}

/// Gets a credit by code, for its owner only
pub async fn find_credit<CU, CR>(
    State(domain): State<DomainLogic<CU, CR>>,
    Path(credit_code): Path<Uuid>,
    Query(query): Query<CustomerIdQuery>,
) -> Result<Json<CustomerCreditView>, ApiError>
where
    CU: Send + Sync + 'static,
    CR: CreditPort + Send + Sync + 'static,
{
    let credit = domain
        .oneshot(FindCredit {
            credit_code,
            customer_id: query.customer_id,
        })
        .await?;
    Ok(Json(credit.into()))
}
