use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::error;

use crate::{
    http_err::{ApiError, ApiResponse},
    pagination::{Page, PageQuery},
    payments::{
        domain::NewPaymentData,
        services::{CustomerLookupError, PaymentService, PostPaymentError},
    },
    server::AppState,
};

use super::reps;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/:reference", get(get_payment))
        .route(
            "/customers/:account_number/payments",
            get(get_customer_payments),
        )
        .route(
            "/customers/:account_number/schedule",
            get(get_customer_schedule),
        )
}

fn customer_not_found(account_number: &str) -> ApiError {
    ApiError::NotFound(format!(
        "No customer found with account number {}.",
        account_number
    ))
}

async fn create_payment(
    State(payment_service): State<PaymentService>,
    Json(new_payment_data): Json<NewPaymentData>,
) -> ApiResponse<(StatusCode, Json<reps::PostedPayment>)> {
    match payment_service.post_payment(new_payment_data).await {
        Ok(posted) => Ok((
            StatusCode::CREATED,
            Json(reps::PostedPayment::from(&posted)),
        )),
        Err(PostPaymentError::Invalid(errors)) => Err(errors.into()),
        Err(PostPaymentError::CustomerNotFound(account_number)) => {
            Err(customer_not_found(&account_number))
        }
        Err(PostPaymentError::ExceedsBalance {
            amount,
            outstanding,
        }) => Err(ApiError::BadRequestReason(format!(
            "Payment amount {} exceeds the outstanding balance of {}.",
            amount, outstanding
        ))),
        Err(PostPaymentError::BalanceConflict) => Err(ApiError::Conflict(
            "The outstanding balance changed while posting. Please retry.".to_owned(),
        )),
        Err(PostPaymentError::Other(error)) => {
            error!(?error, "Failed to post payment.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_payment(
    State(payment_service): State<PaymentService>,
    Path(reference): Path<String>,
) -> ApiResponse<Json<reps::Payment>> {
    match payment_service.get_payment(&reference).await {
        Ok(Some(payment)) => Ok(Json((&payment).into())),
        Ok(None) => Err(ApiError::NotFound(format!(
            "No payment found with reference {}.",
            reference
        ))),
        Err(error) => {
            error!(?error, %reference, "Failed to query for payment.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_customer_payments(
    State(payment_service): State<PaymentService>,
    Path(account_number): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResponse<Json<Page<reps::Payment>>> {
    match payment_service
        .list_payments(&account_number, page.into())
        .await
    {
        Ok(payments) => Ok(Json(payments.map(|payment| payment.into()))),
        Err(CustomerLookupError::CustomerNotFound(_)) => Err(customer_not_found(&account_number)),
        Err(CustomerLookupError::Other(error)) => {
            error!(?error, %account_number, "Failed to list payments.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_customer_schedule(
    State(payment_service): State<PaymentService>,
    Path(account_number): Path<String>,
) -> ApiResponse<Json<Vec<reps::ScheduleEntry>>> {
    match payment_service.list_schedule(&account_number).await {
        Ok(entries) => Ok(Json(entries.iter().map(reps::ScheduleEntry::from).collect())),
        Err(CustomerLookupError::CustomerNotFound(_)) => Err(customer_not_found(&account_number)),
        Err(CustomerLookupError::Other(error)) => {
            error!(?error, %account_number, "Failed to list payment schedule.");

            Err(ApiError::InternalServerError)
        }
    }
}
