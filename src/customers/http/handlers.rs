use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::error;

use crate::{
    customers::{
        domain::{CustomerQuery, CustomerStatus, CustomerUpdateData, NewCustomerData},
        services::{CreateCustomerError, CustomerService, UpdateCustomerError},
    },
    http_err::{ApiError, ApiResponse},
    pagination::{Page, PageParams},
    server::AppState,
};

use super::reps;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(get_customers).post(create_customer))
        .route(
            "/customers/:account_number",
            get(get_customer).put(update_customer),
        )
}

fn customer_not_found(account_number: &str) -> ApiError {
    ApiError::NotFound(format!(
        "No customer found with account number {}.",
        account_number
    ))
}

#[derive(Deserialize)]
struct GetCustomersParams {
    status: Option<String>,
    search: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
}

async fn get_customers(
    State(customer_service): State<CustomerService>,
    Query(params): Query<GetCustomersParams>,
) -> ApiResponse<Json<Page<reps::Customer>>> {
    let status = match params.status.as_deref() {
        None | Some("") => None,
        Some(raw) => match raw.parse::<CustomerStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                return Err(ApiError::BadRequestReason(
                    "Valid statuses are 'ACTIVE', 'CLOSED', or 'DEFAULT'.".to_owned(),
                ))
            }
        },
    };

    let query = CustomerQuery {
        status,
        search: params.search,
        page: PageParams::new(params.page, params.per_page),
    };

    match customer_service.list_customers(query).await {
        Ok(customers) => Ok(Json(customers.map(|customer| customer.into()))),
        Err(error) => {
            error!(?error, "Failed to list customers.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_customer(
    State(customer_service): State<CustomerService>,
    Path(account_number): Path<String>,
) -> ApiResponse<Json<reps::Customer>> {
    match customer_service.get_customer(&account_number).await {
        Ok(Some(customer)) => Ok(Json((&customer).into())),
        Ok(None) => Err(customer_not_found(&account_number)),
        Err(error) => {
            error!(?error, %account_number, "Failed to query for customer.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn create_customer(
    State(customer_service): State<CustomerService>,
    Json(new_customer_data): Json<NewCustomerData>,
) -> ApiResponse<(StatusCode, Json<reps::Customer>)> {
    match customer_service.create_customer(new_customer_data).await {
        Ok(customer) => Ok((StatusCode::CREATED, Json(reps::Customer::from(&customer)))),
        Err(CreateCustomerError::Invalid(errors)) => Err(errors.into()),
        Err(CreateCustomerError::DuplicateAccount(account_number)) => Err(ApiError::Conflict(
            format!("Account number {} is already in use.", account_number),
        )),
        Err(CreateCustomerError::Other(error)) => Err(error.into()),
    }
}

async fn update_customer(
    State(customer_service): State<CustomerService>,
    Path(account_number): Path<String>,
    Json(update_data): Json<CustomerUpdateData>,
) -> ApiResponse<Json<reps::Customer>> {
    match customer_service
        .update_customer(&account_number, update_data)
        .await
    {
        Ok(customer) => Ok(Json(reps::Customer::from(&customer))),
        Err(UpdateCustomerError::Invalid(errors)) => Err(errors.into()),
        Err(UpdateCustomerError::NotFound(_)) => Err(customer_not_found(&account_number)),
        Err(UpdateCustomerError::Other(error)) => {
            error!(?error, %account_number, "Failed to update customer.");

            Err(ApiError::InternalServerError)
        }
    }
}
