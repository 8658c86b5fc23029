use std::{convert::TryInto, sync::Arc};

use async_trait::async_trait;
use sqlx::{FromRow, Postgres, QueryBuilder, Row};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::{
    customers::domain::{Customer, CustomerQuery, CustomerUpdate, NewCustomer},
    database::{is_unique_violation, PostgresConnection},
    models,
    pagination::Page,
};

#[derive(Debug, Error)]
pub enum CustomerPersistenceError {
    #[error("duplicate account number: {0:?}")]
    DuplicateAccount(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DynCustomerRepo = Arc<dyn CustomerRepo + Send + Sync>;

#[async_trait]
pub trait CustomerRepo {
    /// Get a single customer by their account number.
    ///
    /// # Returns
    ///
    /// An [`anyhow::Result`] containing the customer if one exists.
    async fn get_customer(&self, account_number: &str) -> anyhow::Result<Option<Customer>>;

    /// List the customers matching the provided query.
    ///
    /// # Arguments
    ///
    /// * `query` - The filters and page to return.
    async fn list_customers(&self, query: &CustomerQuery) -> anyhow::Result<Page<Customer>>;

    /// Persist a new customer. Account numbers must be unique.
    async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<Customer, CustomerPersistenceError>;

    /// Apply an administrative update to a customer.
    ///
    /// # Returns
    ///
    /// The updated customer, or [`None`] if no customer has the provided
    /// account number.
    async fn update_customer(
        &self,
        account_number: &str,
        update: &CustomerUpdate,
    ) -> anyhow::Result<Option<Customer>>;
}

/// Escape `LIKE` wildcards in user input and wrap it for a substring match.
fn contains_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    format!("%{}%", escaped)
}

fn push_customer_filters<'a>(
    query_builder: &mut QueryBuilder<'a, Postgres>,
    query: &'a CustomerQuery,
) {
    query_builder.push(" WHERE TRUE");

    if let Some(status) = query.status {
        query_builder
            .push(" AND c.status = ")
            .push_bind(status.as_str());
    }

    if let Some(search) = query.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            let pattern = contains_pattern(search);

            query_builder
                .push(" AND (c.account_number ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR c.customer_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[async_trait]
impl CustomerRepo for PostgresConnection {
    async fn get_customer(&self, account_number: &str) -> anyhow::Result<Option<Customer>> {
        trace!(%account_number, "Querying for customer by account number.");

        let customer = sqlx::query_as::<_, models::customers::Customer>(
            r#"
            SELECT *
            FROM customers
            WHERE account_number = $1
            "#,
        )
        .bind(account_number)
        .fetch_optional(&**self)
        .await?;

        match customer {
            Some(model) => Ok(Some(model.try_into()?)),
            None => {
                debug!(%account_number, "Customer does not exist.");

                Ok(None)
            }
        }
    }

    async fn list_customers(&self, query: &CustomerQuery) -> anyhow::Result<Page<Customer>> {
        let mut count_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM customers c");
        push_customer_filters(&mut count_builder, query);

        let total: i64 = count_builder
            .build()
            .fetch_one(&**self)
            .await?
            .try_get(0)?;

        let mut query_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT c.* FROM customers c");
        push_customer_filters(&mut query_builder, query);
        query_builder
            .push(" ORDER BY c.account_number LIMIT ")
            .push_bind(query.page.limit())
            .push(" OFFSET ")
            .push_bind(query.page.offset());

        let customers = query_builder
            .build()
            .fetch_all(&**self)
            .await?
            .iter()
            .map(models::customers::Customer::from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<anyhow::Result<Vec<Customer>>>()?;

        Ok(Page::new(customers, query.page, total.try_into()?))
    }

    async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<Customer, CustomerPersistenceError> {
        let result = sqlx::query_as::<_, models::customers::Customer>(
            r#"
            INSERT INTO customers (
                id, account_number, customer_name, phone, email, address,
                issue_date, interest_rate, tenure_months, emi_due, loan_amount,
                outstanding_balance, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(customer.id)
        .bind(&customer.account_number)
        .bind(&customer.customer_name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.issue_date)
        .bind(customer.interest_rate)
        .bind(customer.tenure_months)
        .bind(customer.emi_due.value())
        .bind(customer.loan_amount.value())
        .bind(customer.outstanding_balance.value())
        .bind(customer.status.as_str())
        .fetch_one(&**self)
        .await;

        match result {
            Ok(model) => {
                info!(id = %model.id, account_number = %model.account_number, "Created customer.");

                Ok(model.try_into()?)
            }
            Err(error) if is_unique_violation(&error) => Err(
                CustomerPersistenceError::DuplicateAccount(customer.account_number.clone()),
            ),
            Err(error) => Err(anyhow::Error::from(error).into()),
        }
    }

    async fn update_customer(
        &self,
        account_number: &str,
        update: &CustomerUpdate,
    ) -> anyhow::Result<Option<Customer>> {
        let updated = sqlx::query_as::<_, models::customers::Customer>(
            r#"
            UPDATE customers
            SET
                customer_name = COALESCE($2, customer_name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                address = COALESCE($5, address),
                emi_due = COALESCE($6, emi_due),
                status = COALESCE($7, status),
                updated_at = now()
            WHERE account_number = $1
            RETURNING *
            "#,
        )
        .bind(account_number)
        .bind(&update.customer_name)
        .bind(&update.phone)
        .bind(&update.email)
        .bind(&update.address)
        .bind(update.emi_due.map(|amount| amount.value()))
        .bind(update.status.map(|status| status.as_str()))
        .fetch_optional(&**self)
        .await?;

        match updated {
            Some(model) => {
                info!(%account_number, "Updated customer.");

                Ok(Some(model.try_into()?))
            }
            None => Ok(None),
        }
    }
}
