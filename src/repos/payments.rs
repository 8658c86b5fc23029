use std::{convert::TryInto, sync::Arc};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::{Postgres, Transaction};
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::{
    database::{is_foreign_key_violation, PostgresConnection},
    models,
    pagination::{Page, PageParams},
    payments::domain::{
        reference, schedule::ScheduleEntry, NewPayment, Payment, PaymentStatus, PostedPayment,
    },
};

/// How many references to try before giving up on a posting.
const MAX_REFERENCE_ATTEMPTS: usize = 3;

/// Failures that can occur while posting a payment. Every failure leaves the
/// database untouched.
#[derive(Debug, Error)]
pub enum PostingError {
    /// The customer being paid against does not exist.
    #[error("customer does not exist")]
    CustomerNotFound,

    /// Applying the payment would drive the outstanding balance below zero.
    #[error("payment exceeds the outstanding balance")]
    InsufficientBalance,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for PostingError {
    fn from(error: sqlx::Error) -> Self {
        if is_foreign_key_violation(&error) {
            Self::CustomerNotFound
        } else {
            Self::Other(error.into())
        }
    }
}

pub type DynPaymentRepo = Arc<dyn PaymentRepo + Send + Sync>;

#[async_trait]
pub trait PaymentRepo {
    /// Post a payment against a customer.
    ///
    /// Inserting the payment, decrementing the customer's outstanding balance,
    /// and settling their next pending installment all happen in a single
    /// transaction. Either every effect is visible afterwards, or none are.
    ///
    /// # Arguments
    ///
    /// * `customer_id` - The ID of the customer being paid against.
    /// * `payment` - The validated payment to record.
    ///
    /// # Returns
    ///
    /// The persisted payment and the customer's updated state.
    async fn post_payment(
        &self,
        customer_id: Uuid,
        payment: &NewPayment,
    ) -> Result<PostedPayment, PostingError>;

    /// Get a single payment by its reference.
    async fn get_payment(&self, reference: &str) -> anyhow::Result<Option<Payment>>;

    /// List a customer's payments, most recent first.
    async fn list_payments(
        &self,
        customer_id: Uuid,
        page: PageParams,
    ) -> anyhow::Result<Page<Payment>>;

    /// List a customer's installment schedule ordered by due date.
    async fn list_schedule(&self, customer_id: Uuid) -> anyhow::Result<Vec<ScheduleEntry>>;
}

/// Insert the payment row, regenerating the reference if it collides with an
/// existing one.
async fn insert_payment(
    tx: &mut Transaction<'_, Postgres>,
    customer_id: Uuid,
    payment: &NewPayment,
) -> Result<models::payments::Payment, PostingError> {
    for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
        // Postgres stores microseconds, so truncate to keep the returned
        // timestamp identical to what is read back later.
        let paid_at = Utc::now().trunc_subsecs(6);
        let payment_reference = reference::generate(paid_at);

        let inserted = sqlx::query_as::<_, models::payments::Payment>(
            r#"
            INSERT INTO payments (
                id, payment_reference, customer_id, account_number, payment_date,
                payment_amount, status, payment_method, transaction_id, remarks
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (payment_reference) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&payment_reference)
        .bind(customer_id)
        .bind(payment.account_number())
        .bind(paid_at)
        .bind(payment.amount().value())
        .bind(PaymentStatus::Success.as_str())
        .bind(payment.method().as_str())
        .bind(payment.transaction_id())
        .bind(payment.remarks())
        .fetch_optional(&mut *tx)
        .await?;

        match inserted {
            Some(model) => return Ok(model),
            None => warn!(%payment_reference, attempt, "Payment reference collided."),
        }
    }

    Err(anyhow!(
        "Failed to generate a unique payment reference after {} attempts.",
        MAX_REFERENCE_ATTEMPTS
    )
    .into())
}

#[async_trait]
impl PaymentRepo for PostgresConnection {
    async fn post_payment(
        &self,
        customer_id: Uuid,
        payment: &NewPayment,
    ) -> Result<PostedPayment, PostingError> {
        // Returning early drops the transaction, which rolls it back.
        let mut tx = self.begin().await?;

        let payment_model = insert_payment(&mut tx, customer_id, payment).await?;

        // The decrement is relative so that concurrent postings against the
        // same customer serialize on the row lock instead of overwriting each
        // other. The guard keeps the balance from going negative.
        let customer_model = sqlx::query_as::<_, models::customers::Customer>(
            r#"
            UPDATE customers
            SET
                outstanding_balance = outstanding_balance - $1,
                updated_at = now()
            WHERE id = $2 AND outstanding_balance >= $1
            RETURNING *
            "#,
        )
        .bind(payment.amount().value())
        .bind(customer_id)
        .fetch_optional(&mut tx)
        .await?;

        let customer_model = match customer_model {
            Some(model) => model,
            None => {
                debug!(%customer_id, amount = %payment.amount(), "Payment would overdraw balance.");

                return Err(PostingError::InsufficientBalance);
            }
        };

        let pending_entry = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM payment_schedule
            WHERE customer_id = $1 AND status = 'PENDING'
            ORDER BY due_date, id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&mut tx)
        .await?;

        if let Some(entry_id) = pending_entry {
            sqlx::query(
                r#"
                UPDATE payment_schedule
                SET
                    paid_amount = paid_amount + $1,
                    status = 'PAID'
                WHERE id = $2
                "#,
            )
            .bind(payment.amount().value())
            .bind(entry_id)
            .execute(&mut tx)
            .await?;

            debug!(%customer_id, %entry_id, "Marked installment as paid.");
        }

        tx.commit().await?;

        info!(
            payment_reference = %payment_model.payment_reference,
            account_number = %payment_model.account_number,
            amount = %payment.amount(),
            "Posted payment."
        );

        Ok(PostedPayment {
            payment: payment_model.try_into()?,
            customer: customer_model.try_into()?,
        })
    }

    async fn get_payment(&self, reference: &str) -> anyhow::Result<Option<Payment>> {
        trace!(%reference, "Querying for payment by reference.");

        let payment = sqlx::query_as::<_, models::payments::Payment>(
            r#"
            SELECT *
            FROM payments
            WHERE payment_reference = $1
            "#,
        )
        .bind(reference)
        .fetch_optional(&**self)
        .await?;

        payment.map(TryInto::try_into).transpose()
    }

    async fn list_payments(
        &self,
        customer_id: Uuid,
        page: PageParams,
    ) -> anyhow::Result<Page<Payment>> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM payments
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_one(&**self)
        .await?;

        let payments = sqlx::query_as::<_, models::payments::Payment>(
            r#"
            SELECT *
            FROM payments
            WHERE customer_id = $1
            ORDER BY payment_date DESC, created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(customer_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&**self)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<anyhow::Result<Vec<Payment>>>()?;

        Ok(Page::new(payments, page, total.try_into()?))
    }

    async fn list_schedule(&self, customer_id: Uuid) -> anyhow::Result<Vec<ScheduleEntry>> {
        sqlx::query_as::<_, models::payments::ScheduleEntry>(
            r#"
            SELECT *
            FROM payment_schedule
            WHERE customer_id = $1
            ORDER BY due_date, id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&**self)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }
}
