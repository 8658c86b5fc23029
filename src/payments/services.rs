use thiserror::Error;
use tracing::debug;
use validator::ValidationErrors;

use crate::{
    customers::domain::Customer,
    money::Amount,
    pagination::{Page, PageParams},
    repos::{DynCustomerRepo, DynPaymentRepo, PostingError},
};

use super::domain::{schedule::ScheduleEntry, NewPayment, NewPaymentData, Payment, PostedPayment};

/// A service object providing payment posting and payment history.
#[derive(Clone)]
pub struct PaymentService {
    customer_repo: DynCustomerRepo,
    payment_repo: DynPaymentRepo,
}

#[derive(Debug, Error)]
pub enum PostPaymentError {
    /// The provided payment data is invalid.
    #[error("invalid payment data: {0}")]
    Invalid(ValidationErrors),

    #[error("no customer with account number {0:?}")]
    CustomerNotFound(String),

    /// The payment is larger than what the customer currently owes.
    #[error("payment of {amount} exceeds outstanding balance of {outstanding}")]
    ExceedsBalance { amount: Amount, outstanding: Amount },

    /// The balance dropped below the payment amount between the balance check
    /// and the posting, typically because of a concurrent posting.
    #[error("outstanding balance changed while posting")]
    BalanceConflict,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors for operations scoped to a single customer.
#[derive(Debug, Error)]
pub enum CustomerLookupError {
    #[error("no customer with account number {0:?}")]
    CustomerNotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PaymentService {
    /// Create a new payment service.
    ///
    /// # Arguments
    ///
    /// * `customer_repo` - The repository used to resolve account numbers.
    /// * `payment_repo` - The repository used to post and query payments.
    pub fn new(customer_repo: DynCustomerRepo, payment_repo: DynPaymentRepo) -> Self {
        Self {
            customer_repo,
            payment_repo,
        }
    }

    /// Post a payment against a customer's account.
    ///
    /// The account must exist and the amount may not exceed the customer's
    /// outstanding balance. The balance is checked again inside the posting
    /// transaction, so a concurrent posting that drains the balance first
    /// results in [`PostPaymentError::BalanceConflict`] rather than a
    /// negative balance.
    pub async fn post_payment(
        &self,
        data: NewPaymentData,
    ) -> Result<PostedPayment, PostPaymentError> {
        let new_payment = NewPayment::from_data(data).map_err(PostPaymentError::Invalid)?;

        let customer = self.resolve_customer(new_payment.account_number()).await?;

        if new_payment.amount() > customer.outstanding_balance {
            debug!(
                account_number = %customer.account_number,
                amount = %new_payment.amount(),
                outstanding = %customer.outstanding_balance,
                "Payment exceeds outstanding balance."
            );

            return Err(PostPaymentError::ExceedsBalance {
                amount: new_payment.amount(),
                outstanding: customer.outstanding_balance,
            });
        }

        match self.payment_repo.post_payment(customer.id, &new_payment).await {
            Ok(posted) => Ok(posted),
            Err(PostingError::CustomerNotFound) => Err(PostPaymentError::CustomerNotFound(
                new_payment.account_number().to_owned(),
            )),
            Err(PostingError::InsufficientBalance) => Err(PostPaymentError::BalanceConflict),
            Err(PostingError::Other(error)) => Err(error.into()),
        }
    }

    pub async fn get_payment(&self, reference: &str) -> anyhow::Result<Option<Payment>> {
        self.payment_repo.get_payment(reference).await
    }

    /// List a customer's payments, most recent first.
    pub async fn list_payments(
        &self,
        account_number: &str,
        page: PageParams,
    ) -> Result<Page<Payment>, CustomerLookupError> {
        let customer = self.find_customer(account_number).await?;

        Ok(self.payment_repo.list_payments(customer.id, page).await?)
    }

    /// List a customer's installment schedule, earliest due date first.
    pub async fn list_schedule(
        &self,
        account_number: &str,
    ) -> Result<Vec<ScheduleEntry>, CustomerLookupError> {
        let customer = self.find_customer(account_number).await?;

        Ok(self.payment_repo.list_schedule(customer.id).await?)
    }

    async fn find_customer(&self, account_number: &str) -> Result<Customer, CustomerLookupError> {
        self.customer_repo
            .get_customer(account_number)
            .await?
            .ok_or_else(|| CustomerLookupError::CustomerNotFound(account_number.to_owned()))
    }

    async fn resolve_customer(&self, account_number: &str) -> Result<Customer, PostPaymentError> {
        match self.find_customer(account_number).await {
            Ok(customer) => Ok(customer),
            Err(CustomerLookupError::CustomerNotFound(account)) => {
                Err(PostPaymentError::CustomerNotFound(account))
            }
            Err(CustomerLookupError::Other(error)) => Err(error.into()),
        }
    }
}
