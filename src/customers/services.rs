use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    pagination::Page,
    repos::{CustomerPersistenceError, DynCustomerRepo},
};

use super::domain::{
    Customer, CustomerQuery, CustomerUpdate, CustomerUpdateData, NewCustomer, NewCustomerData,
};

/// A service object providing the customer directory.
#[derive(Clone)]
pub struct CustomerService {
    customer_repo: DynCustomerRepo,
}

#[derive(Debug, Error)]
pub enum CreateCustomerError {
    /// The provided customer data is invalid.
    #[error("invalid customer data: {0}")]
    Invalid(ValidationErrors),

    /// Another customer already uses the account number.
    #[error("account number {0:?} is already in use")]
    DuplicateAccount(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum UpdateCustomerError {
    #[error("invalid customer update: {0}")]
    Invalid(ValidationErrors),

    #[error("no customer with account number {0:?}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CustomerService {
    pub fn new(customer_repo: DynCustomerRepo) -> Self {
        Self { customer_repo }
    }

    pub async fn get_customer(&self, account_number: &str) -> anyhow::Result<Option<Customer>> {
        self.customer_repo.get_customer(account_number).await
    }

    pub async fn list_customers(&self, query: CustomerQuery) -> anyhow::Result<Page<Customer>> {
        self.customer_repo.list_customers(&query).await
    }

    /// Create a new customer.
    ///
    /// # Arguments
    ///
    /// * `data` - The new customer's information. The outstanding balance
    ///   defaults to the loan amount.
    pub async fn create_customer(
        &self,
        data: NewCustomerData,
    ) -> Result<Customer, CreateCustomerError> {
        let new_customer = NewCustomer::from_data(data).map_err(CreateCustomerError::Invalid)?;

        match self.customer_repo.create_customer(&new_customer).await {
            Ok(customer) => Ok(customer),
            Err(CustomerPersistenceError::DuplicateAccount(account_number)) => {
                Err(CreateCustomerError::DuplicateAccount(account_number))
            }
            Err(CustomerPersistenceError::Other(error)) => Err(error.into()),
        }
    }

    pub async fn update_customer(
        &self,
        account_number: &str,
        data: CustomerUpdateData,
    ) -> Result<Customer, UpdateCustomerError> {
        let update = CustomerUpdate::from_data(data).map_err(UpdateCustomerError::Invalid)?;

        self.customer_repo
            .update_customer(account_number, &update)
            .await?
            .ok_or_else(|| UpdateCustomerError::NotFound(account_number.to_owned()))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::{
        customers::domain::{test::customer_data, CustomerStatus},
        pagination::PageParams,
        repos::memory::{customer, InMemoryStore},
    };

    use super::*;

    fn service(store: &InMemoryStore) -> CustomerService {
        CustomerService::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn create_customer_persists_valid_data() {
        let store = InMemoryStore::default();

        let created = service(&store)
            .create_customer(customer_data("ACC001"))
            .await
            .expect("customer should be created");

        assert_eq!("150000.00", created.outstanding_balance.format_value());
        assert_eq!(Some(created), store.customer("ACC001"));
    }

    #[tokio::test]
    async fn create_customer_rejects_duplicate_account() {
        let store = InMemoryStore::default().with_customer(customer("ACC001", "100"));

        let error = service(&store)
            .create_customer(customer_data("ACC001"))
            .await
            .expect_err("duplicate account");

        match error {
            CreateCustomerError::DuplicateAccount(account) => assert_eq!("ACC001", account),
            other => panic!("Unexpected error type: {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_customer_rejects_invalid_data() {
        let store = InMemoryStore::default();
        let data = NewCustomerData {
            tenure_months: 0,
            ..customer_data("ACC001")
        };

        let error = service(&store)
            .create_customer(data)
            .await
            .expect_err("invalid tenure");

        assert!(matches!(error, CreateCustomerError::Invalid(_)));
        assert_eq!(None, store.customer("ACC001"));
    }

    #[tokio::test]
    async fn update_customer_changes_provided_fields() {
        let store = InMemoryStore::default().with_customer(customer("ACC001", "100"));
        let data = CustomerUpdateData {
            status: Some("DEFAULT".to_owned()),
            ..Default::default()
        };

        let updated = service(&store)
            .update_customer("ACC001", data)
            .await
            .expect("update should succeed");

        assert_eq!(CustomerStatus::Default, updated.status);
        assert_eq!("Customer ACC001", updated.customer_name);
    }

    #[tokio::test]
    async fn update_unknown_customer() {
        let store = InMemoryStore::default();

        let error = service(&store)
            .update_customer("ACC404", CustomerUpdateData::default())
            .await
            .expect_err("customer does not exist");

        assert!(matches!(error, UpdateCustomerError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_customers_filters_and_pages() {
        let mut closed = customer("ACC003", "0");
        closed.status = CustomerStatus::Closed;
        let store = InMemoryStore::default()
            .with_customer(customer("ACC002", "100"))
            .with_customer(customer("ACC001", "100"))
            .with_customer(closed);

        let active = service(&store)
            .list_customers(CustomerQuery {
                status: Some(CustomerStatus::Active),
                search: None,
                page: PageParams::new(Some(1), Some(1)),
            })
            .await
            .unwrap();

        assert_eq!(2, active.total);
        assert_eq!(1, active.items.len());
        assert_eq!("ACC001", active.items[0].account_number);

        let searched = service(&store)
            .list_customers(CustomerQuery {
                search: Some("acc003".to_owned()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(1, searched.total);
        assert_eq!(CustomerStatus::Closed, searched.items[0].status);
    }
}
