//! An in-memory store implementing the repository traits for tests.
//!
//! A single mutex guards all tables, so each operation is atomic in the same
//! way a database transaction would be.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    customers::domain::{Customer, CustomerQuery, CustomerStatus, CustomerUpdate, NewCustomer},
    money::Amount,
    pagination::{Page, PageParams},
    payments::domain::{
        reference,
        schedule::{self, ScheduleEntry, ScheduleStatus},
        NewPayment, Payment, PaymentStatus, PostedPayment,
    },
};

use super::{CustomerPersistenceError, CustomerRepo, PaymentRepo, PostingError};

#[derive(Default)]
struct Tables {
    customers: Vec<Customer>,
    payments: Vec<Payment>,
    schedule: Vec<ScheduleEntry>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

/// Build an active customer owing `balance` on a loan of the same size.
pub fn customer(account_number: &str, balance: &str) -> Customer {
    let balance = Amount::parse(balance).unwrap();
    let now = Utc::now();

    Customer {
        id: Uuid::new_v4(),
        account_number: account_number.to_owned(),
        customer_name: format!("Customer {}", account_number),
        phone: None,
        email: None,
        address: None,
        issue_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        interest_rate: Decimal::new(1200, 2),
        tenure_months: 36,
        emi_due: Amount::parse("5000").unwrap(),
        loan_amount: balance,
        outstanding_balance: balance,
        status: CustomerStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

impl InMemoryStore {
    pub fn with_customer(self, customer: Customer) -> Self {
        self.tables.lock().unwrap().customers.push(customer);
        self
    }

    pub fn add_installment(&self, customer_id: Uuid, due_date: NaiveDate, due_amount: &str) -> Uuid {
        let id = Uuid::new_v4();

        self.tables.lock().unwrap().schedule.push(ScheduleEntry {
            id,
            customer_id,
            due_date,
            due_amount: Amount::parse(due_amount).unwrap(),
            paid_amount: Amount::zero(),
            status: ScheduleStatus::Pending,
        });

        id
    }

    pub fn customer(&self, account_number: &str) -> Option<Customer> {
        self.tables
            .lock()
            .unwrap()
            .customers
            .iter()
            .find(|c| c.account_number == account_number)
            .cloned()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.tables.lock().unwrap().payments.clone()
    }

    pub fn schedule(&self) -> Vec<ScheduleEntry> {
        self.tables.lock().unwrap().schedule.clone()
    }
}

#[async_trait]
impl CustomerRepo for InMemoryStore {
    async fn get_customer(&self, account_number: &str) -> anyhow::Result<Option<Customer>> {
        Ok(self.customer(account_number))
    }

    async fn list_customers(&self, query: &CustomerQuery) -> anyhow::Result<Page<Customer>> {
        let tables = self.tables.lock().unwrap();
        let search = query.search.as_deref().map(str::to_lowercase);

        let mut matching = tables
            .customers
            .iter()
            .filter(|c| query.status.map_or(true, |status| c.status == status))
            .filter(|c| {
                search.as_deref().map_or(true, |search| {
                    c.account_number.to_lowercase().contains(search)
                        || c.customer_name.to_lowercase().contains(search)
                })
            })
            .cloned()
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .collect();

        Ok(Page::new(items, query.page, total))
    }

    async fn create_customer(
        &self,
        customer: &NewCustomer,
    ) -> Result<Customer, CustomerPersistenceError> {
        let mut tables = self.tables.lock().unwrap();

        if tables
            .customers
            .iter()
            .any(|c| c.account_number == customer.account_number)
        {
            return Err(CustomerPersistenceError::DuplicateAccount(
                customer.account_number.clone(),
            ));
        }

        let now = Utc::now();
        let created = Customer {
            id: customer.id,
            account_number: customer.account_number.clone(),
            customer_name: customer.customer_name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            address: customer.address.clone(),
            issue_date: customer.issue_date,
            interest_rate: customer.interest_rate,
            tenure_months: customer.tenure_months,
            emi_due: customer.emi_due,
            loan_amount: customer.loan_amount,
            outstanding_balance: customer.outstanding_balance,
            status: customer.status,
            created_at: now,
            updated_at: now,
        };
        tables.customers.push(created.clone());

        Ok(created)
    }

    async fn update_customer(
        &self,
        account_number: &str,
        update: &CustomerUpdate,
    ) -> anyhow::Result<Option<Customer>> {
        let mut tables = self.tables.lock().unwrap();

        let customer = match tables
            .customers
            .iter_mut()
            .find(|c| c.account_number == account_number)
        {
            Some(customer) => customer,
            None => return Ok(None),
        };

        if let Some(name) = &update.customer_name {
            customer.customer_name = name.clone();
        }
        if let Some(phone) = &update.phone {
            customer.phone = Some(phone.clone());
        }
        if let Some(email) = &update.email {
            customer.email = Some(email.clone());
        }
        if let Some(address) = &update.address {
            customer.address = Some(address.clone());
        }
        if let Some(emi_due) = update.emi_due {
            customer.emi_due = emi_due;
        }
        if let Some(status) = update.status {
            customer.status = status;
        }
        customer.updated_at = Utc::now();

        Ok(Some(customer.clone()))
    }
}

#[async_trait]
impl PaymentRepo for InMemoryStore {
    async fn post_payment(
        &self,
        customer_id: Uuid,
        payment: &NewPayment,
    ) -> Result<PostedPayment, PostingError> {
        let mut tables = self.tables.lock().unwrap();

        let customer_index = tables
            .customers
            .iter()
            .position(|c| c.id == customer_id)
            .ok_or(PostingError::CustomerNotFound)?;

        let customer = &mut tables.customers[customer_index];
        if customer.outstanding_balance < payment.amount() {
            return Err(PostingError::InsufficientBalance);
        }
        customer.outstanding_balance = customer
            .outstanding_balance
            .checked_sub(payment.amount())
            .ok_or(PostingError::InsufficientBalance)?;
        customer.updated_at = Utc::now();
        let customer = customer.clone();

        let paid_at = Utc::now();
        let posted = Payment {
            id: Uuid::new_v4(),
            payment_reference: reference::generate(paid_at),
            customer_id,
            account_number: payment.account_number().to_owned(),
            payment_date: paid_at,
            payment_amount: payment.amount(),
            status: PaymentStatus::Success,
            payment_method: payment.method(),
            transaction_id: payment.transaction_id().map(String::from),
            remarks: payment.remarks().map(String::from),
            created_at: paid_at,
        };
        tables.payments.push(posted.clone());

        let customer_entries = tables
            .schedule
            .iter()
            .filter(|entry| entry.customer_id == customer_id)
            .cloned()
            .collect::<Vec<_>>();
        if let Some(next) = schedule::next_pending(&customer_entries) {
            let next_id = next.id;

            if let Some(entry) = tables.schedule.iter_mut().find(|e| e.id == next_id) {
                entry.paid_amount = entry
                    .paid_amount
                    .checked_add(payment.amount())
                    .unwrap_or(entry.paid_amount);
                entry.status = ScheduleStatus::Paid;
            }
        }

        Ok(PostedPayment {
            payment: posted,
            customer,
        })
    }

    async fn get_payment(&self, reference: &str) -> anyhow::Result<Option<Payment>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .payments
            .iter()
            .find(|p| p.payment_reference == reference)
            .cloned())
    }

    async fn list_payments(
        &self,
        customer_id: Uuid,
        page: PageParams,
    ) -> anyhow::Result<Page<Payment>> {
        let tables = self.tables.lock().unwrap();

        // Newest insertions first so that equal timestamps still list the
        // latest payment first.
        let mut payments = tables
            .payments
            .iter()
            .rev()
            .filter(|p| p.customer_id == customer_id)
            .cloned()
            .collect::<Vec<_>>();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));

        let total = payments.len() as u64;
        let items = payments
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(Page::new(items, page, total))
    }

    async fn list_schedule(&self, customer_id: Uuid) -> anyhow::Result<Vec<ScheduleEntry>> {
        let mut entries = self
            .tables
            .lock()
            .unwrap()
            .schedule
            .iter()
            .filter(|e| e.customer_id == customer_id)
            .cloned()
            .collect::<Vec<_>>();
        entries.sort_by_key(|e| (e.due_date, e.id));

        Ok(entries)
    }
}
