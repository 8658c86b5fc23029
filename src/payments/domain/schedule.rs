use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::money::Amount;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScheduleStatus {
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("unknown schedule status: {0:?}")]
pub struct UnknownScheduleStatus(pub String);

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
        }
    }
}

impl FromStr for ScheduleStatus {
    type Err = UnknownScheduleStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "OVERDUE" => Ok(Self::Overdue),
            other => Err(UnknownScheduleStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single due installment in a customer's repayment plan.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub due_date: NaiveDate,
    pub due_amount: Amount,
    pub paid_amount: Amount,
    pub status: ScheduleStatus,
}

/// Pick the installment a posting settles: the pending entry with the earliest
/// due date, ties broken by ID.
#[cfg(test)]
pub(crate) fn next_pending(entries: &[ScheduleEntry]) -> Option<&ScheduleEntry> {
    entries
        .iter()
        .filter(|entry| entry.status == ScheduleStatus::Pending)
        .min_by_key(|entry| (entry.due_date, entry.id))
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(day: u32, status: ScheduleStatus) -> ScheduleEntry {
        ScheduleEntry {
            id: Uuid::new_v4(),
            customer_id: Uuid::nil(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            due_amount: Amount::parse("5000").unwrap(),
            paid_amount: Amount::zero(),
            status,
        }
    }

    #[test]
    fn next_pending_picks_earliest_due_date() {
        let entries = vec![
            entry(20, ScheduleStatus::Pending),
            entry(5, ScheduleStatus::Paid),
            entry(10, ScheduleStatus::Pending),
            entry(1, ScheduleStatus::Overdue),
        ];

        let next = next_pending(&entries).expect("a pending entry exists");

        assert_eq!(entries[2].id, next.id);
    }

    #[test]
    fn next_pending_without_pending_entries() {
        let entries = vec![entry(5, ScheduleStatus::Paid)];

        assert_eq!(None, next_pending(&entries));
    }
}
