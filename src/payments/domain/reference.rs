use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Prefix shared by every generated payment reference.
pub const REFERENCE_PREFIX: &str = "PAY";

const SUFFIX_LENGTH: usize = 8;

/// Generate a payment reference for a payment made at `paid_at`.
///
/// References combine the millisecond timestamp of the payment with 8 hex
/// characters taken from a random v4 UUID, eg `PAY1700000000000A1B2C3D4`.
/// Collisions are possible but vanishingly unlikely; the `payments` table
/// enforces uniqueness and posting regenerates on conflict.
pub fn generate(paid_at: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();

    format!(
        "{}{}{}",
        REFERENCE_PREFIX,
        paid_at.timestamp_millis(),
        random[..SUFFIX_LENGTH].to_uppercase()
    )
}
