//! Common utilities for the payment lifecycle service

pub mod consts;
pub mod errors;
pub mod ext_traits;
pub mod masking;
pub mod request;
pub mod types;

pub use errors::{CustomResult, ParsingError};
pub use masking::SecretSerdeValue;
pub use request::{Method, Request, RequestContent};
pub use types::{AmountConvertor, MinorUnit, RialMinorUnitForConnector};

/// Generate a time-ordered (time-sortable) unique identifier using the current time
#[inline]
pub fn generate_time_ordered_id(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::now_v7().as_simple())
}

pub mod date_time {
    use time::{OffsetDateTime, PrimitiveDateTime};

    /// Create a new [`PrimitiveDateTime`] with the current date and time in UTC.
    pub fn now() -> PrimitiveDateTime {
        let utc_date_time = OffsetDateTime::now_utc();
        PrimitiveDateTime::new(utc_date_time.date(), utc_date_time.time())
    }

    /// Return the UNIX timestamp of the current date and time in UTC
    pub fn now_unix_timestamp() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }
}

#[cfg(test)]
mod id_tests {
    use super::*;

    #[test]
    fn generated_ids_carry_the_prefix() {
        let id = generate_time_ordered_id("txn");
        assert!(id.starts_with("txn_"));
        assert!(id.len() > "txn_".len());
    }
}
