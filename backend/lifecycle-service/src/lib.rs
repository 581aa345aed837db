pub mod configs;
pub mod error;
pub mod logger;
pub mod payments;
pub mod records;
