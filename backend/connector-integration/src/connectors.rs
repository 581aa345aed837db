pub mod snapppay;

pub use self::snapppay::Snapppay;
