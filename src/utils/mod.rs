pub mod timezone;

pub use timezone::{now_rfc3339, parse_timezone};
