pub mod rate_limit;

pub use rate_limit::{per_minute_limiter, rate_limit_middleware, KeyedLimiter};
