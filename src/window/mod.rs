//! Time window codec
//!
//! A dashboard's time window lives in its location's query component:
//!
//! | Field          | Query keys            |
//! |----------------|-----------------------|
//! | `from`         | `from_ts`, `from`     |
//! | `to`           | `to_ts`, `to`         |
//! | `live`         | `live`                |
//! | `refresh_mode` | `refresh_mode`        |
//!
//! [`extract`] reads a [`TimeWindow`] from a location and [`apply`] writes one
//! back onto a copy of a location, leaving unrelated parameters untouched.

mod codec;
mod types;

pub use codec::{RECOGNIZED_KEYS, apply, extract};
pub use types::{DEFAULT_LIVE, TimeWindow};
