//! Wire types exchanged with the gateway API.
//!
//! Field names follow the gateway's `snake_case` JSON. Lamport amounts accept
//! either JSON numbers or decimal strings, and timestamps go through
//! [`Timestamp`](crate::Timestamp)'s lenient parser.
//!
//! - [`payment`] - payment lifecycle requests and responses
//! - [`session`] - the local [`Session`] record and the gateway's session grants
//! - [`merchant`] - merchant account, policy and reporting records

pub mod merchant;
pub mod payment;
pub mod session;

pub use merchant::*;
pub use payment::*;
pub use session::*;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) const fn default_true() -> bool {
    true
}

/// Extracts a list from a gateway response body.
///
/// The gateway returns collections either as a bare array or wrapped in an
/// object under one of `keys`. A `null` body, an object without any of the
/// keys, or a `null` under the key all yield an empty list.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the items do not match `T`, or if the
/// body is neither null, an array, nor an object.
pub fn list_from_value<T: DeserializeOwned>(
    value: Value,
    keys: &[&str],
) -> Result<Vec<T>, serde_json::Error> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => Vec::<T>::deserialize(value),
        Value::Object(mut map) => {
            let items = keys.iter().find_map(|key| map.remove(*key));
            match items {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(items) => Vec::<T>::deserialize(items),
            }
        }
        other => Vec::<T>::deserialize(other),
    }
}
