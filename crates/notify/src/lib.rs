//! Topic-scoped push notification hub.
//!
//! [`NotificationHub`] keeps a registry of live subscriber connections keyed
//! by topic and fans each published [`StateRecord`](offload_core::domain::StateRecord)
//! out to whoever is attached at that moment. Delivery is at-most-once,
//! best-effort: no buffering, no replay, no acknowledgment.

mod hub;

pub use hub::{NotificationHub, NotificationMessage, TopicSubscription, DEFAULT_CONNECTION_BUFFER};
