//! # Message bus
//!
//! Typed publish/subscribe channel the view layer uses to announce state
//! changes. Subscribers register per event type, either as a channel
//! [`Consumer`] or as a callback. Delivery within one event type is in
//! publish order; nothing is promised across event types.
//!
//! ```rust
//! use luyview::message_bus::{FilterChanged, MessageBus};
//! use luyview::metamodel::{TypeCategory, TypeKey};
//!
//! let bus = MessageBus::new();
//! let mut consumer = bus.subscribe::<FilterChanged>();
//!
//! let type_key = TypeKey { category: TypeCategory::Substantial, persistent_name: "App".into() };
//! bus.publish(FilterChanged { type_key: type_key.clone() }).unwrap();
//!
//! assert_eq!(consumer.try_recv().unwrap().type_key, type_key);
//! ```
//!
//! The bus is handed around as an `Arc<MessageBus>`; there is no global
//! instance.

pub use error_handling::{MessageBusError, MessageBusResult};
pub use events::*;
pub use sync_bus::{Consumer, MessageBus, SubscriptionId};

mod error_handling;
mod events;
mod sync_bus;
