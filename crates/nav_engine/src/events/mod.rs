//! Typed publish/subscribe messaging
//!
//! The [`Hub`] delivers messages to every subscriber whose declared message
//! type matches, in registration order. Subscriptions are tied to an
//! [`Owner`]: once the owner is gone (its last strong reference dropped, or
//! its [`LifeToken`] destroyed) the subscription stops receiving messages and
//! is swept out of the registry by the next `publish` or `unsubscribe`.
//!
//! ```
//! use std::sync::Arc;
//! use nav_engine::events::{Hub, LifeToken, Message};
//!
//! struct ScoreChanged(u32);
//! impl Message for ScoreChanged {}
//!
//! let hub = Hub::new();
//! let owner = LifeToken::new();
//! hub.subscribe::<ScoreChanged>(&owner, Arc::new(|m: &ScoreChanged| assert_eq!(m.0, 7)));
//! hub.publish(ScoreChanged(7));
//!
//! owner.destroy();
//! hub.publish(ScoreChanged(8));
//! assert_eq!(hub.check_handler_count(false), 0);
//! ```

mod hub;
mod message;
mod owner;

pub use hub::{Handler, Hub, Predicate};
pub use message::Message;
pub use owner::{AsOwner, HostObject, LifeToken, Owner, OwnerKey};
