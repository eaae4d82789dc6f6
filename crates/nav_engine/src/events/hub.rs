//! Message hub
//!
//! One mutex guards the registry. `publish` scans and sweeps under the lock,
//! then runs predicates and handlers after releasing it, so handler code may
//! subscribe, unsubscribe or publish without deadlocking.

use std::any::{type_name, Any, TypeId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::message::Message;
use super::owner::{AsOwner, Owner, OwnerKey};
use crate::core::config::HubConfig;

/// Shared message handler
///
/// Handler identity is the identity of the `Arc`; keep a clone to remove one
/// specific handler with [`Hub::unsubscribe_handler`].
pub type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Shared delivery filter; the handler runs only when it returns `true`
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

type ErasedHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;
type ErasedPredicate = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;

struct Subscription {
    owner: Owner,
    owner_key: OwnerKey,
    message_type: TypeId,
    type_name: &'static str,
    handler_key: usize,
    handler: ErasedHandler,
    predicate: Option<ErasedPredicate>,
}

impl Subscription {
    fn matches(&self, owner_key: OwnerKey, message_type: Option<TypeId>, handler_key: Option<usize>) -> bool {
        self.owner_key == owner_key
            && message_type.map_or(true, |t| t == self.message_type)
            && handler_key.map_or(true, |h| h == self.handler_key)
    }
}

/// A delivery scheduled by `publish`, run after the lock is released
struct Delivery {
    owner: Owner,
    message_type: TypeId,
    handler: ErasedHandler,
    predicate: Option<ErasedPredicate>,
}

fn handler_key<T: Message>(handler: &Handler<T>) -> usize {
    Arc::as_ptr(handler).cast::<()>() as usize
}

fn erase_handler<T: Message>(handler: Handler<T>) -> ErasedHandler {
    Arc::new(move |message: &dyn Any| {
        if let Some(message) = message.downcast_ref::<T>() {
            handler(message);
        }
    })
}

fn erase_predicate<T: Message>(predicate: Predicate<T>) -> ErasedPredicate {
    Arc::new(move |message: &dyn Any| message.downcast_ref::<T>().is_some_and(|m| predicate(m)))
}

/// Type-keyed publish/subscribe registry
///
/// The hub is `Send + Sync`; share it with `Arc<Hub>` when messages are
/// published from worker threads.
pub struct Hub {
    config: HubConfig,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl Hub {
    /// Create a hub with default configuration
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a hub with custom configuration
    pub fn with_config(config: HubConfig) -> Self {
        Self {
            config,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    // Handlers never run under the lock, so a poisoned registry is still consistent.
    fn registry(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe `handler` to messages of type `T` for as long as `owner` is alive
    ///
    /// Registering the same owner and handler twice delivers every message twice.
    pub fn subscribe<T: Message>(&self, owner: &impl AsOwner, handler: Handler<T>) {
        self.add_subscription(owner.as_owner(), handler, None);
    }

    /// Subscribe with a predicate evaluated at delivery time
    pub fn subscribe_filtered<T: Message>(
        &self,
        owner: &impl AsOwner,
        handler: Handler<T>,
        predicate: Predicate<T>,
    ) {
        self.add_subscription(owner.as_owner(), handler, Some(erase_predicate(predicate)));
    }

    fn add_subscription<T: Message>(
        &self,
        owner: Owner,
        handler: Handler<T>,
        predicate: Option<ErasedPredicate>,
    ) {
        let subscription = Subscription {
            owner_key: owner.key(),
            owner,
            message_type: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            handler_key: handler_key(&handler),
            handler: erase_handler(handler),
            predicate,
        };
        log::trace!(
            "Subscribe {} ({} owner)",
            subscription.type_name,
            subscription.owner.kind()
        );
        self.registry().push(subscription);
    }

    /// Deliver `message` to every live subscriber that can receive it
    ///
    /// Subscribers run in registration order, each at most once. A subscriber
    /// whose owner dies after the scan but before its turn is skipped.
    pub fn publish<T: Message>(&self, message: T) {
        let deliveries: Vec<Delivery> = {
            let mut registry = self.registry();
            let before = registry.len();
            registry.retain(|s| s.owner.is_alive());
            let swept = before - registry.len();
            if swept > 0 {
                log::debug!("Swept {swept} dead subscription(s) while publishing {}", type_name::<T>());
            }
            registry
                .iter()
                .filter(|s| message.view_as(s.message_type).is_some())
                .map(|s| Delivery {
                    owner: s.owner.clone(),
                    message_type: s.message_type,
                    handler: Arc::clone(&s.handler),
                    predicate: s.predicate.clone(),
                })
                .collect()
        };

        if self.config.trace_dispatch {
            log::trace!("Publish {} to {} subscriber(s)", type_name::<T>(), deliveries.len());
        }

        for delivery in deliveries {
            if !delivery.owner.is_alive() {
                continue;
            }
            let Some(view) = message.view_as(delivery.message_type) else {
                continue;
            };
            if delivery.predicate.as_ref().map_or(true, |accepts| accepts(view)) {
                (delivery.handler)(view);
            }
        }
    }

    /// Remove every subscription of `owner`, whatever its message type
    ///
    /// Dead subscriptions of other owners are swept in the same pass. Calling
    /// this for an owner without subscriptions is a no-op.
    pub fn unsubscribe(&self, owner: &impl AsOwner) {
        self.remove_matching(owner.as_owner().key(), None, None);
    }

    /// Remove the subscriptions of `owner` for message type `T`
    pub fn unsubscribe_type<T: Message>(&self, owner: &impl AsOwner) {
        self.remove_matching(owner.as_owner().key(), Some(TypeId::of::<T>()), None);
    }

    /// Remove the subscriptions of `owner` for message type `T` made with `handler`
    pub fn unsubscribe_handler<T: Message>(&self, owner: &impl AsOwner, handler: &Handler<T>) {
        self.remove_matching(
            owner.as_owner().key(),
            Some(TypeId::of::<T>()),
            Some(handler_key(handler)),
        );
    }

    fn remove_matching(&self, owner_key: OwnerKey, message_type: Option<TypeId>, handler: Option<usize>) {
        let mut registry = self.registry();
        let before = registry.len();
        registry.retain(|s| s.owner.is_alive() && !s.matches(owner_key, message_type, handler));
        let removed = before - registry.len();
        if removed > 0 {
            log::trace!("Unsubscribe removed {removed} subscription(s)");
        }
    }

    /// Number of registered subscriptions, dead ones included until swept
    ///
    /// Intended for leak checks, e.g. after a scene unload. With `logging`
    /// enabled every subscription is listed at debug level.
    pub fn check_handler_count(&self, logging: bool) -> usize {
        let registry = self.registry();
        let count = registry.len();
        if logging {
            log::debug!("Hub has {count} subscription(s)");
            for (index, s) in registry.iter().enumerate() {
                log::debug!(
                    "  [{index}] {} owner={} alive={} filtered={}",
                    s.type_name,
                    s.owner.kind(),
                    s.owner.is_alive(),
                    s.predicate.is_some()
                );
            }
        }
        if let Some(threshold) = self.config.leak_warning_threshold {
            if count > threshold {
                log::warn!("Hub holds {count} subscriptions (threshold {threshold}), possible leak");
            }
        }
        count
    }

    /// Drop every subscription
    pub fn reset(&self) {
        let mut registry = self.registry();
        log::info!("Hub reset, dropping {} subscription(s)", registry.len());
        registry.clear();
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
