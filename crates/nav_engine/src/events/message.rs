//! Message trait for hub dispatch

use std::any::{Any, TypeId};

/// A value that can be published on the [`Hub`](super::Hub).
///
/// A message is always delivered to subscribers of its own type. A message
/// that wraps a more general one can also be delivered to subscribers of the
/// general type by overriding [`view_as`](Self::view_as):
///
/// ```
/// use std::any::{Any, TypeId};
/// use nav_engine::events::Message;
///
/// struct UiEvent { frame: u64 }
/// impl Message for UiEvent {}
///
/// struct ButtonClicked { base: UiEvent, button: u32 }
/// impl Message for ButtonClicked {
///     fn view_as(&self, target: TypeId) -> Option<&dyn Any> {
///         if target == TypeId::of::<UiEvent>() {
///             self.base.view_as(target)
///         } else if target == TypeId::of::<Self>() {
///             Some(self)
///         } else {
///             None
///         }
///     }
/// }
/// ```
pub trait Message: Any + Send + Sync + Sized {
    /// View this message as the message type identified by `target`
    ///
    /// Returns `None` when the message cannot be delivered as that type.
    fn view_as(&self, target: TypeId) -> Option<&dyn Any> {
        if target == TypeId::of::<Self>() {
            Some(self)
        } else {
            None
        }
    }
}
