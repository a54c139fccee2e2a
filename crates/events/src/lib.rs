//! `docmgmt-events`: notifications from the client core to the presentation layer.

pub mod bus;
pub mod in_memory_bus;
pub mod notification;

pub use bus::{EventBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use notification::{ClientNotification, DocumentChange};
