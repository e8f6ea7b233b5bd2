pub mod event_bus;
pub mod events;

pub use event_bus::{DispatchReport, EventBus, Listener, SubscriberId, Subscription};
pub use events::{BusEvent, Channel};
