//! Translation of BASTA auction webhooks into the normalized agent events
//! published for downstream consumers.

pub mod action;
pub mod event;
pub mod fields;
pub mod inbound;
pub mod translate;

pub use action::{ActionType, UnknownActionType};
pub use event::{EventData, EventKind, NormalizedEvent};
pub use inbound::InboundEvent;
pub use translate::{translate, Translation};
