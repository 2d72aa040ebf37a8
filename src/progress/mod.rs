//! Run progress reporting
//!
//! The scheduler publishes [`RunEvent`]s; the status bar consumes them and
//! renders a compact progress indicator. Nothing here feeds back into
//! scheduling.

mod events;
mod status;

pub use events::{event_channel, EventReceiver, EventSender, RunEvent};
pub use status::spawn_status_printer;
