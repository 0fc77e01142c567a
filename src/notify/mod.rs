//! # Notifications
//!
//! Transition detection between consecutive resolved statuses, rendering of
//! transition and lifecycle notices, and best-effort delivery.

pub mod detector;
pub mod errors;
pub mod event;
pub mod notice;
pub mod sink;

pub use detector::detect_transitions;
pub use errors::{NotifyError, NotifyResult};
pub use event::{LifecycleNotice, NotificationEvent, NotificationKind};
pub use notice::{Notice, NoticeField};
pub use sink::{
    create_notification_sink, deliver, DisabledSink, MemorySink, NotificationSink, WebhookSink,
};
