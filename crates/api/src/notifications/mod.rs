//! Event-to-client notification routing.

mod router;

pub use router::NotificationRouter;
