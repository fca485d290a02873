pub mod composer;
pub mod query;
pub mod recorder;
pub mod service;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use composer::compose;
pub use query::EmailQuery;
pub use recorder::DeliveryRecorder;
pub use service::DispatchService;
pub use transport::{QueuedDeliveryTransport, SmtpDeliveryTransport};
