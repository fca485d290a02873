pub mod entities;
pub mod mailer;
pub mod messaging;
pub mod repositories;
pub mod transport;

pub use courier_core::{CourierError, CourierResult};
pub use entities::*;
pub use mailer::*;
pub use messaging::*;
pub use repositories::*;
pub use transport::*;
