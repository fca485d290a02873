pub mod consumer;

pub use consumer::DeliveryConsumer;
