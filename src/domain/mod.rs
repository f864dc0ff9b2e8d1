pub mod client;
pub mod invoice;
pub mod types;
