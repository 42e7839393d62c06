pub mod document;
pub mod estimate;
pub mod pricing;
pub mod service;

pub use service::OrderService;
