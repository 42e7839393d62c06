pub mod simulator;
pub mod subscription;

pub use simulator::DeliverySimulator;
pub use subscription::Subscription;
