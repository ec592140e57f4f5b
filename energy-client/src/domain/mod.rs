mod device;
mod reading;

pub use device::Device;
pub use reading::{DomainError, EnergyReading};
