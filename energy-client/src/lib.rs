pub mod analytics;
pub mod domain;

pub use analytics::{AnalyticsError, BudgetCheck, EnergyAnalytics, EnergySummary};
pub use domain::{Device, DomainError, EnergyReading};
