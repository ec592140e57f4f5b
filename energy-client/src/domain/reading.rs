use time::PrimitiveDateTime;

/// One meter sample for a single device.
///
/// Records are built whole by the ingestion parser and never mutated
/// afterwards. Field values are stored exactly as parsed; whether they are
/// usable by the analytics formulas is decided by [`EnergyReading::check_domain`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyReading {
    pub timestamp: PrimitiveDateTime,
    pub device_id: String,
    /// Volts.
    pub voltage: f64,
    /// Amps.
    pub current: f64,
    pub power_factor: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("power_factor must be in (0, 1], got {0}")]
    PowerFactorOutOfRange(f64),
}

impl EnergyReading {
    /// Instantaneous real power in watts.
    pub fn power_watts(&self) -> f64 {
        self.voltage * self.current * self.power_factor
    }

    /// Checks the value ranges the analytics formulas are defined for.
    ///
    /// Rules:
    /// - voltage, current and power_factor must be finite.
    /// - voltage and current must be non-negative.
    /// - power_factor must lie in (0, 1].
    pub fn check_domain(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("voltage", self.voltage),
            ("current", self.current),
            ("power_factor", self.power_factor),
        ] {
            if !value.is_finite() {
                return Err(DomainError::NotFinite { field, value });
            }
        }

        if self.voltage < 0.0 {
            return Err(DomainError::Negative {
                field: "voltage",
                value: self.voltage,
            });
        }
        if self.current < 0.0 {
            return Err(DomainError::Negative {
                field: "current",
                value: self.current,
            });
        }
        if self.power_factor <= 0.0 || self.power_factor > 1.0 {
            return Err(DomainError::PowerFactorOutOfRange(self.power_factor));
        }

        Ok(())
    }
}
