/// A monitored appliance. Not consumed by the analytics yet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Device {
    pub device_id: String,
    pub name: String,
    pub location: String,
    pub power_rating_watts: f64,
    pub is_active: bool,
}

impl Device {
    /// Creates an inactive device.
    pub fn new(
        device_id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        power_rating_watts: f64,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            name: name.into(),
            location: location.into(),
            power_rating_watts,
            is_active: false,
        }
    }
}
