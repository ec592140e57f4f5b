use crate::pipeline::{Envelope, PipelineError, Transform};
use energy_client::domain::EnergyReading;

/// Pure validation of an `EnergyReading`.
///
/// Rejects readings the analytics cannot score: non-finite values, negative
/// voltage or current, or a power factor outside (0, 1].
pub fn validate_reading(env: Envelope<EnergyReading>) -> Result<Envelope<EnergyReading>, PipelineError> {
    env.payload.check_domain().map_err(|e| {
        PipelineError::Transform(format!("reading for device '{}' rejected: {e}", env.payload.device_id))
    })?;
    Ok(env)
}

#[derive(Clone, Default)]
pub struct ReadingValidation;

#[async_trait::async_trait]
impl Transform<EnergyReading, EnergyReading> for ReadingValidation {
    async fn apply(
        &self,
        input: Envelope<EnergyReading>,
    ) -> Result<Envelope<EnergyReading>, PipelineError> {
        match validate_reading(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("validation_reading_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}
