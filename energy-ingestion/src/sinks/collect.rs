use futures::StreamExt;
use energy_client::domain::EnergyReading;

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Gathers accepted readings in arrival order.
///
/// Records rejected by a transform are logged and skipped. A source or sink
/// error ends the run and is returned as is.
#[derive(Clone, Default)]
pub struct CollectSink;

#[async_trait::async_trait]
impl Sink<EnergyReading> for CollectSink {
    type Output = Vec<EnergyReading>;

    async fn run<S>(&self, mut input: S) -> Result<Vec<EnergyReading>, PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<EnergyReading>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut readings = Vec::new();
        let mut skipped: u64 = 0;

        while let Some(item) = input.next().await {
            match item {
                Ok(env) => readings.push(env.payload),
                Err(e @ PipelineError::Transform(_)) => {
                    skipped += 1;
                    tracing::warn!(error = %e, "skipping reading rejected upstream");
                }
                Err(e) => {
                    tracing::error!(error = %e, "upstream failure, abandoning collection");
                    metrics::counter!("collect_sink_errors_total").increment(1);
                    return Err(e);
                }
            }
        }

        metrics::counter!("collected_readings_total").increment(readings.len() as u64);
        tracing::info!(collected = readings.len(), skipped, "readings collected");

        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn reading(device_id: &str) -> EnergyReading {
        EnergyReading {
            timestamp: datetime!(2024-01-01 10:00:00),
            device_id: device_id.to_string(),
            voltage: 230.0,
            current: 1.0,
            power_factor: 0.9,
        }
    }

    #[tokio::test]
    async fn collects_ok_items_in_order_and_skips_errors() {
        let items = vec![
            Ok(Envelope::new(reading("a"))),
            Err(PipelineError::Transform("bad".to_string())),
            Ok(Envelope::new(reading("b"))),
        ];

        let out = CollectSink.run(futures::stream::iter(items)).await.unwrap();
        let ids: Vec<&str> = out.iter().map(|r| r.device_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn source_error_fails_the_run() {
        let items = vec![
            Ok(Envelope::new(reading("a"))),
            Err(PipelineError::Source("read failed".to_string())),
            Ok(Envelope::new(reading("b"))),
        ];

        let res = CollectSink.run(futures::stream::iter(items)).await;
        assert!(matches!(res, Err(PipelineError::Source(_))));
    }
}
