use std::{path::Path, sync::Arc};

use energy_client::domain::EnergyReading;

use crate::{
    pipeline::{Pipeline, PipelineError},
    sinks::CollectSink,
    sources::ReadingCsvFileSource,
    transform::ReadingValidation,
};

/// Reads every usable reading from a CSV file, in file order.
///
/// Malformed lines and out-of-domain readings are dropped. A missing file
/// yields an empty vector.
pub async fn load_readings(path: impl AsRef<Path>) -> Result<Vec<EnergyReading>, PipelineError> {
    let pipeline: Pipeline<_, EnergyReading, _> = Pipeline {
        source: ReadingCsvFileSource::new(path.as_ref()),
        transforms: vec![Arc::new(ReadingValidation)],
        sink: CollectSink,
    };

    pipeline.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_client::EnergyAnalytics;

    #[tokio::test]
    async fn load_drops_malformed_and_out_of_domain_readings() {
        let path = std::env::temp_dir().join(format!("{}-ingest-load.csv", std::process::id()));
        std::fs::write(
            &path,
            "timestamp,device_id,voltage,current,power_factor\n\
             2024-01-01 10:00:00,DEV001,230.0,1.0,1.0\n\
             2024-01-01,DEV001,xxx,1.2,0.95\n\
             2024-01-01 10:05:00,DEV002,230.0,-1.0,0.9\n\
             2024-01-01 10:10:00,DEV003,230.0,1.0,1.7\n",
        )
        .unwrap();

        let readings = load_readings(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].device_id, "DEV001");

        let cost = EnergyAnalytics::default().project_monthly_cost(&readings).unwrap();
        assert!((cost - 24.84).abs() < 1e-9);
    }

    #[tokio::test]
    async fn load_missing_file_is_empty() {
        let readings = load_readings("/nonexistent/dir/readings.csv").await.unwrap();
        assert!(readings.is_empty());
    }

    #[tokio::test]
    async fn load_keeps_lines_after_invalid_utf8() {
        let path = std::env::temp_dir().join(format!("{}-ingest-bad-utf8.csv", std::process::id()));
        let mut bytes = b"timestamp,device_id,voltage,current,power_factor\n".to_vec();
        bytes.extend_from_slice(b"2024-01-01 10:00:00,DEV001,230.0,1.0,1.0\n");
        bytes.extend_from_slice(b"2024-01-01 10:05:00,DEV\xff\xfe,230.0,1.0,1.0\n");
        bytes.extend_from_slice(b"2024-01-01 10:10:00,DEV003,230.0,1.0,1.0\n");
        bytes.extend_from_slice(b"2024-01-01 10:15:00,DEV004,230.0,1.0,1.0\n");
        std::fs::write(&path, bytes).unwrap();

        let readings = load_readings(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        let ids: Vec<&str> = readings.iter().map(|r| r.device_id.as_str()).collect();
        assert_eq!(ids, ["DEV001", "DEV003", "DEV004"]);
    }

    #[tokio::test]
    async fn load_unreadable_path_is_a_source_error() {
        let res = load_readings(std::env::temp_dir()).await;
        assert!(matches!(res, Err(PipelineError::Source(_))));
    }
}
