use std::{borrow::Cow, io::ErrorKind, path::PathBuf};

use energy_client::domain::EnergyReading;
use time::{macros::format_description, PrimitiveDateTime};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use crate::pipeline::{Envelope, EnvelopeStream, PipelineError, Source};

const FIELD_COUNT: usize = 5;

/// Line-oriented CSV source for `EnergyReading`.
///
/// Expected columns (by position):
/// - timestamp (`YYYY-MM-DD HH:MM:SS`)
/// - device_id
/// - voltage
/// - current
/// - power_factor
///
/// A leading header line is skipped when present. Lines that do not parse are
/// dropped and counted (including lines that are not valid UTF-8); they never
/// end the stream. A missing file is treated as an empty source. Any other I/O
/// failure is yielded as `PipelineError::Source` and ends the stream.
pub struct ReadingCsvFileSource {
    path: PathBuf,
}

impl ReadingCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

/// Drops whitespace between a delimiter and the opening quote of the next
/// field. The csv reader only treats a quote as opening when it is the first
/// byte of a field.
fn strip_space_before_quotes(line: &str) -> Cow<'_, str> {
    if !line.contains('"') {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len());
    let mut pending = String::new();
    let mut at_field_start = true;
    let mut in_quotes = false;
    let mut just_closed = false;

    for c in line.chars() {
        if at_field_start {
            if c.is_whitespace() {
                pending.push(c);
                continue;
            }
            at_field_start = false;
            if c == '"' {
                in_quotes = true;
                pending.clear();
                out.push(c);
                continue;
            }
            out.push_str(&pending);
            pending.clear();
        }

        match c {
            '"' if in_quotes => {
                in_quotes = false;
                just_closed = true;
            }
            // `""` inside a quoted field is an escaped quote
            '"' if just_closed => {
                in_quotes = true;
                just_closed = false;
            }
            ',' if !in_quotes => {
                at_field_start = true;
                just_closed = false;
            }
            _ => just_closed = false,
        }
        out.push(c);
    }
    out.push_str(&pending);

    Cow::Owned(out)
}

/// Splits one line into trimmed fields, honouring double-quoted fields that
/// contain the delimiter. Returns `None` for a line with no record in it.
pub fn tokenize_line(line: &str) -> Option<Vec<String>> {
    let line = strip_space_before_quotes(line);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    let record = rdr.records().next()?.ok()?;
    Some(record.iter().map(str::to_string).collect())
}

/// True when the line looks like the `timestamp,device_id,...` header row.
pub fn is_header(line: &str) -> bool {
    tokenize_line(line)
        .and_then(|fields| fields.into_iter().next())
        .is_some_and(|first| first.eq_ignore_ascii_case("timestamp"))
}

fn parse_timestamp(s: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .ok()
}

/// Parses one data line into a reading.
///
/// Yields `None` unless the line has exactly five fields, a well-formed
/// timestamp and three numeric fields. Value ranges are not checked here; see
/// `EnergyReading::check_domain`.
pub fn parse_reading(line: &str) -> Option<EnergyReading> {
    let fields = tokenize_line(line)?;
    if fields.len() != FIELD_COUNT {
        return None;
    }

    Some(EnergyReading {
        timestamp: parse_timestamp(&fields[0])?,
        device_id: fields[1].clone(),
        voltage: fields[2].parse().ok()?,
        current: fields[3].parse().ok()?,
        power_factor: fields[4].parse().ok()?,
    })
}

#[async_trait::async_trait]
impl Source<EnergyReading> for ReadingCsvFileSource {
    async fn stream(&self) -> EnvelopeStream<EnergyReading> {
        let path = self.path.clone();
        let s = async_stream::try_stream! {
            let file = match File::open(&path).await {
                Ok(f) => f,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!(path = %path.display(), "readings file not found, no readings available");
                    return;
                }
                Err(e) => Err(PipelineError::Source(format!("failed to open readings file: {e}")))?,
            };
            let mut reader = BufReader::new(file);
            let mut buf: Vec<u8> = Vec::new();
            let mut line_no: usize = 0;
            let mut header_checked = false;

            loop {
                buf.clear();
                let n = reader.read_until(b'\n', &mut buf).await.map_err(|e| {
                    PipelineError::Source(format!("failed to read readings line: {e}"))
                })?;
                if n == 0 {
                    break;
                }
                line_no += 1;

                let line = match std::str::from_utf8(&buf) {
                    Ok(line) => line,
                    Err(_) => {
                        metrics::counter!("reading_csv_malformed_lines_total").increment(1);
                        tracing::debug!(line_no, "skipping readings line that is not valid UTF-8");
                        continue;
                    }
                };
                let line = line.trim_end_matches(['\r', '\n']);
                if line.trim().is_empty() {
                    continue;
                }
                if !header_checked {
                    header_checked = true;
                    if is_header(line) {
                        continue;
                    }
                }

                match parse_reading(line) {
                    Some(reading) => {
                        yield Envelope::new(reading);
                    }
                    None => {
                        metrics::counter!("reading_csv_malformed_lines_total").increment(1);
                        tracing::debug!(line_no, "skipping malformed readings line");
                    }
                }
            }
        };

        Box::pin(s)
    }
}
