//! Log output formats.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use commons_core::error::AppError;

/// Output format of both sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `<timestamp>  - <LEVEL> - <message>` lines.
    #[default]
    Plain,
    /// One JSON object per line.
    Json,
    /// Multi-line human readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(AppError::configuration(format!(
                "Unknown log format: '{other}'. Supported: plain, json, pretty"
            ))),
        }
    }
}

/// Event formatter producing `<timestamp>  - <LEVEL> - <message>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormat;

impl<S, N> FormatEvent<S, N> for PlainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{}  - {} - ",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("plain".parse::<LogFormat>().unwrap(), LogFormat::Plain);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_plain_line_layout() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .event_format(PlainFormat)
            .with_writer(captured.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Starting Application");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let line = output.lines().next().unwrap();
        assert!(line.ends_with("  - INFO - Starting Application"), "{line}");
        assert!(line.contains('T') && line.contains('Z'));
    }
}
