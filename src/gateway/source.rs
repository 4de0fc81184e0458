//! JSON-lines event source for replaying recorded gateway sessions.
//!
//! Expected format, one event per line:
//! ```text
//! # comment lines and blank lines are skipped
//! {"type":"order_book_update","instrument":"FUTURE","sequence_number":1,"ask_prices":[14800],"ask_volumes":[10],"bid_prices":[14700],"bid_volumes":[10]}
//! {"type":"order_filled","order_id":1,"price":15000,"volume":10}
//! ```

use super::error::GatewayError;
use super::types::GatewayEvent;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Anything that yields gateway events in delivery order.
#[async_trait]
pub trait EventSource: Send {
    /// Next event, `Ok(None)` once the source is exhausted.
    async fn next_event(&mut self) -> Result<Option<GatewayEvent>, GatewayError>;
}

/// Reads one JSON-encoded event per line from an async reader.
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R> JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Create a source over a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

/// Decode a single line. Blank and `#` lines yield `Ok(None)`.
pub fn decode_line(line: &str, line_no: usize) -> Result<Option<GatewayEvent>, GatewayError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let event: GatewayEvent = serde_json::from_str(trimmed).map_err(|source| {
        GatewayError::Decode {
            line: line_no,
            source,
        }
    })?;
    event.validate()?;

    Ok(Some(event))
}

#[async_trait]
impl<R> EventSource for JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_event(&mut self) -> Result<Option<GatewayEvent>, GatewayError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            if let Some(event) = decode_line(&line, self.line_no)? {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}

/// Move events from a source into the core's queue until either side ends.
///
/// Malformed lines are logged and skipped. Returns the number of events
/// forwarded.
pub async fn pump_events<S>(mut source: S, tx: mpsc::Sender<GatewayEvent>) -> u64
where
    S: EventSource,
{
    let mut forwarded = 0u64;

    loop {
        match source.next_event().await {
            Ok(Some(event)) => {
                if tx.send(event).await.is_err() {
                    debug!("Event queue closed, stopping source");
                    break;
                }
                forwarded += 1;
            }
            Ok(None) => {
                debug!(forwarded, "Event source exhausted");
                break;
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "Skipping malformed event");
            }
            Err(e) => {
                error!(error = %e, "Event source failed");
                break;
            }
        }
    }

    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Instrument;

    const SESSION: &str = r#"# recorded session
{"type":"order_book_update","instrument":"FUTURE","sequence_number":1,"ask_prices":[14800],"ask_volumes":[10],"bid_prices":[14700],"bid_volumes":[10]}

{"type":"hedge_filled","order_id":2,"price":14800,"volume":10}
"#;

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let mut source = JsonLinesSource::new(SESSION.as_bytes());

        let first = tokio_test::block_on(source.next_event()).unwrap().unwrap();
        assert!(matches!(
            first,
            GatewayEvent::OrderBookUpdate(ref book) if book.instrument == Instrument::Future
        ));

        let second = tokio_test::block_on(source.next_event()).unwrap().unwrap();
        assert!(matches!(second, GatewayEvent::HedgeFilled { order_id: 2, .. }));

        assert!(tokio_test::block_on(source.next_event()).unwrap().is_none());
    }

    #[test]
    fn test_decode_error_reports_line_number() {
        let err = decode_line("{not json", 42).unwrap_err();
        assert!(matches!(err, GatewayError::Decode { line: 42, .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_pump_skips_bad_lines() {
        let input = format!("{}garbage\n", SESSION);
        let source = JsonLinesSource::new(input.as_bytes());
        let (tx, mut rx) = mpsc::channel(8);

        let forwarded = pump_events(source, tx).await;
        assert_eq!(forwarded, 2);

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 2);
    }
}
