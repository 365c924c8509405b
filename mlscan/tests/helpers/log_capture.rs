//! In-memory tracing capture for assertions on scan logs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// One captured event: level, message and the other structured fields
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events at `level` whose message contains `needle`
    pub fn count_matching(&self, level: Level, needle: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.level == level && e.message.contains(needle))
            .count()
    }

    pub fn assert_contains(&self, needle: &str) {
        let events = self.events();
        if !events.iter().any(|e| e.message.contains(needle)) {
            let seen: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
            panic!("no log message contains '{}'; saw:\n{}", needle, seen.join("\n"));
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{:?}", value);
        if field.name() == "message" {
            self.message = text;
        } else {
            self.fields.insert(field.name().to_string(), text);
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: collector.message,
            fields: collector.fields,
        });
    }
}

/// Capture events emitted on the current thread until the guard drops
///
/// Pair with the default current-thread `#[tokio::test]` runtime so the
/// scan itself runs on the capturing thread.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));
    (capture, guard)
}
