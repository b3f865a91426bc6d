use std::marker::PhantomData;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::Level;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

/// Structured log entry for testing and analysis
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

/// Test subscriber that captures log entries for verification
#[derive(Debug, Clone)]
pub struct TestLogSubscriber {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Default for TestLogSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLogSubscriber {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn into_layer<S>(self) -> TestLayer<S>
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        TestLayer {
            subscriber: self,
            _phantom: PhantomData,
        }
    }
}

pub struct TestLayer<S> {
    subscriber: TestLogSubscriber,
    _phantom: PhantomData<S>,
}

impl<S> Layer<S> for TestLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        };

        self.subscriber.entries.lock().unwrap().push(entry);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value_str = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(value_str);
        } else {
            self.fields.push((field.name().to_string(), value_str));
        }
    }
}

/// Initialize logging for the server binary
pub fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,holdem_web=debug"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");
}

/// Initialize test logging with a capturing subscriber
pub fn init_test_logging() -> TestLogSubscriber {
    static SUBSCRIBER: OnceLock<TestLogSubscriber> = OnceLock::new();
    static REGISTERED: OnceLock<()> = OnceLock::new();

    let subscriber = SUBSCRIBER.get_or_init(TestLogSubscriber::new);

    REGISTERED.get_or_init(|| {
        let layer = subscriber.clone().into_layer::<Registry>();
        let registry = Registry::default().with(layer);
        tracing::subscriber::set_global_default(registry)
            .expect("Failed to set global default test subscriber");
    });

    subscriber.clear();
    subscriber.clone()
}
