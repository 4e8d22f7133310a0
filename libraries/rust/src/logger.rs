use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Stockbot logger. Honors `RUST_LOG`, defaulting to `info`.
///
/// Records emitted through the `log` facade, such as actix-web's access log,
/// are forwarded to the same subscriber.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .finish();

    let _ = subscriber
        .try_init()
        .map_err(|_err| eprintln!("Unable to set global default subscriber"));
}
