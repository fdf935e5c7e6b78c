use std::sync::Once;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

static TRACING: Once = Once::new();

pub fn get_subscriber(env_filter: &str) -> impl Subscriber + Send + Sync + use<> {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    let fmt_layer = fmt::layer().with_target(false).with_file(false).json();

    Registry::default().with(filter_layer).with(fmt_layer)
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_subscriber(env_filter: &str) {
    TRACING.call_once(|| {
        if let Err(e) = tracing::subscriber::set_global_default(get_subscriber(env_filter)) {
            eprintln!("tracing subscriber already set: {e}");
        }
    });
}
