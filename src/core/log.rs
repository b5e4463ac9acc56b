use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const APP_TARGET: &str = "fintrack";
const STORAGE_TARGETS: [&str; 2] = ["fjall", "lsm_tree"];

/// Level for our own events and the matching `EnvFilter` fallback directive.
fn levels(verbose: bool) -> (LevelFilter, &'static str) {
    if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    }
}

fn targets(verbose: bool) -> Targets {
    let (level_filter, _) = levels(verbose);
    // Storage engine chatter is only interesting when something goes wrong.
    let storage_level = if verbose { LevelFilter::WARN } else { LevelFilter::OFF };
    STORAGE_TARGETS
        .iter()
        .fold(Targets::new().with_target(APP_TARGET, level_filter), |t, target| {
            t.with_target(*target, storage_level)
        })
}

/// Installs the global subscriber. Logging stays off unless `verbose` is set
/// or `RUST_LOG` asks for it.
pub fn init_logging(verbose: bool) {
    let (_, level) = levels(verbose);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(targets(verbose))
        .with(env_filter)
        .try_init();
    if let Err(e) = result {
        eprintln!("Logging already initialized: {e}");
    }
}
