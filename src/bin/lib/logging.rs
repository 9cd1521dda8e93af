use std::str::FromStr;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `log_level`.
pub fn setup_logging(log_level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let normalized = log_level.trim();
        // bare levels keep the transport crates quiet
        let filter_spec = if normalized.contains(',') || normalized.contains('=') {
            normalized.to_string()
        } else {
            format!("{normalized},hyper=info,hyper_util=info,reqwest=info,alloy_transport_http=info")
        };
        EnvFilter::from_str(&filter_spec).unwrap_or_else(|_| EnvFilter::new("info"))
    });
    let subscriber = tracing_subscriber::registry().with(filter);

    // logs go to stderr, stdout carries the command's output
    if json_format {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_current_span(false);
        subscriber.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact();
        subscriber.with(fmt_layer).init();
    }
}
