use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Events go to stderr: stdout carries the CGI response, and most servers copy
/// a script's stderr into their error log.
///
/// # Example
///
/// ```ignore
/// cgi_gateway_examples::init_tracing();
/// cgi_gateway::run_stdio(handler)?;
/// ```
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
