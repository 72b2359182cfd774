//! Echo every decoded input back as plain text.
//!
//! One `name=value` line per input, query inputs first, followed by any decode
//! warnings. Passing `fail=<reason>` answers with a 400 error page instead.
//!
//! Run by hand with:
//!   REQUEST_METHOD=GET QUERY_STRING='a=1&b=2' cargo run --bin echo-form </dev/null

use cgi_gateway::prelude::*;

fn echo(cgi: &mut Cgi) -> Result<CgiResult, CgiError> {
    cgi.set_header("Content-Type", "text/plain; charset=utf-8");

    if let Some(reason) = cgi.get_input("fail") {
        return Err(CgiError::bad_request(reason));
    }

    let mut body = String::new();
    for name in cgi.get_input_names() {
        for value in cgi.get_multi_input(&name) {
            body.push_str(&format!("{name}={value}\n"));
        }
    }
    for warning in cgi.decode_warnings() {
        body.push_str(&format!("warning: {warning}\n"));
    }
    Ok(output(body))
}

fn main() -> anyhow::Result<()> {
    cgi_gateway_examples::init_tracing();
    CgiRunner::new()
        .with_config(CgiConfig::new().max_body_bytes(64 * 1024))
        .run_stdio(handle_errors(echo))?;
    Ok(())
}
