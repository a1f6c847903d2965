//! HTTP Query Forwarder: launcher plugin entry point
//!
//! The host runs this binary once per call. Stdout carries the protocol, so
//! logs are written to stderr.

use anyhow::Result;
use http_query_forwarder::{
    actions::StdoutHost,
    rpc::{self, Request, Response},
};
use std::io::Write;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_env("HQF_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    debug!("Starting HTTP Query Forwarder v{}", http_query_forwarder::VERSION);

    let request = match Request::read(std::env::args().skip(1)) {
        Ok(request) => request,
        Err(e) => {
            error!("Could not read request: {:#}", e);
            return print_response(&Response::default());
        }
    };
    debug!("Handling method '{}'", request.method);

    let forwarder = match rpc::forwarder_for(&request) {
        Ok(forwarder) => forwarder,
        Err(e) => {
            error!("Could not start forwarder: {:#}", e);
            return print_response(&Response::default());
        }
    };

    if let Some(response) = rpc::handle(&forwarder, &request, &StdoutHost).await {
        print_response(&response)?;
    }

    Ok(())
}

fn print_response(response: &Response) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
