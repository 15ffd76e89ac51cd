//! Span capture and structured error events.
//!
//! This example wraps errors with the fields of the active tracing spans and
//! logs the final error as one structured event.
//!
//! If you currently use `tracing_subscriber::fmt::init()`, this shows how to
//! expand that setup to add `FaultlineLayer`.

use faultline::{Fault, ResultExt, Tag, msg, tag};
use faultline_tracing::{FaultlineLayer, SpanExt};
use tracing::instrument;
use tracing_subscriber::{Registry, layer::SubscriberExt};

#[derive(Debug, thiserror::Error)]
#[error("database query failed")]
struct DatabaseError;

#[instrument]
fn query_database(_query: &str, table: &str) -> Result<String, Fault> {
    Err(DatabaseError).wrap_span()
}

#[instrument]
fn check_user_permission(user_id: u64, _role: &str) -> Result<(), Fault> {
    query_database("SELECT permissions FROM users WHERE id = ?", "users").wrap_with([
        msg::with_desc("failed to fetch user permissions", "You are not allowed to do this."),
        tag::with(Tag::PERMISSION_DENIED),
    ])?;

    Ok(())
}

#[instrument]
fn handle_api_request(request_id: &str, endpoint: &str) -> Result<(), Fault> {
    check_user_permission(12345, "admin").wrap()?;

    Ok(())
}

fn main() {
    // This replaces `tracing_subscriber::fmt::init()` to add span capture
    let subscriber = Registry::default()
        .with(FaultlineLayer)
        .with(tracing_subscriber::fmt::layer());

    tracing::subscriber::set_global_default(subscriber).expect("failed to set default subscriber");

    if let Err(err) = handle_api_request("req-abc-123", "/api/admin/users") {
        faultline_tracing::emit_error(&err);

        println!();
        println!("{err:?}");
        println!();
        println!(
            "status {}: {}",
            tag::get(&err).map_or(500, Tag::http_status),
            msg::user_message(&err)
        );
    }
}
