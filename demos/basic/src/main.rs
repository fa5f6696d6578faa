/**
 * Minimal harness for the uamp client.
 *
 * Replace the TRACKING_ID constant with a real property ID, then run:
 *
 *   cargo run -p uamp_example
 *   cargo run -p uamp_example -- --dry-run      # print payloads only
 *   RUST_LOG=uamp=debug cargo run -p uamp_example
 */
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Paste your tracking ID here.
const TRACKING_ID: &str = "UA-XXXX-Y";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let dry_run = std::env::args().any(|a| a == "--dry-run");
    let client_id = uamp::client_id::generate();

    /*
     * A pageview built from a mapping. The `qt` entry is negative and is
     * skipped; `ni` is invalid and is logged as a warning.
     */
    let pageview = uamp::Hit::new([
        ("tid", json!(TRACKING_ID)),
        ("cid", json!(client_id)),
        ("t", json!("pageview")),
        ("dp", json!("/home")),
        ("dt", json!("Home page")),
        ("qt", json!(-10)),
        ("ni", json!("maybe")),
    ]);

    /*
     * A transaction built incrementally, including a custom dimension.
     */
    let mut transaction = uamp::Hit::new([
        ("tid", TRACKING_ID),
        ("cid", client_id.as_str()),
        ("t", "transaction"),
    ]);
    let built = transaction
        .set("ti", "T-1001")
        .and_then(|hit| hit.set("tr", 49.995))
        .and_then(|hit| hit.set("cu", "EUR"))
        .and_then(|hit| hit.set_custom_dimension(1, "returning"));
    if let Err(err) = built {
        tracing::error!(error = %err, "failed to build transaction");
        return;
    }

    for hit in [&pageview, &transaction] {
        match hit.build() {
            Ok(payload) => println!("[example] {payload}"),
            Err(err) => println!("[example] not sendable: {err}"),
        }
        if !dry_run {
            uamp::post(hit);
        }
    }

    println!("[example] Done.");
}
