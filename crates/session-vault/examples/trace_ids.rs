//! Generate identifiers and sniff a user agent.
//!
//! Run with: cargo run --example trace_ids

use session_vault::browser;
use session_vault::identifier::{trace_id, uuid};

fn main() {
    for _ in 0..3 {
        println!("{}", uuid());
    }
    println!("{}", trace_id());

    let ua = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    match browser::detect(ua, &[] as &[&str]) {
        Some(info) => println!("Browser: {}", info.kind),
        None => println!("Browser: unknown"),
    }
}
