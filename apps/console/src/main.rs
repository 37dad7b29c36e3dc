//! # Ojra Console Entry Point
//!
//! Reads trip commands from stdin and prints one JSON reply per line.
//!
//! ```text
//! $ printf 'vehicle taxi\nfare 10\npay 1\namount 50\ncover 2\nsubmit\n' | ojra-console
//! {"ok":true,"data":{"config":{"vehicleType":"taxi",...}}}
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change the level.

#[tokio::main]
async fn main() {
    // The actual setup is in lib.rs so it can be tested
    if let Err(e) = ojra_console::run().await {
        eprintln!("ojra-console: {e}");
        std::process::exit(1);
    }
}
