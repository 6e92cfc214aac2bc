//! Thin entrypoint for the `authbox` binary.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = authbox_console::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
