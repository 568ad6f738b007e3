//! # Campus Canteen Entry Point
//!
//! Boots the application layer: logging, configuration, database, cart
//! restore and the kitchen board poller. See `canteen_app::run`.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration from `CANTEEN_*` variables
//! 3. Connect to database & run migrations, seed when empty
//! 4. Restore the cart from the data directory
//! 5. Poll active orders until Ctrl-C

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match canteen_app::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("canteen: {}", e);
            ExitCode::FAILURE
        }
    }
}
