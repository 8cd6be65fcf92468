//! Command-line entry points and the HTTP service wrapper.

mod cli;
mod draw;
mod infra;
mod routes;
mod server;

use crate::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
