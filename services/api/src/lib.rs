mod cli;
mod infra;
mod routes;
mod server;
mod simulate;

use facescan_enroll::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
