mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use dual_risk_rating::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
