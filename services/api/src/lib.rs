mod cli;
mod demo;
mod infra;
mod routes;
mod server;
mod views;

use survey_form::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
