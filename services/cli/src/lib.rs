mod cli;
mod commands;
mod demo;

use agri_diag::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
