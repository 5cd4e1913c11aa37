//! Migration CLI tool. `run_cli` installs its own log subscriber.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(migration::Migrator).await;
}
