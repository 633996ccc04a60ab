use clap::Parser;

use server::{router, setup, shutdown_signal, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let state = setup(cli.smtp, cli.database_url, cli.db_max_connections).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(cli.listen_addr).await?;
    log::info!("listening on {}", cli.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
