use std::{env, error::Error, net::SocketAddr, sync::Arc};

use mcstat::{
    api::{self, AppState},
    config::McstatConfig,
    history::HistoryStore,
    logging::McstatLogger,
    monitor::Monitor,
    PROJECT_NAME, VERSION,
};
use tokio::{net::TcpListener, sync::broadcast};

#[cfg(feature = "mimalloc")]
mod mimalloc {
    use mimalloc::MiMalloc;

    #[global_allocator]
    static GLOBAL: MiMalloc = MiMalloc;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();
    McstatLogger::init();
    McstatLogger::starting(PROJECT_NAME, VERSION);

    let config_path = McstatConfig::resolve_path(&env::current_dir()?);
    let config = McstatConfig::load_or_init(&config_path)?;

    let stop = broadcast::channel(1).0;

    let history = Arc::new(HistoryStore::new(config.history_file.clone()));
    let (monitor, handle) = Monitor::new(
        config.client(),
        config.poll_interval(),
        config.target.clone(),
        history.clone(),
    );
    let poller = tokio::spawn(monitor.run(stop.subscribe()));

    let address: SocketAddr = config.bind.parse()?;
    McstatLogger::preparing_socket(&address);
    let listener = TcpListener::bind(address).await?;
    let state = AppState {
        monitor: handle,
        history,
        interval_secs: config.poll_interval().as_secs(),
    };
    let mut server_stop = stop.subscribe();
    let server = tokio::spawn(async move {
        axum::serve(listener, api::router(state))
            .with_graceful_shutdown(async move {
                let _ = server_stop.recv().await;
            })
            .await
    });

    {
        use futures::future::{select_all, FutureExt};
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        let sigint_fut = sigint.recv().boxed();
        let sigterm_fut = sigterm.recv().boxed();

        let _ = select_all([sigint_fut, sigterm_fut]).await;
        log::info!("Received signal, stopping...");
        stop.send(())?;
    }

    let _ = poller.await;
    server.await??;
    Ok(())
}
