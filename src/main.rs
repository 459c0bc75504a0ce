use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use guestbook::config::{self, AppConfig};
use guestbook::gateway::{AdminGate, MutationGateway};
use guestbook::network::server::{serve, shutdown_signal};
use guestbook::network::{GuestbookApi, GuestbookClient, HttpApi};
use guestbook::storage::{SqliteMessageStore, ensure_parent_dir};
use guestbook::ui::GuestbookApp;

#[derive(Parser)]
#[command(name = "guestbook", version, about = "Append-only guestbook")]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Run the gateway in-process against the local database instead of
    /// talking to a server
    #[arg(long)]
    local: bool,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Serve the HTTP gateway (no UI)
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    if cli.mode == Some(Mode::Serve) {
        return run_server(&app_config).await;
    }

    let api: Arc<dyn GuestbookApi> = if cli.local {
        Arc::new(open_gateway(&app_config)?)
    } else {
        Arc::new(HttpApi::new(app_config.server_url.clone()))
    };

    run_client(api, app_config.recent_limit())
}

fn open_gateway(app_config: &AppConfig) -> Result<MutationGateway, Box<dyn Error>> {
    ensure_parent_dir(&app_config.database_path)?;
    let store = SqliteMessageStore::open(&app_config.database_path)?;
    let admin = AdminGate::from_config(config::admin_secret_from_env());
    Ok(MutationGateway::new(Arc::new(store), admin))
}

async fn run_server(app_config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let gateway = Arc::new(open_gateway(app_config)?);

    log::info!("Binding to {}", app_config.bind_address);
    let listener = TcpListener::bind(&app_config.bind_address).await?;
    serve(listener, gateway, shutdown_signal()).await?;

    log::info!("Server shut down");
    Ok(())
}

fn run_client(api: Arc<dyn GuestbookApi>, recent_limit: usize) -> Result<(), Box<dyn Error>> {
    // UI -> client
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // client -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    tokio::spawn(GuestbookClient::new(api, event_tx, cmd_rx, recent_limit).run());

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Guestbook",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("GuestbookApp should only be initialized once");

            log::info!("Guestbook window opened");
            Ok(Box::new(GuestbookApp::new(cc, cmd_tx.clone(), event_receiver)))
        }),
    )?;

    Ok(())
}
