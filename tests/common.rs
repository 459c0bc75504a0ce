#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use guestbook::common::{GuestbookCommand, GuestbookEvent};
use guestbook::gateway::{AdminGate, MutationGateway};
use guestbook::network::server::serve;
use guestbook::network::{GuestbookApi, GuestbookClient};
use guestbook::storage::SqliteMessageStore;
use guestbook::ui::GuestbookState;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub const ADMIN_KEY: &str = "correct-horse";

pub fn test_gateway() -> Arc<MutationGateway> {
    let store = SqliteMessageStore::in_memory().expect("open in-memory store");
    Arc::new(MutationGateway::new(Arc::new(store), AdminGate::new(ADMIN_KEY)))
}

pub struct TestServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub async fn start(gateway: Arc<MutationGateway>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test port");
        let address = listener.local_addr().expect("local addr");
        let (shutdown, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve(listener, gateway, async move {
            let _ = stopped.await;
        }));

        Self {
            base_url: format!("http://{address}"),
            shutdown: Some(shutdown),
            handle,
        }
    }

    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.handle
            .await
            .expect("server task")
            .expect("server exited cleanly");
    }
}

/// UI state wired to a running background client, driven by hand.
pub struct Harness {
    pub state: GuestbookState,
    commands: mpsc::Sender<GuestbookCommand>,
    events: mpsc::Receiver<GuestbookEvent>,
}

impl Harness {
    pub fn start(api: Arc<dyn GuestbookApi>) -> Self {
        let (commands, command_rx) = mpsc::channel(16);
        let (event_tx, events) = mpsc::channel(16);
        tokio::spawn(GuestbookClient::new(api, event_tx, command_rx, 50).run());

        Self {
            state: GuestbookState::new(),
            commands,
            events,
        }
    }

    pub async fn send(&self, command: GuestbookCommand) {
        self.commands.send(command).await.expect("client loop alive");
    }

    pub async fn next_event(&mut self) -> GuestbookEvent {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("event within timeout")
            .expect("client loop alive")
    }

    /// Applies the next event to the state and forwards any follow-up.
    pub async fn settle_one(&mut self) -> GuestbookEvent {
        let event = self.next_event().await;
        if let Some(command) = self.state.apply(event.clone()) {
            self.send(command).await;
        }
        event
    }

    pub async fn reload(&mut self) {
        let command = self.state.request_reload();
        self.send(command).await;
        match self.settle_one().await {
            GuestbookEvent::Loaded { .. } => {}
            other => panic!("expected Loaded, got {other:?}"),
        }
    }
}
