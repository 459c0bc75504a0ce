use std::sync::Arc;

use tokio::sync::mpsc;

use crate::common::{GuestbookCommand, GuestbookEvent};

use super::api::GuestbookApi;

/// Background half of the visitor's client.
///
/// Every command becomes its own detached task, so two rapid submissions run
/// independently. Nothing is ever cancelled: if the UI has gone away by the
/// time a call resolves, its result is dropped.
pub struct GuestbookClient {
    api: Arc<dyn GuestbookApi>,
    event_sender: mpsc::Sender<GuestbookEvent>,
    command_receiver: mpsc::Receiver<GuestbookCommand>,
    recent_limit: usize,
}

impl GuestbookClient {
    pub fn new(
        api: Arc<dyn GuestbookApi>,
        event_sender: mpsc::Sender<GuestbookEvent>,
        command_receiver: mpsc::Receiver<GuestbookCommand>,
        recent_limit: usize,
    ) -> Self {
        Self {
            api,
            event_sender,
            command_receiver,
            recent_limit,
        }
    }

    pub async fn run(mut self) {
        log::info!("Guestbook client loop started");

        while let Some(command) = self.command_receiver.recv().await {
            self.dispatch(command);
        }

        log::info!("Command channel closed; client loop stopped");
    }

    fn dispatch(&self, command: GuestbookCommand) {
        let api = Arc::clone(&self.api);
        let events = self.event_sender.clone();
        let limit = self.recent_limit;

        tokio::spawn(async move {
            let event = execute(api.as_ref(), command, limit).await;
            if let Err(err) = events.send(event).await {
                log::debug!("View is gone; dropping {:?}", err.0);
            }
        });
    }
}

async fn execute(api: &dyn GuestbookApi, command: GuestbookCommand, limit: usize) -> GuestbookEvent {
    match command {
        GuestbookCommand::Reload { request } => GuestbookEvent::Loaded {
            request,
            messages: api.list_recent(limit).await,
        },
        GuestbookCommand::Submit {
            ticket,
            author,
            body,
        } => match api.create(author, body).await {
            Ok(id) => GuestbookEvent::SubmitAccepted { ticket, id },
            Err(error) => {
                log::error!("Failed to send message ({ticket}): {error}");
                GuestbookEvent::SubmitFailed { ticket, error }
            }
        },
        GuestbookCommand::Delete { id, secret } => match api.delete(id.clone(), secret).await {
            Ok(()) => GuestbookEvent::Deleted { id },
            Err(error) => {
                log::error!("Failed to delete message {id}: {error}");
                GuestbookEvent::DeleteFailed { id, error }
            }
        },
    }
}
