use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::common::{GuestbookCommand, GuestbookEvent};
use crate::gateway::GatewayError;

use super::components::{header, input_bar, message_list};
use super::state::{GuestbookState, Notice};

pub struct GuestbookApp {
    state: GuestbookState,
    command_sender: mpsc::Sender<GuestbookCommand>,
    event_receiver: mpsc::Receiver<GuestbookEvent>,
}

impl GuestbookApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        command_sender: mpsc::Sender<GuestbookCommand>,
        event_receiver: mpsc::Receiver<GuestbookEvent>,
    ) -> Self {
        let mut app = Self {
            state: GuestbookState::new(),
            command_sender,
            event_receiver,
        };
        let reload = app.state.request_reload();
        if app.send_command(reload).is_some() {
            log::warn!("Initial load could not be queued");
        }
        app
    }

    fn handle_client_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            if let Some(command) = self.state.apply(event) {
                self.dispatch(command);
            }
        }
    }

    fn send_command(&self, command: GuestbookCommand) -> Option<GuestbookEvent> {
        match self.command_sender.try_send(command) {
            Ok(()) => None,
            Err(err) => {
                log::warn!("Failed to send command to client: {err}");
                // The call never started; report it the way a backend
                // failure would be reported so nothing waits forever.
                match err {
                    TrySendError::Full(command) | TrySendError::Closed(command) => {
                        undelivered(command)
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, command: GuestbookCommand) {
        if let Some(event) = self.send_command(command) {
            self.state.apply(event);
        }
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.state.notice.clone() else {
            return;
        };
        if !notice.is_blocking() {
            return;
        }

        let mut dismissed = false;
        egui::Window::new("Guestbook")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(notice.message());
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            if notice == Notice::Unauthorized {
                self.state.show_admin = true;
                self.state.admin_key.clear();
            }
            self.state.dismiss_notice();
        }
    }
}

fn undelivered(command: GuestbookCommand) -> Option<GuestbookEvent> {
    match command {
        GuestbookCommand::Reload { .. } => None,
        GuestbookCommand::Submit { ticket, .. } => Some(GuestbookEvent::SubmitFailed {
            ticket,
            error: GatewayError::Submission,
        }),
        GuestbookCommand::Delete { id, .. } => Some(GuestbookEvent::DeleteFailed {
            id,
            error: GatewayError::Deletion,
        }),
    }
}

impl eframe::App for GuestbookApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_client_events();

        egui::TopBottomPanel::top("guestbook_header").show(ctx, |ui| {
            let actions = header::render(ui, &mut self.state);
            if actions.refresh {
                let reload = self.state.request_reload();
                self.dispatch(reload);
            }
        });

        egui::TopBottomPanel::bottom("guestbook_composer").show(ctx, |ui| {
            ui.add_space(4.0);
            if input_bar::render(ui, &mut self.state) {
                if let Ok(command) = self.state.submit_form() {
                    self.dispatch(command);
                }
            }
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let actions = message_list::render(ui, &self.state);
            if let Some(id) = actions.request_delete {
                self.state.request_delete(&id);
            }
            if actions.cancel_delete {
                self.state.cancel_delete();
            }
            if actions.confirm_delete {
                if let Some(command) = self.state.confirm_delete() {
                    self.dispatch(command);
                }
            }
        });

        self.render_notice(ctx);

        ctx.request_repaint_after(Duration::from_millis(200));
    }
}
