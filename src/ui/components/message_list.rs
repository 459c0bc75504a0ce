use chrono::Local;
use eframe::egui;

use crate::ui::format::{avatar_initial, group_by_day, time_label};
use crate::ui::state::{EntryState, GuestbookState, ViewEntry};

#[derive(Default)]
pub struct MessageListActions {
    pub request_delete: Option<String>,
    pub confirm_delete: bool,
    pub cancel_delete: bool,
}

pub fn render(ui: &mut egui::Ui, state: &GuestbookState) -> MessageListActions {
    let mut actions = MessageListActions::default();

    if !state.is_loaded() {
        ui.centered_and_justified(|ui| ui.spinner());
        return actions;
    }

    if state.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(egui::RichText::new("No messages yet").strong());
            ui.label(egui::RichText::new("Be the first to say something nice!").weak());
        });
        return actions;
    }

    let view = state.view();
    let now = Local::now();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for group in group_by_day(&view, &now) {
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new(&group.label).weak().small());
                });

                for entry in group.entries {
                    ui.push_id(&entry.key, |ui| {
                        render_entry(ui, state, entry, &mut actions);
                    });
                    ui.add_space(6.0);
                }
            }
        });

    actions
}

fn render_entry(
    ui: &mut egui::Ui,
    state: &GuestbookState,
    entry: &ViewEntry,
    actions: &mut MessageListActions,
) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(avatar_initial(&entry.author)).strong().monospace());
        ui.label(egui::RichText::new(&entry.author).strong());
        ui.label(egui::RichText::new(time_label(&entry.created_at, &Local)).weak().small());

        match entry.state {
            EntryState::Pending => {
                ui.label(egui::RichText::new("sending…").weak().italics());
            }
            EntryState::Failed => {
                ui.colored_label(egui::Color32::LIGHT_RED, "not sent");
            }
            EntryState::Confirmed => {}
        }

        // Only confirmed entries carry an id, so only they can be deleted.
        let Some(id) = entry.id.as_deref() else {
            return;
        };
        if !state.can_moderate() {
            return;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if state.confirming_delete() == Some(id) {
                if ui.button("Cancel").clicked() {
                    actions.cancel_delete = true;
                }
                if ui.button("Delete").clicked() {
                    actions.confirm_delete = true;
                }
                ui.label("Delete this message?");
            } else if ui
                .add_enabled(!state.is_deleting(id), egui::Button::new("🗑"))
                .clicked()
            {
                actions.request_delete = Some(id.to_string());
            }
        });
    });

    ui.label(&entry.body);
}
