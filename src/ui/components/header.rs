use eframe::egui;

use crate::ui::format::count_label;
use crate::ui::state::GuestbookState;

#[derive(Default)]
pub struct HeaderActions {
    pub refresh: bool,
}

pub fn render(ui: &mut egui::Ui, state: &mut GuestbookState) -> HeaderActions {
    let mut actions = HeaderActions::default();

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.heading("Guestbook");
            ui.label(egui::RichText::new(count_label(state.message_count())).weak().small());
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let toggle = if state.show_admin { "Hide Admin" } else { "Admin Mode" };
            if ui.button(toggle).clicked() {
                state.show_admin = !state.show_admin;
            }
            if ui.button("Refresh").clicked() {
                actions.refresh = true;
            }
        });
    });

    if state.show_admin {
        ui.add(
            egui::TextEdit::singleline(&mut state.admin_key)
                .password(true)
                .hint_text("Enter admin key..."),
        );
    }

    actions
}
