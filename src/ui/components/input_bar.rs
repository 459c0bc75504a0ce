use eframe::egui;

use crate::common::{MAX_AUTHOR_CHARS, MAX_BODY_CHARS};
use crate::ui::state::{GuestbookState, Notice};

/// Returns true when the visitor asked to send.
pub fn render(ui: &mut egui::Ui, state: &mut GuestbookState) -> bool {
    let mut send = false;

    ui.add(
        egui::TextEdit::singleline(&mut state.author_input)
            .hint_text("Your name")
            .char_limit(MAX_AUTHOR_CHARS)
            .desired_width(f32::INFINITY),
    );

    let body = ui.add(
        egui::TextEdit::multiline(&mut state.body_input)
            .hint_text("Say something nice... (max 140 characters)")
            .char_limit(MAX_BODY_CHARS)
            .desired_rows(2)
            .desired_width(f32::INFINITY),
    );

    // Enter sends, Shift+Enter keeps typing.
    if body.has_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift) {
        state.body_input = state.body_input.trim_end_matches('\n').to_string();
        send = true;
    }

    ui.horizontal(|ui| {
        if let Some(Notice::Invalid(err)) = &state.notice {
            ui.colored_label(egui::Color32::LIGHT_RED, err.to_string());
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Send").clicked() {
                send = true;
            }
            ui.label(
                egui::RichText::new(format!(
                    "{}/{MAX_BODY_CHARS}",
                    state.body_input.chars().count()
                ))
                .weak()
                .small(),
            );
        });
    });

    send
}
