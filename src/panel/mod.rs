//! egui rendering surface for the feedback widgets.
//!
//! Binds the surface primitives (star row, category selector, comment box,
//! submit action, transient notices) to the controller. When configuration
//! is missing the whole panel renders a configuration notice and never
//! constructs a transport.

pub mod notice;
pub mod style;

use std::collections::HashMap;

use eframe::egui::{self, RichText};

use crate::feedback::config;
use crate::feedback::controller::{FeedbackController, WidgetId};
use crate::feedback::gateway::FeedbackGateway;
use crate::feedback::resolve_token;
use crate::feedback::state::{
    FeedbackKind, RATING_MAX, RATING_MIN, SubmissionResult, WidgetPhase,
};
use crate::jobs::SubmitRuntime;
use notice::NoticeBanner;
use style::NoticeTone;

/// Contexts offered by the recap dashboard shell.
const DEFAULT_CONTEXTS: [(&str, &str); 3] = [
    ("project_map", "Project map"),
    ("stances_overview", "Commissioner stances"),
    ("overall_experience", "Overall experience"),
];

/// Sidebar panel hosting one feedback widget per dashboard section.
pub struct FeedbackPanel {
    controller: FeedbackController,
    widgets: Vec<(WidgetId, &'static str)>,
    runtime: Option<SubmitRuntime>,
    config_notice: Option<String>,
    notices: HashMap<WidgetId, NoticeBanner>,
}

impl FeedbackPanel {
    /// Build the panel from configuration, registering the default contexts.
    pub fn from_environment() -> Self {
        let (runtime, config_notice) = match config::load() {
            Ok(config) => {
                let gateway = FeedbackGateway::new(&config, resolve_token());
                (Some(SubmitRuntime::new(gateway)), None)
            }
            Err(err) => {
                tracing::warn!("Feedback submission disabled: {err}");
                (None, Some(format!("Feedback is disabled: {err}")))
            }
        };

        let mut controller = FeedbackController::new();
        let mut widgets = Vec::new();
        for (label, title) in DEFAULT_CONTEXTS {
            match controller.register(label) {
                Ok(id) => widgets.push((id, title)),
                Err(err) => tracing::error!("Skipping feedback context: {err}"),
            }
        }

        Self {
            controller,
            widgets,
            runtime,
            config_notice,
            notices: HashMap::new(),
        }
    }

    /// Render the panel; idempotent, safe to call every frame.
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.poll_completions();

        if let Some(text) = self.config_notice.clone() {
            ui.label(RichText::new(text).color(style::notice_color(NoticeTone::Warning)));
            return;
        }

        for (index, (id, title)) in self.widgets.clone().into_iter().enumerate() {
            if index > 0 {
                ui.separator();
            }
            self.widget_ui(ui, id, title);
        }
    }

    fn poll_completions(&mut self) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        for (id, result) in runtime.poll() {
            self.controller.complete_submit(id, result);
        }
    }

    fn widget_ui(&mut self, ui: &mut egui::Ui, id: WidgetId, title: &str) {
        ui.label(RichText::new(title).strong());
        let submitting = self.controller.phase(id) == WidgetPhase::Submitting;

        self.stars_ui(ui, id, submitting);
        self.kind_ui(ui, id, submitting);

        let mut comment = self.controller.draft(id).comment.clone();
        let response = ui.add_enabled(
            !submitting,
            egui::TextEdit::multiline(&mut comment)
                .hint_text("Describe what you noticed or suggest")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            self.controller.set_comment(id, &comment);
        }

        let mut contact = self.controller.draft(id).contact.clone();
        let response = ui.add_enabled(
            !submitting,
            egui::TextEdit::singleline(&mut contact)
                .hint_text("Your email (optional)")
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            self.controller.set_contact(id, &contact);
        }

        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    self.controller.can_submit(id),
                    egui::Button::new("Submit feedback"),
                )
                .clicked()
            {
                self.submit(id);
            }
            if submitting {
                ui.label(RichText::new("Submitting…").color(style::palette().text_muted));
            }
        });

        self.notice_ui(ui, id);
    }

    fn stars_ui(&mut self, ui: &mut egui::Ui, id: WidgetId, submitting: bool) {
        let rating = self.controller.draft(id).rating;
        let palette = style::palette();
        ui.horizontal(|ui| {
            for star in RATING_MIN..=RATING_MAX {
                let filled = rating.is_some_and(|value| value >= star);
                let icon = if filled {
                    RichText::new("★").color(palette.star_active)
                } else {
                    RichText::new("☆").color(palette.text_muted)
                };
                if ui
                    .add_enabled(!submitting, egui::Button::new(icon).frame(false))
                    .clicked()
                {
                    self.controller.set_rating(id, Some(star));
                }
            }
            if rating.is_some()
                && ui
                    .add_enabled(!submitting, egui::Button::new("clear").small())
                    .clicked()
            {
                self.controller.set_rating(id, None);
            }
        });
    }

    fn kind_ui(&mut self, ui: &mut egui::Ui, id: WidgetId, submitting: bool) {
        let current = self.controller.draft(id).kind;
        let mut selected = current;
        ui.add_enabled_ui(!submitting, |ui| {
            egui::ComboBox::from_id_salt((id, "feedback_kind"))
                .selected_text(selected.label())
                .show_ui(ui, |ui| {
                    for kind in FeedbackKind::ALL {
                        ui.selectable_value(&mut selected, kind, kind.label());
                    }
                });
        });
        if selected != current {
            self.controller.set_kind(id, selected);
        }
    }

    fn notice_ui(&mut self, ui: &mut egui::Ui, id: WidgetId) {
        if let Some(result) = self.controller.take_notice(id) {
            let banner = match result {
                SubmissionResult::Success => NoticeBanner::new(
                    "Thank you! Your feedback has been recorded.",
                    NoticeTone::Success,
                ),
                SubmissionResult::Failure { reason } => {
                    NoticeBanner::new(format!("Submission failed: {reason}"), NoticeTone::Error)
                }
            };
            self.notices.insert(id, banner);
        }

        let expired = self
            .notices
            .get(&id)
            .is_some_and(|banner| banner.expired());
        if expired {
            self.notices.remove(&id);
        } else if let Some(banner) = self.notices.get(&id) {
            ui.label(RichText::new(banner.text.clone()).color(style::notice_color(banner.tone)));
        }
    }

    fn submit(&mut self, id: WidgetId) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        if let Ok(payload) = self.controller.begin_submit(id) {
            runtime.begin(id, payload);
        }
    }
}
