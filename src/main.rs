//! Entry point for the VisiGov feedback sidebar shell.

use std::time::Duration;

use eframe::egui;
use visigov_feedback::logging;
use visigov_feedback::panel::{FeedbackPanel, style};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([960.0, 720.0])
        .with_min_inner_size([480.0, 360.0]);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "VisiGov Feedback",
        native_options,
        Box::new(|cc| {
            let mut visuals = egui::Visuals::dark();
            style::apply_visuals(&mut visuals);
            cc.egui_ctx.set_visuals(visuals);
            Ok(Box::new(FeedbackApp::new()))
        }),
    )?;
    Ok(())
}

struct FeedbackApp {
    panel: FeedbackPanel,
}

impl FeedbackApp {
    fn new() -> Self {
        Self {
            panel: FeedbackPanel::from_environment(),
        }
    }
}

impl eframe::App for FeedbackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::right("feedback_sidebar")
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.heading("We'd love your feedback");
                ui.add_space(8.0);
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.panel.ui(ui);
                });
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Meeting recap dashboard");
            ui.label("Charts, the project map, and stance tables render here in the full app.");
        });
        // Submission completions arrive over a channel; keep polling while idle.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
