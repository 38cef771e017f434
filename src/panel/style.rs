//! Visual constants for the feedback panel.

use eframe::egui::{Color32, Stroke, Visuals};

/// Colors used by the feedback panel.
#[derive(Clone, Copy)]
pub struct Palette {
    /// Panel background fill.
    pub bg_panel: Color32,
    /// Field and widget outline.
    pub outline: Color32,
    /// Default text color.
    pub text_primary: Color32,
    /// De-emphasized text such as progress hints.
    pub text_muted: Color32,
    /// Selected star color.
    pub star_active: Color32,
    /// Success notices.
    pub success: Color32,
    /// Warning notices, including configuration problems.
    pub warning: Color32,
    /// Error notices.
    pub error: Color32,
}

/// The panel palette.
pub fn palette() -> Palette {
    Palette {
        bg_panel: Color32::from_rgb(24, 26, 29),
        outline: Color32::from_rgb(52, 56, 62),
        text_primary: Color32::from_rgb(198, 204, 212),
        text_muted: Color32::from_rgb(138, 144, 153),
        star_active: Color32::from_rgb(222, 186, 96),
        success: Color32::from_rgb(102, 176, 136),
        warning: Color32::from_rgb(200, 150, 74),
        error: Color32::from_rgb(199, 84, 80),
    }
}

/// Tone of a transient notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeTone {
    /// Neutral progress information.
    Info,
    /// A submission was accepted.
    Success,
    /// Degraded but usable, e.g. missing configuration.
    Warning,
    /// A submission failed.
    Error,
}

/// Text color for a notice tone.
pub fn notice_color(tone: NoticeTone) -> Color32 {
    let palette = palette();
    match tone {
        NoticeTone::Info => palette.text_muted,
        NoticeTone::Success => palette.success,
        NoticeTone::Warning => palette.warning,
        NoticeTone::Error => palette.error,
    }
}

/// Apply the panel look to the host visuals.
pub fn apply_visuals(visuals: &mut Visuals) {
    let palette = palette();
    visuals.panel_fill = palette.bg_panel;
    visuals.override_text_color = Some(palette.text_primary);
    visuals.error_fg_color = palette.error;
    visuals.warn_fg_color = palette.warning;
    visuals.selection.stroke = Stroke::new(1.0, palette.star_active);
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, palette.outline);
}
