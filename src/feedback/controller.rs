//! Per-context feedback state machine.
//!
//! The controller owns one state object per registered context. Rendering
//! surfaces hold opaque [`WidgetId`] handles and drive the widget through
//! explicit commands; the submit pathway is `begin_submit` (validates,
//! marks the context in flight, yields the wire payload) followed by
//! `complete_submit` (stores the one-shot result). Hosts without an event
//! loop can use [`FeedbackController::submit_blocking`] instead.

use crate::feedback::gateway::{FeedbackPayload, SubmitFeedback};
use crate::feedback::state::{
    FeedbackDraft, FeedbackKind, RATING_MAX, RATING_MIN, SubmissionResult, WidgetPhase,
};

/// Opaque handle to one registered feedback context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WidgetId(usize);

/// Why a submit command was refused before reaching the transport.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitBlocked {
    /// No star rating selected; the only validation rule.
    #[error("Select a star rating before submitting")]
    RatingMissing,
    /// A submission for this context is already in flight.
    #[error("A submission is already in flight for this widget")]
    InFlight,
}

/// Two widgets may not share a context label.
#[derive(Debug, thiserror::Error)]
#[error("Feedback context {0:?} is already registered")]
pub struct DuplicateLabel(pub String);

struct WidgetState {
    label: String,
    draft: FeedbackDraft,
    in_flight: bool,
    result: Option<SubmissionResult>,
}

/// Owns the draft and result slot of every registered feedback context.
#[derive(Default)]
pub struct FeedbackController {
    widgets: Vec<WidgetState>,
}

impl FeedbackController {
    /// Create an empty controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a context label and return its handle.
    ///
    /// Labels are unique by construction; a duplicate registration is
    /// rejected rather than silently sharing state.
    pub fn register(&mut self, label: &str) -> Result<WidgetId, DuplicateLabel> {
        if self.widgets.iter().any(|widget| widget.label == label) {
            return Err(DuplicateLabel(label.to_string()));
        }
        self.widgets.push(WidgetState {
            label: label.to_string(),
            draft: FeedbackDraft::default(),
            in_flight: false,
            result: None,
        });
        Ok(WidgetId(self.widgets.len() - 1))
    }

    /// Context label for a handle.
    pub fn label(&self, id: WidgetId) -> &str {
        &self.widgets[id.0].label
    }

    /// Current draft for a handle.
    pub fn draft(&self, id: WidgetId) -> &FeedbackDraft {
        &self.widgets[id.0].draft
    }

    /// Lifecycle phase of one context.
    pub fn phase(&self, id: WidgetId) -> WidgetPhase {
        let widget = &self.widgets[id.0];
        if widget.in_flight {
            WidgetPhase::Submitting
        } else if widget.draft.is_empty() {
            WidgetPhase::Idle
        } else {
            WidgetPhase::AwaitingInput
        }
    }

    /// Set or clear the star rating; values outside `[1,5]` are ignored.
    pub fn set_rating(&mut self, id: WidgetId, rating: Option<u8>) {
        if let Some(value) = rating {
            if !(RATING_MIN..=RATING_MAX).contains(&value) {
                return;
            }
        }
        self.widgets[id.0].draft.rating = rating;
    }

    /// Replace the comment text.
    pub fn set_comment(&mut self, id: WidgetId, comment: &str) {
        self.widgets[id.0].draft.comment = comment.to_string();
    }

    /// Select the feedback category.
    pub fn set_kind(&mut self, id: WidgetId, kind: FeedbackKind) {
        self.widgets[id.0].draft.kind = kind;
    }

    /// Replace the optional contact address.
    pub fn set_contact(&mut self, id: WidgetId, contact: &str) {
        self.widgets[id.0].draft.contact = contact.to_string();
    }

    /// Whether the submit action should be enabled.
    pub fn can_submit(&self, id: WidgetId) -> bool {
        let widget = &self.widgets[id.0];
        widget.draft.rating.is_some() && !widget.in_flight
    }

    /// Validate and mark the context in flight, yielding the wire payload.
    ///
    /// A missing rating never reaches the transport, and a context that is
    /// already submitting cannot start a second attempt.
    pub fn begin_submit(&mut self, id: WidgetId) -> Result<FeedbackPayload, SubmitBlocked> {
        let widget = &mut self.widgets[id.0];
        if widget.in_flight {
            return Err(SubmitBlocked::InFlight);
        }
        let Some(rating) = widget.draft.rating else {
            return Err(SubmitBlocked::RatingMissing);
        };
        widget.in_flight = true;
        Ok(FeedbackPayload::new(&widget.label, rating, &widget.draft))
    }

    /// Record the outcome of an in-flight submission.
    ///
    /// Success clears the draft; failure leaves it untouched so the user can
    /// retry without retyping. Either way the result lands in the one-shot
    /// notice slot.
    pub fn complete_submit(&mut self, id: WidgetId, result: SubmissionResult) {
        let widget = &mut self.widgets[id.0];
        widget.in_flight = false;
        match &result {
            SubmissionResult::Success => {
                tracing::info!("Feedback submitted for {}", widget.label);
                widget.draft = FeedbackDraft::default();
            }
            SubmissionResult::Failure { reason } => {
                tracing::warn!("Feedback submission failed for {}: {reason}", widget.label);
            }
        }
        widget.result = Some(result);
    }

    /// Read and clear the stored result so a notice is shown exactly once.
    pub fn take_notice(&mut self, id: WidgetId) -> Option<SubmissionResult> {
        self.widgets[id.0].result.take()
    }

    /// Run a full submission inline: begin, call the transport, complete.
    pub fn submit_blocking(
        &mut self,
        id: WidgetId,
        transport: &impl SubmitFeedback,
    ) -> Result<(), SubmitBlocked> {
        let payload = self.begin_submit(id)?;
        let result = match transport.submit(&payload) {
            Ok(()) => SubmissionResult::Success,
            Err(err) => SubmissionResult::Failure {
                reason: err.to_string(),
            },
        };
        self.complete_submit(id, result);
        Ok(())
    }
}
