//! Draft and result types for one feedback widget.

use serde::Serialize;

/// Lowest selectable star rating.
pub const RATING_MIN: u8 = 1;
/// Highest selectable star rating.
pub const RATING_MAX: u8 = 5;

/// Category of feedback the user is sharing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// A bug or a problem with the published data.
    DataIssue,
    /// A request for new functionality.
    FeatureSuggestion,
    /// Anything else.
    #[default]
    OtherComment,
}

impl FeedbackKind {
    /// All kinds, in the order the widget offers them.
    pub const ALL: [FeedbackKind; 3] = [
        FeedbackKind::DataIssue,
        FeedbackKind::FeatureSuggestion,
        FeedbackKind::OtherComment,
    ];

    /// Human-readable selector label.
    pub fn label(self) -> &'static str {
        match self {
            Self::DataIssue => "Bug or data issue",
            Self::FeatureSuggestion => "Feature suggestion",
            Self::OtherComment => "Other comment",
        }
    }
}

/// The mutable, not-yet-submitted input for one widget context.
///
/// Cleared after a successful submission; preserved unchanged across a
/// failed one so the user never loses typed text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedbackDraft {
    /// Star rating in `[RATING_MIN, RATING_MAX]`; `None` until the user picks one.
    pub rating: Option<u8>,
    /// Free-text comment, may be empty.
    pub comment: String,
    /// Feedback category selector.
    pub kind: FeedbackKind,
    /// Optional reply-to address, may be empty.
    pub contact: String,
}

impl FeedbackDraft {
    /// True when no user input has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_empty() && self.contact.is_empty()
    }
}

/// Outcome of one submit attempt.
///
/// Stored in a per-context one-shot slot and consumed exactly once via
/// [`super::controller::FeedbackController::take_notice`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionResult {
    /// The endpoint accepted the payload.
    Success,
    /// The submission did not go through; `reason` is human-readable.
    Failure {
        /// Normalized transport or rejection message.
        reason: String,
    },
}

/// Where one widget context currently sits in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetPhase {
    /// Empty draft, submit disabled.
    Idle,
    /// Some input captured; submit enabled iff a rating is set.
    AwaitingInput,
    /// A submission is in flight; further submits are rejected.
    Submitting,
}
