//! Submission gateway for feedback payloads.
//!
//! One JSON POST per user action to the configured endpoint, with bounded
//! timeouts and at-most-once delivery. No retries and no local buffering:
//! a failed submission is reported back and the user may click again.

use serde::Serialize;
use url::Url;

use crate::feedback::config::FeedbackConfig;
use crate::feedback::state::{FeedbackDraft, FeedbackKind};
use crate::http_client;

const MAX_RESPONSE_BYTES: usize = 64 * 1024;
const BODY_EXCERPT_CHARS: usize = 300;

/// Substituted for an empty comment so the endpoint never receives a blank field.
pub const EMPTY_COMMENT_PLACEHOLDER: &str = "No additional comments";

/// Wire form of one feedback submission.
#[derive(Clone, Debug, Serialize)]
pub struct FeedbackPayload {
    /// Label of the widget context the feedback came from.
    pub context: String,
    /// Star rating on the 1-based scale, as a string ("1".."5").
    pub rating: String,
    /// Comment text, or [`EMPTY_COMMENT_PLACEHOLDER`] when the user typed none.
    pub comment: String,
    /// Feedback category.
    pub kind: FeedbackKind,
    /// Optional reply-to address; omitted from the JSON when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// RFC 3339 UTC timestamp taken when the submission was initiated.
    pub submitted_at: String,
}

impl FeedbackPayload {
    pub(crate) fn new(context: &str, rating: u8, draft: &FeedbackDraft) -> Self {
        let comment = draft.comment.trim();
        let contact = draft.contact.trim();
        Self {
            context: context.to_string(),
            rating: rating.to_string(),
            comment: if comment.is_empty() {
                EMPTY_COMMENT_PLACEHOLDER.to_string()
            } else {
                comment.to_string()
            },
            kind: draft.kind,
            contact: (!contact.is_empty()).then(|| contact.to_string()),
            submitted_at: rfc3339_now(),
        }
    }
}

/// Why a submission attempt did not count as delivered.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Network-level failure, including timeouts.
    #[error("Network error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Rejected {
        /// Response status code.
        status: u16,
        /// Excerpt of the response body for diagnosis.
        body: String,
    },
    /// A 2xx response whose body lacks the configured success marker.
    #[error("HTTP {status} without success marker: {body}")]
    MarkerMissing {
        /// Response status code.
        status: u16,
        /// Excerpt of the response body for diagnosis.
        body: String,
    },
}

/// Seam between the widget controller and the outbound network call.
pub trait SubmitFeedback {
    /// Deliver one payload; at most one attempt per call.
    fn submit(&self, payload: &FeedbackPayload) -> Result<(), SubmitError>;
}

/// HTTP implementation of [`SubmitFeedback`] over the shared agent.
#[derive(Clone, Debug)]
pub struct FeedbackGateway {
    endpoint: Url,
    success_marker: Option<String>,
    token: Option<String>,
}

impl FeedbackGateway {
    /// Build a gateway from resolved configuration and an optional token.
    pub fn new(config: &FeedbackConfig, token: Option<String>) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            success_marker: config.success_marker.clone(),
            token,
        }
    }
}

impl SubmitFeedback for FeedbackGateway {
    fn submit(&self, payload: &FeedbackPayload) -> Result<(), SubmitError> {
        let mut request = http_client::agent()
            .post(self.endpoint.as_str())
            .set("Accept", "application/json")
            .set("Content-Type", "application/json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let response = match request.send_json(payload) {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = read_body_excerpt(response);
                return Err(SubmitError::Rejected { status: code, body });
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(SubmitError::Transport(err.to_string()));
            }
        };

        let status = response.status();
        if !(200..=299).contains(&status) {
            let body = read_body_excerpt(response);
            return Err(SubmitError::Rejected { status, body });
        }
        if let Some(marker) = &self.success_marker {
            let body = read_body_excerpt(response);
            if !body.contains(marker.as_str()) {
                return Err(SubmitError::MarkerMissing { status, body });
            }
        }
        Ok(())
    }
}

fn read_body_excerpt(response: ureq::Response) -> String {
    let bytes = match http_client::read_response_bytes(response, MAX_RESPONSE_BYTES) {
        Ok(bytes) => bytes,
        Err(err) => return err.to_string(),
    };
    excerpt(String::from_utf8_lossy(&bytes).trim())
}

fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(BODY_EXCERPT_CHARS).collect();
    if out.len() < text.len() {
        out.push('…');
    }
    out
}

fn rfc3339_now() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(status_line: &str, body: &str) -> String {
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    fn gateway(url: &str, marker: Option<&str>) -> FeedbackGateway {
        let config = FeedbackConfig {
            endpoint: Url::parse(url).unwrap(),
            success_marker: marker.map(str::to_string),
        };
        FeedbackGateway::new(&config, None)
    }

    fn sample_payload() -> FeedbackPayload {
        FeedbackPayload::new(
            "project_map",
            4,
            &FeedbackDraft {
                rating: Some(4),
                comment: "Add export to PDF".into(),
                ..FeedbackDraft::default()
            },
        )
    }

    #[test]
    fn accepts_2xx_without_configured_marker() {
        let url = serve_once("200 OK", "{\"status\":\"recorded\"}");
        gateway(&url, None).submit(&sample_payload()).unwrap();
    }

    #[test]
    fn accepts_2xx_containing_marker() {
        let url = serve_once("200 OK", "{\"status\":\"recorded\"}");
        gateway(&url, Some("recorded"))
            .submit(&sample_payload())
            .unwrap();
    }

    #[test]
    fn rejects_2xx_missing_marker() {
        let url = serve_once("200 OK", "{\"status\":\"queued\"}");
        let err = gateway(&url, Some("recorded"))
            .submit(&sample_payload())
            .unwrap_err();
        match err {
            SubmitError::MarkerMissing { status, body } => {
                assert_eq!(status, 200);
                assert!(body.contains("queued"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn maps_server_error_to_rejected() {
        let url = serve_once("500 Internal Server Error", "boom");
        let err = gateway(&url, None).submit(&sample_payload()).unwrap_err();
        match err {
            SubmitError::Rejected { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn connection_refused_is_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let err = gateway(&url, None).submit(&sample_payload()).unwrap_err();
        assert!(matches!(err, SubmitError::Transport(_)));
    }

    #[test]
    fn empty_comment_becomes_placeholder() {
        let payload = FeedbackPayload::new(
            "stances_overview",
            3,
            &FeedbackDraft {
                rating: Some(3),
                ..FeedbackDraft::default()
            },
        );
        assert_eq!(payload.comment, EMPTY_COMMENT_PLACEHOLDER);
        assert_eq!(payload.rating, "3");
    }

    #[test]
    fn blank_contact_is_omitted_from_json() {
        let payload = FeedbackPayload::new(
            "project_map",
            5,
            &FeedbackDraft {
                rating: Some(5),
                contact: "  ".into(),
                ..FeedbackDraft::default()
            },
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("contact").is_none());
        assert_eq!(json["kind"], "other_comment");
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(BODY_EXCERPT_CHARS * 2);
        let cut = excerpt(&long);
        assert!(cut.chars().count() == BODY_EXCERPT_CHARS + 1);
        assert!(cut.ends_with('…'));
        assert_eq!(excerpt("short"), "short");
    }
}
