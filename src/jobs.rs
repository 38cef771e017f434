//! Background submission jobs for UI hosts.
//!
//! The transport call blocks for up to its timeout, so interactive hosts run
//! it on a worker thread and poll for completions once per frame. The widget
//! stays in its Submitting phase between `begin` and the completion arriving.

use std::sync::{
    Arc,
    mpsc::{Receiver, Sender, channel},
};
use std::thread;

use crate::feedback::controller::WidgetId;
use crate::feedback::gateway::{FeedbackGateway, FeedbackPayload, SubmitFeedback};
use crate::feedback::state::SubmissionResult;

struct SubmitCompletion {
    widget: WidgetId,
    result: SubmissionResult,
}

/// Runs blocking submissions off the UI thread.
pub struct SubmitRuntime {
    gateway: Arc<FeedbackGateway>,
    tx: Sender<SubmitCompletion>,
    rx: Receiver<SubmitCompletion>,
}

impl SubmitRuntime {
    /// Wrap a gateway in a worker-thread runtime.
    pub fn new(gateway: FeedbackGateway) -> Self {
        let (tx, rx) = channel();
        Self {
            gateway: Arc::new(gateway),
            tx,
            rx,
        }
    }

    /// Start one submission; the outcome arrives via [`SubmitRuntime::poll`].
    pub fn begin(&self, widget: WidgetId, payload: FeedbackPayload) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = match gateway.submit(&payload) {
                Ok(()) => SubmissionResult::Success,
                Err(err) => SubmissionResult::Failure {
                    reason: err.to_string(),
                },
            };
            let _ = tx.send(SubmitCompletion { widget, result });
        });
    }

    /// Drain finished submissions.
    pub fn poll(&self) -> Vec<(WidgetId, SubmissionResult)> {
        let mut done = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            done.push((completion.widget, completion.result));
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::config::FeedbackConfig;
    use crate::feedback::controller::FeedbackController;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::{Duration, Instant};
    use url::Url;

    fn serve_once(body: &str) -> String {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{body}",
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

    #[test]
    fn completion_arrives_via_poll() {
        let url = serve_once("ok");
        let config = FeedbackConfig {
            endpoint: Url::parse(&url).unwrap(),
            success_marker: None,
        };
        let runtime = SubmitRuntime::new(FeedbackGateway::new(&config, None));

        let mut controller = FeedbackController::new();
        let id = controller.register("project_map").unwrap();
        controller.set_rating(id, Some(4));
        let payload = controller.begin_submit(id).unwrap();
        runtime.begin(id, payload);

        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let done = runtime.poll();
            if let Some((widget, result)) = done.into_iter().next() {
                assert_eq!(widget, id);
                assert_eq!(result, SubmissionResult::Success);
                break;
            }
            assert!(Instant::now() < deadline, "submission never completed");
            thread::sleep(Duration::from_millis(10));
        }
    }
}
