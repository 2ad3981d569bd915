//! Debounced search input.
//!
//! Search text is forwarded only after it stayed unchanged for the debounce
//! interval, so rapid typing does not rescan the graph on every keystroke.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sending side of a running debouncer.
pub struct SearchDebouncer {
    tx: mpsc::UnboundedSender<String>,
    handle: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Spawn the debounce task. Settled texts arrive on the returned receiver.
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, input) = mpsc::unbounded_channel();
        let (output, settled) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_debounce(input, output, delay));
        (Self { tx, handle }, settled)
    }

    /// Offer the latest search text. Returns false once the task has stopped.
    pub fn push(&self, text: impl Into<String>) -> bool {
        self.tx.send(text.into()).is_ok()
    }

    /// Stop accepting input; a pending text is still delivered.
    pub async fn finish(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            log::warn!("search debounce task ended abnormally: {}", e);
        }
    }
}

async fn run_debounce(
    mut input: mpsc::UnboundedReceiver<String>,
    output: mpsc::UnboundedSender<String>,
    delay: Duration,
) {
    let mut pending: Option<String> = None;

    loop {
        let Some(text) = pending.take() else {
            match input.recv().await {
                Some(text) => pending = Some(text),
                None => return,
            }
            continue;
        };

        tokio::select! {
            next = input.recv() => match next {
                Some(newer) => pending = Some(newer),
                None => {
                    let _ = output.send(text);
                    return;
                }
            },
            _ = tokio::time::sleep(delay) => {
                log::debug!("search settled: {:?}", text);
                if output.send(text).is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rapid_input_yields_latest_only() {
        let (debouncer, mut settled) = SearchDebouncer::spawn(Duration::from_millis(50));
        assert!(debouncer.push("W"));
        assert!(debouncer.push("Wi"));
        assert!(debouncer.push("Wid"));

        let first = tokio::time::timeout(Duration::from_secs(2), settled.recv())
            .await
            .unwrap();
        assert_eq!(first.as_deref(), Some("Wid"));

        debouncer.finish().await;
        assert_eq!(settled.recv().await, None);
    }

    #[tokio::test]
    async fn test_separated_inputs_both_settle() {
        let (debouncer, mut settled) = SearchDebouncer::spawn(Duration::from_millis(20));
        debouncer.push("one");
        let first = tokio::time::timeout(Duration::from_secs(2), settled.recv())
            .await
            .unwrap();
        assert_eq!(first.as_deref(), Some("one"));

        debouncer.push("two");
        let second = tokio::time::timeout(Duration::from_secs(2), settled.recv())
            .await
            .unwrap();
        assert_eq!(second.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_finish_flushes_pending_text() {
        let (debouncer, mut settled) = SearchDebouncer::spawn(Duration::from_secs(60));
        debouncer.push("late");
        debouncer.finish().await;
        assert_eq!(settled.recv().await.as_deref(), Some("late"));
    }

    #[tokio::test]
    async fn test_drain_after_finish_yields_last_text_then_ends() {
        let (debouncer, mut settled) = SearchDebouncer::spawn(Duration::from_secs(60));
        debouncer.push("wid");
        debouncer.push("widget");
        debouncer.finish().await;

        let mut drained = Vec::new();
        while let Some(text) = settled.recv().await {
            drained.push(text);
        }
        assert_eq!(drained, vec!["widget".to_string()]);
    }
}
