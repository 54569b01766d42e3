//! Turns raw keystrokes into typing started / stopped signals.
//!
//! Every keystroke sends `typing(true)` straight away and re-arms a stop
//! timer. If no keystroke arrives before the timer fires, `typing(false)` is
//! sent. Positive signals are not deduplicated, the server and other clients
//! tolerate repeats.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use protocol::ClientEvent;

use crate::error::ClientError;
use crate::timer::CancelableTimer;

pub const TYPING_TIMEOUT: Duration = Duration::from_millis(2000);

/// One per input session
#[derive(Debug)]
pub struct TypingDebouncer {
    tx: UnboundedSender<ClientEvent>,
    timer: CancelableTimer,
    delay: Duration,
}

impl TypingDebouncer {
    pub fn new(tx: UnboundedSender<ClientEvent>) -> Self {
        Self::with_delay(tx, TYPING_TIMEOUT)
    }

    pub fn with_delay(tx: UnboundedSender<ClientEvent>, delay: Duration) -> Self {
        Self {
            tx,
            timer: CancelableTimer::new(),
            delay,
        }
    }

    pub fn keystroke(&mut self) -> Result<(), ClientError> {
        self.tx.send(ClientEvent::Typing(true))?;

        let tx = self.tx.clone();
        self.timer.schedule(self.delay, move || {
            debug!("Typing went quiet");
            // connection may be gone by now, nothing left to tell
            let _ = tx.send(ClientEvent::Typing(false));
        });

        Ok(())
    }

    /// Message went out: stop typing now rather than waiting for the timer.
    pub fn message_sent(&mut self) -> Result<(), ClientError> {
        self.timer.cancel();
        self.tx.send(ClientEvent::Typing(false))?;
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn drain(rx: &mut UnboundedReceiver<ClientEvent>) -> Vec<bool> {
        let mut out = vec![];
        while let Ok(ev) = rx.try_recv() {
            match ev {
                ClientEvent::Typing(flag) => out.push(flag),
                other => panic!("unexpected event {:?}", other),
            }
        }
        out
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_then_quiet_sends_single_stop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = TypingDebouncer::new(tx);

        for _ in 0..5 {
            debouncer.keystroke().unwrap();
            tokio::time::sleep(ms(400)).await;
        }
        assert_eq!(drain(&mut rx), [true, true, true, true, true]);

        // last keystroke was 400ms ago
        tokio::time::sleep(ms(1599)).await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::sleep(ms(2)).await;
        assert_eq!(drain(&mut rx), [false]);

        tokio::time::sleep(ms(10_000)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn gaps_just_under_timeout_keep_typing_alive() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = TypingDebouncer::new(tx);

        for _ in 0..3 {
            debouncer.keystroke().unwrap();
            tokio::time::sleep(ms(1999)).await;
        }
        assert_eq!(drain(&mut rx), [true, true, true]);

        tokio::time::sleep(ms(2)).await;
        assert_eq!(drain(&mut rx), [false]);
    }

    #[tokio::test(start_paused = true)]
    async fn two_bursts_get_one_stop_each() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = TypingDebouncer::new(tx);

        debouncer.keystroke().unwrap();
        tokio::time::sleep(ms(2500)).await;
        debouncer.keystroke().unwrap();
        debouncer.keystroke().unwrap();
        tokio::time::sleep(ms(2500)).await;

        assert_eq!(drain(&mut rx), [true, false, true, true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn sending_a_message_stops_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = TypingDebouncer::new(tx);

        debouncer.keystroke().unwrap();
        tokio::time::sleep(ms(300)).await;
        debouncer.message_sent().unwrap();
        assert!(!debouncer.is_pending());
        assert_eq!(drain(&mut rx), [true, false]);

        // the cancelled timer never adds a second stop
        tokio::time::sleep(ms(5000)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn custom_delay_is_honoured() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = TypingDebouncer::with_delay(tx, ms(50));

        debouncer.keystroke().unwrap();
        tokio::time::sleep(ms(51)).await;
        assert_eq!(drain(&mut rx), [true, false]);
    }

    #[tokio::test]
    async fn closed_channel_is_reported() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut debouncer = TypingDebouncer::new(tx);
        drop(rx);

        assert!(matches!(debouncer.keystroke(), Err(ClientError::Disconnected)));
    }
}
