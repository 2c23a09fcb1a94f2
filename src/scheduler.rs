//! # Scheduler
//!
//! The one task that owns the [`Session`].
//!
//! Three sources feed it: discrete input events from the device readers,
//! lifecycle and frame events from the link transport, and a fixed-rate
//! tick that drives the joystick poll task. Each event is handled to
//! completion before the next is taken, so no state is ever shared across
//! tasks.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::input::InputEvent;
use crate::link::{Link, LinkEvent};
use crate::session::Session;

/// Seconds between status log lines.
pub const STATUS_LOG_INTERVAL_SECS: u64 = 5;

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub input_events: u64,
    pub link_events: u64,
    pub ticks: u64,
}

/// Tick period for a poll rate in Hz (rates of 0 are treated as 1 Hz).
#[must_use]
pub fn tick_period(poll_rate_hz: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(poll_rate_hz.max(1)))
}

/// Runs the session until `shutdown` completes.
///
/// Closed input or link channels simply stop contributing; only `shutdown`
/// ends the loop.
pub async fn run<L, F>(
    session: &mut Session<L>,
    mut inputs: mpsc::Receiver<InputEvent>,
    mut link_events: mpsc::UnboundedReceiver<LinkEvent>,
    poll_rate_hz: u32,
    shutdown: F,
) -> LoopStats
where
    L: Link,
    F: Future<Output = ()>,
{
    let mut ticker = interval(tick_period(poll_rate_hz));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let log_every = u64::from(poll_rate_hz.max(1)) * STATUS_LOG_INTERVAL_SECS;
    let mut stats = LoopStats::default();
    let mut inputs_open = true;
    let mut link_open = true;

    tokio::pin!(shutdown);

    info!("Scheduler running at {}Hz", poll_rate_hz);

    loop {
        tokio::select! {
            biased;

            event = link_events.recv(), if link_open => match event {
                Some(event) => {
                    stats.link_events += 1;
                    session.on_link_event(event);
                }
                None => {
                    debug!("Link event channel closed");
                    link_open = false;
                }
            },

            event = inputs.recv(), if inputs_open => match event {
                Some(event) => {
                    stats.input_events += 1;
                    session.handle_input(event);
                }
                None => {
                    debug!("All input readers stopped");
                    inputs_open = false;
                }
            },

            _ = ticker.tick() => {
                session.on_tick();
                stats.ticks += 1;

                if stats.ticks % log_every == 0 {
                    let command = session.command();
                    info!(
                        "[{:?}] cmd vel={:.2} yaw={:.2} | {}",
                        session.status(),
                        command.vel,
                        command.yaw,
                        session.view()
                    );
                }
            }

            _ = &mut shutdown => {
                info!("Shutting down scheduler");
                break;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfig;
    use crate::input::keyboard::KeyName;
    use crate::link::mocks::RecordingLink;
    use crate::link::LinkStatus;
    use serde_json::json;
    use tokio::sync::oneshot;

    #[test]
    fn test_tick_period() {
        assert_eq!(tick_period(1), Duration::from_secs(1));
        assert_eq!(tick_period(50), Duration::from_millis(20));
        assert_eq!(tick_period(0), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_events_reach_session() {
        let link = RecordingLink::new();
        let mut session = Session::new(&InputConfig::default(), link.clone());

        let (input_tx, input_rx) = mpsc::channel(8);
        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        link_tx.send(LinkEvent::Open).unwrap();
        link_tx
            .send(LinkEvent::Frame(r#"{"state": "drive"}"#.to_string()))
            .unwrap();
        input_tx
            .send(InputEvent::Key { key: KeyName::W, pressed: true })
            .await
            .unwrap();
        stop_tx.send(()).unwrap();

        let stats = run(&mut session, input_rx, link_rx, 60, async {
            let _ = stop_rx.await;
        })
        .await;

        assert_eq!(stats.link_events, 2);
        assert_eq!(stats.input_events, 1);
        assert_eq!(session.status(), &LinkStatus::Open);
        assert_eq!(session.view().state, "drive");

        let frames = link.json_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1]["vel"], json!(0.3));
    }

    #[tokio::test]
    async fn test_closed_channels_do_not_stop_loop() {
        let link = RecordingLink::new();
        let mut session = Session::new(&InputConfig::default(), link);

        let (input_tx, input_rx) = mpsc::channel::<InputEvent>(1);
        let (link_tx, link_rx) = mpsc::unbounded_channel::<LinkEvent>();
        drop(input_tx);
        drop(link_tx);

        let stats = run(
            &mut session,
            input_rx,
            link_rx,
            1000,
            tokio::time::sleep(Duration::from_millis(30)),
        )
        .await;

        assert_eq!(stats.input_events, 0);
        assert!(stats.ticks >= 1);
    }
}
