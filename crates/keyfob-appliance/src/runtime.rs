//! The cooperative tick loop.
//!
//! One task, one loop, no locks. Each tick performs, in order:
//!
//! 1. Drain the remote commands that are ready on the HTTP queue.
//! 2. Poll the link probe and advance the link supervisor, applying its
//!    indicator command.
//! 3. Sample the button and advance the press classifier, dispatching on
//!    its event.
//!
//! Steps 1 and 3 can run a macro, which blocks the loop for the macro's
//! full duration — during that window nothing else advances, which is the
//! entire mutual-exclusion story: a concurrent button press and remote
//! command cannot both execute, the later one is processed on the next tick
//! after the macro completes. Missed ticks are skipped, not bursted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use keyfob_core::{CommandOutcome, TriggerSource};

use crate::application::classify_press::{InputClassifier, PressEvent};
use crate::application::dispatch_command::CommandDispatcher;
use crate::application::indicator::IndicatorDriver;
use crate::application::supervise_link::LinkSupervisor;
use crate::infrastructure::button::ButtonSource;
use crate::infrastructure::http_api::{ApiRequest, StatusSnapshot};
use crate::infrastructure::link_probe::LinkProbe;

/// Milliseconds since the Unix epoch. Wall-clock anchoring keeps the flash
/// phase reproducible across restarts.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// The assembled appliance: every component, wired to its adapters.
pub struct Appliance {
    classifier: InputClassifier,
    supervisor: LinkSupervisor,
    indicator: IndicatorDriver,
    dispatcher: CommandDispatcher,
    button: Box<dyn ButtonSource>,
    probe: Box<dyn LinkProbe>,
    api_rx: mpsc::Receiver<ApiRequest>,
    tick_period: Duration,
    started_at: Instant,
}

impl Appliance {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        classifier: InputClassifier,
        supervisor: LinkSupervisor,
        indicator: IndicatorDriver,
        dispatcher: CommandDispatcher,
        button: Box<dyn ButtonSource>,
        probe: Box<dyn LinkProbe>,
        api_rx: mpsc::Receiver<ApiRequest>,
        tick_period: Duration,
    ) -> Self {
        Self {
            classifier,
            supervisor,
            indicator,
            dispatcher,
            button,
            probe,
            api_rx,
            tick_period,
            started_at: Instant::now(),
        }
    }

    /// Runs the tick loop until `running` clears.
    pub async fn run(mut self, running: Arc<AtomicBool>) {
        let mut ticker = time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(period_ms = self.tick_period.as_millis() as u64, "tick loop started");
        while running.load(Ordering::Relaxed) {
            ticker.tick().await;
            self.tick(epoch_millis()).await;
        }
        info!("tick loop stopped");
    }

    /// Advances the appliance by one tick at the given instant.
    ///
    /// Public so the scenario tests can drive virtual time through the whole
    /// assembly without a ticker.
    pub async fn tick(&mut self, now_ms: u64) {
        // (1) Remote commands ready this tick.
        while let Ok(request) = self.api_rx.try_recv() {
            self.handle_request(request).await;
        }

        // (2) Link supervision.
        let link_up = self.probe.is_up();
        let command = self.supervisor.on_tick(link_up, now_ms);
        self.indicator.apply(command);

        // (3) Physical input.
        let pressed = self.button.is_pressed();
        if let Some(event) = self.classifier.on_tick(pressed, now_ms) {
            let name = match event {
                PressEvent::Short => "ctrlaltdel",
                PressEvent::Long => "sleep",
            };
            info!(?event, name, "button press classified");
            let result = self
                .dispatcher
                .dispatch(name, None, TriggerSource::Physical)
                .await;
            if result.outcome != CommandOutcome::Ok {
                // Degraded mode: the press is acknowledged but cannot reach
                // the target until connectivity returns.
                error!(name, outcome = ?result.outcome, "{}", result.message);
            }
        }
    }

    async fn handle_request(&mut self, request: ApiRequest) {
        match request {
            ApiRequest::Command {
                name,
                credential,
                reply,
            } => {
                let result = self
                    .dispatcher
                    .dispatch(&name, credential.as_deref(), TriggerSource::Remote)
                    .await;
                let _ = reply.send(result);
            }
            ApiRequest::TypeText { msg, reply } => {
                let result = self
                    .dispatcher
                    .dispatch_text(&msg, TriggerSource::Remote)
                    .await;
                let _ = reply.send(result);
            }
            ApiRequest::ToggleIndicator { reply } => {
                self.indicator.toggle();
                let _ = reply.send(self.indicator.is_lit());
            }
            ApiRequest::Status { reply } => {
                let link = self.supervisor.state();
                let _ = reply.send(StatusSnapshot {
                    hid_connected: self.dispatcher.emitter_connected(),
                    link_up: link.connected,
                    flashing: link.flashing,
                    indicator_lit: self.indicator.is_lit(),
                    uptime_secs: self.started_at.elapsed().as_secs(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::indicator::IndicatorPin;
    use crate::infrastructure::button::ScriptedButton;
    use crate::infrastructure::hid_link::mock::MockEmitter;
    use crate::infrastructure::link_probe::ScriptedProbe;
    use crate::application::run_macro::HidEmitter;
    use keyfob_core::CommandResult;
    use tokio::sync::oneshot;

    struct NullPin;
    impl IndicatorPin for NullPin {
        fn set(&mut self, _on: bool) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn appliance_with(
        button: ScriptedButton,
        probe: ScriptedProbe,
        emitter: Arc<MockEmitter>,
    ) -> (Appliance, mpsc::Sender<ApiRequest>) {
        let (tx, rx) = mpsc::channel(16);
        let dispatcher =
            CommandDispatcher::new(None, Arc::clone(&emitter) as Arc<dyn HidEmitter>);
        let appliance = Appliance::new(
            InputClassifier::new(2000),
            LinkSupervisor::new(60_000, 5_000),
            IndicatorDriver::new(Box::new(NullPin)),
            dispatcher,
            Box::new(button),
            Box::new(probe),
            rx,
            Duration::from_millis(50),
        );
        (appliance, tx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_press_dispatches_ctrl_alt_del() {
        // Arrange: pressed for ticks 1–2, released at tick 3
        let emitter = Arc::new(MockEmitter::new(true));
        let button = ScriptedButton::new(vec![false, true, true, false]);
        let (mut appliance, _tx) = appliance_with(button, ScriptedProbe::steady(), Arc::clone(&emitter));

        // Act
        for now in [0, 50, 100, 150] {
            appliance.tick(now).await;
        }

        // Assert: the chord went out exactly once
        assert_eq!(emitter.actions().len(), 2, "one press + one release");
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_press_dispatches_sleep_at_threshold() {
        // Arrange: held from t=0 onwards
        let emitter = Arc::new(MockEmitter::new(true));
        let button = ScriptedButton::new(vec![true]);
        let (mut appliance, _tx) = appliance_with(button, ScriptedProbe::steady(), Arc::clone(&emitter));

        // Act: tick up to the long-press threshold
        let mut now = 0;
        while now <= 2000 {
            appliance.tick(now).await;
            now += 50;
        }

        // Assert: three chords + three releases = the sleep combo
        assert_eq!(emitter.actions().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_command_is_processed_on_the_next_tick() {
        // Arrange
        let emitter = Arc::new(MockEmitter::new(true));
        let (mut appliance, tx) = appliance_with(
            ScriptedButton::idle(),
            ScriptedProbe::steady(),
            Arc::clone(&emitter),
        );
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(ApiRequest::Command {
            name: "ctrlaltdel".to_string(),
            credential: None,
            reply: reply_tx,
        })
        .await
        .unwrap();

        // Act
        appliance.tick(0).await;

        // Assert
        let result: CommandResult = reply_rx.await.unwrap();
        assert_eq!(result.outcome, CommandOutcome::Ok);
        assert_eq!(emitter.actions().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_request_reports_link_and_emitter() {
        let emitter = Arc::new(MockEmitter::new(false));
        let (mut appliance, tx) = appliance_with(
            ScriptedButton::idle(),
            ScriptedProbe::new(vec![false]),
            Arc::clone(&emitter),
        );
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(ApiRequest::Status { reply: reply_tx }).await.unwrap();

        appliance.tick(0).await;

        let snapshot = reply_rx.await.unwrap();
        assert!(!snapshot.hid_connected);
        assert!(!snapshot.link_up);
        assert!(!snapshot.flashing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_request_inverts_the_indicator() {
        let emitter = Arc::new(MockEmitter::new(true));
        let (mut appliance, tx) = appliance_with(
            ScriptedButton::idle(),
            ScriptedProbe::steady(),
            emitter,
        );

        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(ApiRequest::ToggleIndicator { reply: reply_tx })
            .await
            .unwrap();
        appliance.tick(0).await;
        assert!(reply_rx.await.unwrap(), "off → on");

        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(ApiRequest::ToggleIndicator { reply: reply_tx })
            .await
            .unwrap();
        appliance.tick(50).await;
        assert!(!reply_rx.await.unwrap(), "on → off");
    }
}
