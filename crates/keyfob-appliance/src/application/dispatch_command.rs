//! Command dispatch: the single mapping from command name to macro.
//!
//! Both trigger paths — the button and the remote surface — funnel through
//! this component, which is the sole call site for the macro sequencer, so
//! an action behaves identically regardless of origin. Authorization is
//! applied to the remote path only: physical possession of the button is its
//! own authorization.

use std::collections::HashMap;
use std::sync::Arc;

use keyfob_core::domain::macros::TEXT_CHUNK_SIZE;
use keyfob_core::{CommandResult, Macro, TriggerSource};
use tracing::{info, warn};

use crate::application::run_macro::{HidEmitter, MacroSequencer, SequencerError};

/// Dispatches named commands to macros, gating the remote path behind the
/// optional shared secret.
pub struct CommandDispatcher {
    macros: HashMap<String, Macro>,
    shared_secret: Option<String>,
    sequencer: MacroSequencer,
    emitter: Arc<dyn HidEmitter>,
}

impl CommandDispatcher {
    /// Builds the dispatcher with the appliance's fixed action set.
    ///
    /// An empty `shared_secret` disables the credential check entirely.
    pub fn new(shared_secret: Option<String>, emitter: Arc<dyn HidEmitter>) -> Self {
        Self::with_macros(
            vec![Macro::ctrl_alt_del(), Macro::sleep_combo()],
            shared_secret,
            emitter,
        )
    }

    /// Builds a dispatcher over an explicit macro table (used by tests).
    pub fn with_macros(
        macros: Vec<Macro>,
        shared_secret: Option<String>,
        emitter: Arc<dyn HidEmitter>,
    ) -> Self {
        let macros = macros.into_iter().map(|m| (m.name.clone(), m)).collect();
        let shared_secret = shared_secret.filter(|s| !s.is_empty());
        Self {
            macros,
            shared_secret,
            sequencer: MacroSequencer::new(),
            emitter,
        }
    }

    /// The registered command names, for the help text.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether the HID target is currently reachable.
    pub fn emitter_connected(&self) -> bool {
        self.emitter.is_connected()
    }

    /// Dispatches a named command.
    pub async fn dispatch(
        &self,
        name: &str,
        credential: Option<&str>,
        source: TriggerSource,
    ) -> CommandResult {
        let Some(m) = self.macros.get(name) else {
            warn!(name, ?source, "unknown command");
            return CommandResult::not_found(name);
        };

        if !self.authorized(credential, source) {
            warn!(name, "credential check failed");
            return CommandResult::unauthorized();
        }

        info!(name, ?source, "dispatching macro");
        self.run(m).await
    }

    /// Types arbitrary text through an ephemeral chunked macro.
    ///
    /// Not credential-gated: the typing surface carries no secret in the
    /// original route table, and the transport maps its failures to 400.
    pub async fn dispatch_text(&self, msg: &str, source: TriggerSource) -> CommandResult {
        if msg.is_empty() {
            return CommandResult::bad_request("msg parameter required");
        }

        info!(chars = msg.chars().count(), ?source, "typing text");
        let m = Macro::typed_text(msg, TEXT_CHUNK_SIZE);
        self.run(&m).await
    }

    async fn run(&self, m: &Macro) -> CommandResult {
        match self.sequencer.run(m, self.emitter.as_ref()).await {
            Ok(()) => CommandResult::ok(format!("{} sent", m.name)),
            Err(SequencerError::NotConnected) => {
                warn!(name = %m.name, "HID target not connected");
                CommandResult::not_connected()
            }
        }
    }

    fn authorized(&self, credential: Option<&str>, source: TriggerSource) -> bool {
        if source == TriggerSource::Physical {
            return true;
        }
        match &self.shared_secret {
            None => true,
            Some(secret) => credential == Some(secret.as_str()),
        }
    }
}
