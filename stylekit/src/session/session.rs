//! The public session handle.

use super::coordinator::{FetchCoordinator, RunContext};
use super::error::SessionError;
use super::state::{SessionOutcome, SessionState};
use crate::config::SessionConfig;
use crate::pipeline::PipelineBackend;
use crate::style::{JsonStyleResolver, StyleResolver};
use crate::transport::Transport;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct ActiveRun {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

/// Loads a style, fetches what it references and attaches a pipeline to
/// the view.
///
/// A session can be started, stopped and started again. Each start is an
/// independent run with its own fetches; stopping cancels whatever is in
/// flight and detaches any pipeline.
///
/// # Example
///
/// ```ignore
/// let mut session = StyleSession::new(config, transport, backend);
/// session.start().await?;
///
/// match session.wait_for_outcome().await {
///     SessionOutcome::Attached(summary) => println!("attached {}", summary.kind),
///     SessionOutcome::Failed(err) => eprintln!("{}", err),
///     SessionOutcome::Stopped => {}
/// }
///
/// session.stop().await;
/// ```
pub struct StyleSession {
    config: SessionConfig,
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn StyleResolver>,
    backend: PipelineBackend,
    state_tx: Arc<watch::Sender<SessionState>>,
    run: Option<ActiveRun>,
}

impl StyleSession {
    /// Creates an idle session.
    ///
    /// Styles are parsed with [`JsonStyleResolver`], using the font
    /// override from `config` if one is set.
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn Transport>,
        backend: PipelineBackend,
    ) -> Self {
        let resolver = match config.font_override() {
            Some(fonts) => JsonStyleResolver::new().with_font_override(fonts.clone()),
            None => JsonStyleResolver::new(),
        };
        let (state_tx, _) = watch::channel(SessionState::Idle);

        Self {
            config,
            transport,
            resolver: Arc::new(resolver),
            backend,
            state_tx: Arc::new(state_tx),
            run: None,
        }
    }

    /// Replaces the style resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn StyleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Starts a run.
    ///
    /// Requires a style URL and a target view; without either nothing is
    /// fetched and a configuration error is returned. Starting a running
    /// session stops the current run first.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        let Some(style_url) = self.config.style_url().map(str::to_string) else {
            warn!("Session start ignored: no style URL configured");
            return Err(SessionError::Configuration("no style URL configured".to_string()));
        };
        let Some(view) = self.backend.view.clone() else {
            warn!(url = %style_url, "Session start ignored: no target view");
            return Err(SessionError::Configuration("no target view".to_string()));
        };

        if self.run.is_some() {
            info!(url = %style_url, "Restarting session");
            self.stop().await;
        }

        let shutdown = CancellationToken::new();
        let coordinator = FetchCoordinator::new(
            RunContext {
                style_url,
                locator: self.config.locator(),
                transport: Arc::clone(&self.transport),
                resolver: Arc::clone(&self.resolver),
                backend: self.backend.clone(),
                view,
                options: self.config.pipeline().clone(),
                state_tx: Arc::clone(&self.state_tx),
            },
            &shutdown,
        );

        // Published before spawning so observers never see the previous
        // run's terminal state after start returns.
        self.state_tx.send_replace(SessionState::FetchingStyle);
        let task = tokio::spawn(coordinator.run(shutdown.clone()));
        self.run = Some(ActiveRun { shutdown, task });
        Ok(())
    }

    /// Stops the current run, cancelling outstanding fetches and detaching
    /// any attached pipeline. Idempotent.
    pub async fn stop(&mut self) {
        let Some(run) = self.run.take() else {
            debug!("Session already stopped");
            return;
        };

        run.shutdown.cancel();
        if let Err(e) = run.task.await {
            warn!(error = %e, "Session task ended abnormally");
        }
    }

    /// Returns true while a run exists, including a run that already
    /// attached its pipeline or failed but was not stopped yet.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// The current state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Waits until the current run attaches, fails or is stopped.
    ///
    /// Returns [`SessionOutcome::Stopped`] right away for a session that
    /// was never started.
    pub async fn wait_for_outcome(&self) -> SessionOutcome {
        let mut rx = self.state_tx.subscribe();
        loop {
            let state = rx.borrow_and_update().clone();
            if let Some(outcome) = state.outcome() {
                return outcome;
            }
            if matches!(state, SessionState::Idle) {
                return SessionOutcome::Stopped;
            }
            if rx.changed().await.is_err() {
                return SessionOutcome::Stopped;
            }
        }
    }
}

impl Drop for StyleSession {
    fn drop(&mut self) {
        // The run loop tears the pipeline down on its own once cancelled.
        if let Some(run) = &self.run {
            run.shutdown.cancel();
        }
    }
}

impl fmt::Debug for StyleSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleSession")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("running", &self.run.is_some())
            .finish_non_exhaustive()
    }
}
