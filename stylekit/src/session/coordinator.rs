//! The per-run actor that fetches a style and its resources, then builds
//! the pipeline.
//!
//! All mutable session state lives here and is touched only from the run
//! loop. Fetch tasks report back over a channel, so completions are
//! handled one at a time in whatever order they arrive.

use super::error::SessionError;
use super::state::SessionState;
use crate::fetch::{FetchCompletion, FetchId, FetchPurpose, FetchSet, FetchStatus};
use crate::locator::{join_reference, ResourceLocator};
use crate::pipeline::{PipelineBackend, PipelineDescriptor, PipelineOptions, PipelineSelector, PipelineSummary};
use crate::style::{
    parse_tile_spec, SpriteAtlas, SpriteSheet, SpriteUrls, Sprites, StyleDocument, StyleResolver,
};
use crate::transport::Transport;
use crate::view::{MapView, Presentation};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Everything one run needs.
pub(crate) struct RunContext {
    pub style_url: String,
    pub locator: ResourceLocator,
    pub transport: Arc<dyn Transport>,
    pub resolver: Arc<dyn StyleResolver>,
    pub backend: PipelineBackend,
    pub view: Arc<dyn MapView>,
    pub options: PipelineOptions,
    pub state_tx: Arc<watch::Sender<SessionState>>,
}

/// Result of handling one completion.
enum Step {
    Continue,
    Attached(PipelineSummary),
    Failed(SessionError),
}

pub(crate) struct FetchCoordinator {
    style_url: String,
    locator: ResourceLocator,
    resolver: Arc<dyn StyleResolver>,
    backend: PipelineBackend,
    view: Arc<dyn MapView>,
    presentation: Presentation,
    options: PipelineOptions,
    state_tx: Arc<watch::Sender<SessionState>>,
    fetches: FetchSet,
    completion_rx: mpsc::UnboundedReceiver<FetchCompletion>,
    style_bytes: Option<Vec<u8>>,
    style: Option<StyleDocument>,
    sprites: Sprites,
    failure: Option<SessionError>,
    pipeline: Option<PipelineDescriptor>,
}

impl FetchCoordinator {
    /// Fetch tasks are children of `shutdown` and die with it.
    pub(crate) fn new(ctx: RunContext, shutdown: &CancellationToken) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let presentation = ctx.view.presentation();

        Self {
            style_url: ctx.style_url,
            locator: ctx.locator,
            resolver: ctx.resolver,
            backend: ctx.backend,
            view: ctx.view,
            presentation,
            options: ctx.options,
            state_tx: ctx.state_tx,
            fetches: FetchSet::new(ctx.transport, completion_tx, shutdown.clone()),
            completion_rx,
            style_bytes: None,
            style: None,
            sprites: Sprites::default(),
            failure: None,
            pipeline: None,
        }
    }

    /// Runs until the pipeline fails to come up or `shutdown` fires.
    ///
    /// After a successful attach the actor keeps running so that a later
    /// stop can tear the pipeline down.
    pub(crate) async fn run(mut self, shutdown: CancellationToken) {
        info!(
            url = %self.style_url,
            hybrid = self.options.hybrid_mode,
            presentation = %self.presentation,
            "Session started"
        );
        self.issue_style_fetch().await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    self.shutdown();
                    break;
                }

                Some(completion) = self.completion_rx.recv() => {
                    match self.handle_completion(completion).await {
                        Step::Continue => {}
                        Step::Attached(summary) => {
                            info!(
                                kind = %summary.kind,
                                layer = %summary.layer,
                                zoom = %summary.zoom,
                                "Pipeline attached"
                            );
                            self.publish(SessionState::Attached(summary));
                        }
                        Step::Failed(err) => {
                            self.abort(err);
                            break;
                        }
                    }
                }
            }
        }
    }

    fn publish(&self, state: SessionState) {
        trace!(state = %state, "Session state");
        self.state_tx.send_replace(state);
    }

    async fn issue_style_fetch(&mut self) {
        let target = self.locator.resolve_for_fetch(&self.style_url).await;
        let url = self.style_url.clone();
        self.fetches.issue(FetchPurpose::Style, &url, target);
        self.publish(SessionState::FetchingStyle);
    }

    async fn handle_completion(&mut self, completion: FetchCompletion) -> Step {
        let FetchCompletion { id, result } = completion;
        let status = if result.is_ok() {
            FetchStatus::Succeeded
        } else {
            FetchStatus::Failed
        };

        let Some(handle) = self.fetches.settle(id, status) else {
            trace!(
                fetch_id = %id,
                status = ?self.fetches.get(id).map(|h| h.status()),
                "Ignoring completion of settled fetch"
            );
            return Step::Continue;
        };
        let purpose = handle.purpose().clone();
        let url = handle.url().to_string();
        let cache_hit = handle.target().is_cache_hit();

        match result {
            Ok(bytes) => {
                debug!(
                    fetch_id = %id,
                    purpose = %purpose,
                    bytes = bytes.len(),
                    cache_hit,
                    "Fetch completed"
                );
                if let Err(err) = self.accept(id, &purpose, &url, bytes, cache_hit).await {
                    self.fail(err);
                }
            }
            Err(e) => {
                warn!(fetch_id = %id, purpose = %purpose, url = %url, error = %e, "Fetch failed");
                self.fail(SessionError::transport(&url, &e));
            }
        }

        self.progress()
    }

    /// Interprets a successful payload. Only payloads that parse are cached,
    /// and the cache write runs in the background.
    async fn accept(
        &mut self,
        id: FetchId,
        purpose: &FetchPurpose,
        url: &str,
        bytes: Vec<u8>,
        cache_hit: bool,
    ) -> Result<(), SessionError> {
        if self.failure.is_some() {
            trace!(fetch_id = %id, "Session already failed, dropping payload");
            return Ok(());
        }

        match purpose {
            FetchPurpose::Style => self.accept_style(url, &bytes).await?,
            FetchPurpose::TileSpec { source } => {
                let spec = parse_tile_spec(&bytes).map_err(|e| SessionError::parse(url, &e))?;
                debug!(source = %source, min_zoom = spec.min_zoom, max_zoom = spec.max_zoom, "Tile-spec resolved");
                if let Some(src) = self.style.as_mut().and_then(|s| s.source_mut(source)) {
                    src.tile_spec = Some(spec);
                }
            }
            FetchPurpose::SpriteJson => {
                let sheet = SpriteSheet::parse(&bytes).map_err(|e| SessionError::parse(url, &e))?;
                debug!(icons = sheet.len(), "Sprite sheet loaded");
                self.sprites.sheet = Some(sheet);
            }
            FetchPurpose::SpritePng => {
                let atlas = SpriteAtlas::decode(&bytes).map_err(|e| SessionError::parse(url, &e))?;
                debug!(width = atlas.width, height = atlas.height, "Sprite atlas loaded");
                self.sprites.atlas = Some(atlas);
            }
        }

        if matches!(purpose, FetchPurpose::Style) {
            self.style_bytes = Some(bytes.clone());
        }
        if !cache_hit {
            self.locator.spawn_cache_write(url, bytes);
        }
        Ok(())
    }

    /// Parses the style and issues the TileJSON and sprite fetches it needs.
    ///
    /// Relative source and sprite URLs are resolved against the style URL.
    async fn accept_style(&mut self, url: &str, bytes: &[u8]) -> Result<(), SessionError> {
        let style = self
            .resolver
            .parse(bytes, &self.options.settings, self.presentation, None)
            .map_err(|e| SessionError::parse(url, &e))?;

        let mut pending_sources = Vec::new();
        for source in style.sources.iter().filter(|s| !s.is_resolved()) {
            match &source.url {
                Some(source_url) => pending_sources
                    .push((source.name.clone(), join_reference(&self.style_url, source_url))),
                None => {
                    return Err(SessionError::Parse {
                        url: url.to_string(),
                        message: format!("source '{}' has neither tiles nor url", source.name),
                    })
                }
            }
        }

        info!(
            name = %style.name,
            sources = style.sources.len(),
            layers = style.layers.len(),
            remote_sources = pending_sources.len(),
            sprite = style.sprite.is_some(),
            "Style parsed"
        );

        for (source, source_url) in pending_sources {
            let target = self.locator.resolve_for_fetch(&source_url).await;
            self.fetches
                .issue(FetchPurpose::TileSpec { source }, &source_url, target);
        }

        if let Some(base) = &style.sprite {
            let urls = SpriteUrls::from_base(&join_reference(&self.style_url, base));
            let json_target = self.locator.resolve_for_fetch(&urls.json).await;
            self.fetches.issue(FetchPurpose::SpriteJson, &urls.json, json_target);
            let png_target = self.locator.resolve_for_fetch(&urls.png).await;
            self.fetches.issue(FetchPurpose::SpritePng, &urls.png, png_target);
        }

        self.style = Some(style);
        Ok(())
    }

    /// Records the first failure and cancels everything still in flight.
    fn fail(&mut self, err: SessionError) {
        if self.failure.is_none() {
            debug!(error = %err, outstanding = self.fetches.pending(), "Canceling outstanding fetches");
            self.failure = Some(err);
        }
        self.fetches.cancel_all();
    }

    /// Decides what happens once the completion was absorbed.
    fn progress(&mut self) -> Step {
        let outstanding = self.fetches.pending();
        if outstanding > 0 {
            self.publish(SessionState::FetchingResources { outstanding });
            return Step::Continue;
        }

        if let Some(err) = self.failure.take() {
            return Step::Failed(err);
        }

        if !self.fetches.join_mut().try_fire() {
            return Step::Continue;
        }

        let (Some(style), Some(style_bytes)) = (&self.style, &self.style_bytes) else {
            return Step::Failed(SessionError::Configuration(
                "resources settled without a style".to_string(),
            ));
        };
        if !style.all_sources_resolved() {
            return Step::Failed(SessionError::Configuration(
                "sources left unresolved".to_string(),
            ));
        }

        self.publish(SessionState::Building);
        let sprites = Arc::new(std::mem::take(&mut self.sprites));
        let selector = PipelineSelector::new(self.resolver.as_ref(), &self.backend, &self.options);
        match selector.select(style_bytes, style, sprites) {
            Ok(pipeline) => {
                let summary = pipeline.summary();
                self.pipeline = Some(pipeline);
                Step::Attached(summary)
            }
            Err(err) => Step::Failed(err),
        }
    }

    fn abort(&mut self, err: SessionError) {
        error!(url = %self.style_url, error = %err, "Session aborted");
        self.fetches.cancel_all();
        if let Some(pipeline) = self.pipeline.take() {
            pipeline.teardown(self.view.as_ref());
        }
        self.publish(SessionState::Aborted(err));
    }

    fn shutdown(&mut self) {
        let canceled = self.fetches.cancel_all();
        if let Some(pipeline) = self.pipeline.take() {
            pipeline.teardown(self.view.as_ref());
        }
        info!(url = %self.style_url, canceled, "Session stopped");
        self.publish(SessionState::Stopped);
    }
}
