//! Orchestration of one identification: compress, request, parse.
//!
//! [`IdentificationOrchestrator`] holds the long-lived collaborators. Each
//! user capture gets its own [`Orchestration`] run, which owns the run's
//! stage and is consumed by [`Orchestration::identify`], so a finished run
//! cannot be restarted.

use crate::ai::{IdentificationClient, IdentificationRequestBuilder, VisionService};
use crate::error::{IdentificationFailure, Stage};
use crate::image::{ImageCompressor, ImageService};
use crate::models::{Config, ModelParameters, PlantIdentification};
use crate::{parser, Error, Result};
use std::time::Duration;
use tokio::sync::watch;
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

pub type IdentificationOutcome = std::result::Result<PlantIdentification, IdentificationFailure>;

/// Retries for transport failures only. The default performs none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            delay: Duration::from_secs(1),
        }
    }
}

/// Injectable service bundle used to construct [`IdentificationOrchestrator`].
pub struct PipelineServices {
    pub compressor: Box<dyn ImageService>,
    pub vision: Box<dyn VisionService>,
}

pub struct IdentificationOrchestrator {
    compressor: Box<dyn ImageService>,
    vision: Box<dyn VisionService>,
    builder: IdentificationRequestBuilder,
    retry: RetryPolicy,
}

impl IdentificationOrchestrator {
    /// Build an orchestrator from concrete service dependencies.
    pub fn with_services(services: PipelineServices) -> Self {
        Self {
            compressor: services.compressor,
            vision: services.vision,
            builder: IdentificationRequestBuilder::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Default compressor and an HTTP client configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = IdentificationClient::new(config.endpoint.clone(), config.timeout)?;
        if let Some(api_key) = &config.api_key {
            client = client.with_api_key(api_key.clone());
        }
        info!("Identification endpoint: {}", client.endpoint());

        Ok(Self::with_services(PipelineServices {
            compressor: Box::new(ImageCompressor::default()),
            vision: Box::new(client),
        }))
    }

    pub fn with_model_parameters(mut self, params: ModelParameters) -> Self {
        self.builder = IdentificationRequestBuilder::new(params);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Start a fresh run for one capture.
    pub fn start(&self) -> Orchestration<'_> {
        let (stage, _) = watch::channel(Stage::Idle);
        Orchestration {
            pipeline: self,
            id: Uuid::new_v4(),
            stage,
        }
    }

    /// Run one identification that cannot be cancelled.
    pub async fn identify(&self, image: &[u8], location_hint: Option<&str>) -> IdentificationOutcome {
        self.start()
            .identify(image, location_hint, &CancellationToken::new())
            .await
    }

    async fn attempt(&self, image: &[u8], location_hint: Option<&str>) -> Result<String> {
        let request = self.builder.build(image, location_hint)?;
        self.vision.send(request).await
    }

    async fn request(&self, image: &[u8], location_hint: Option<&str>) -> Result<String> {
        let strategy = FixedInterval::new(self.retry.delay).take(self.retry.retries);
        RetryIf::spawn(
            strategy,
            || self.attempt(image, location_hint),
            |e: &Error| {
                let retry = matches!(e, Error::Network(_));
                if retry && self.retry.retries > 0 {
                    warn!("Identification request failed, may retry: {}", e);
                }
                retry
            },
        )
        .await
    }
}

/// A single identification run.
pub struct Orchestration<'a> {
    pipeline: &'a IdentificationOrchestrator,
    id: Uuid,
    stage: watch::Sender<Stage>,
}

impl Orchestration<'_> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        *self.stage.borrow()
    }

    /// Receiver that observes every stage transition of this run.
    pub fn progress(&self) -> watch::Receiver<Stage> {
        self.stage.subscribe()
    }

    fn advance(&self, stage: Stage) {
        debug!("Stage {} -> {}", self.stage(), stage);
        self.stage.send_replace(stage);
    }

    fn fail(&self, error: Error) -> IdentificationFailure {
        let stage = self.stage();
        warn!("Identification failed during {}: {}", stage, error);
        self.advance(Stage::Failed);
        IdentificationFailure::new(stage, error)
    }

    /// Run the pipeline to a terminal stage.
    ///
    /// Cancelling `cancel` before the model has answered yields
    /// [`Error::Cancelled`] without parsing anything.
    pub async fn identify(
        self,
        image: &[u8],
        location_hint: Option<&str>,
        cancel: &CancellationToken,
    ) -> IdentificationOutcome {
        let span = tracing::info_span!("identify", run_id = %self.id);
        async move {
            if cancel.is_cancelled() {
                return Err(self.fail(Error::Cancelled));
            }

            self.advance(Stage::Compressing);
            let compressed = self
                .pipeline
                .compressor
                .compress(image)
                .map_err(|e| self.fail(e))?;
            if cancel.is_cancelled() {
                return Err(self.fail(Error::Cancelled));
            }

            self.advance(Stage::Requesting);
            let answer = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Error::Cancelled),
                result = self.pipeline.request(&compressed, location_hint) => result,
            };
            let raw = answer.map_err(|e| self.fail(e))?;

            self.advance(Stage::Parsing);
            let plant = parser::parse(&raw).map_err(|e| self.fail(e))?;

            self.advance(Stage::Succeeded);
            info!("Identified plant: {}", plant.common_name);
            Ok(plant)
        }
        .instrument(span)
        .await
    }
}
