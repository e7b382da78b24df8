//! Scripted processing backend
//!
//! Produces fixed outcomes and records what it was asked to do, so tests can
//! assert on the resolved configuration that reached the backend.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use jcm_ai::backend::{
    Artifact, Asset, BackendError, Content, Features, FrequencySpectrum, GenerationPrompt,
    LyricSection, Measurements, ProcessingBackend, StreamFormat, VocalMetrics,
};
use jcm_ai::preferences::ResolvedConfig;

#[derive(Default)]
pub struct MockBackend {
    failure: Option<BackendError>,
    delay: Option<Duration>,
    achieved_loudness: Option<f64>,
    without_vocal: bool,
    calls: AtomicUsize,
    seen_configs: Mutex<Vec<ResolvedConfig>>,
    seen_assets: Mutex<Vec<Asset>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `err`
    pub fn failing(mut self, err: BackendError) -> Self {
        self.failure = Some(err);
        self
    }

    /// Every call sleeps for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Master reports this achieved loudness
    pub fn with_achieved_loudness(mut self, lufs: f64) -> Self {
        self.achieved_loudness = Some(lufs);
        self
    }

    /// Analysis returns no vocal metrics
    pub fn without_vocal(mut self) -> Self {
        self.without_vocal = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_configs(&self) -> Vec<ResolvedConfig> {
        self.seen_configs.lock().unwrap().clone()
    }

    pub fn seen_assets(&self) -> Vec<Asset> {
        self.seen_assets.lock().unwrap().clone()
    }

    async fn enter(&self, asset: Option<&Asset>, config: Option<&ResolvedConfig>) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(asset) = asset {
            self.seen_assets.lock().unwrap().push(asset.clone());
        }
        if let Some(config) = config {
            self.seen_configs.lock().unwrap().push(config.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProcessingBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze(&self, asset: &Asset) -> Result<Features, BackendError> {
        self.enter(Some(asset), None).await?;

        Ok(Features {
            duration_secs: 200.0,
            bpm: 96.0,
            key: "A minor".to_string(),
            time_signature: "4/4".to_string(),
            average_loudness: -11.0,
            peak_loudness: -1.0,
            dynamic_range: 7.0,
            spectrum: FrequencySpectrum {
                bass: "heavy".to_string(),
                mids: "scooped".to_string(),
                highs: "airy".to_string(),
            },
            vocal: (!self.without_vocal).then(|| VocalMetrics {
                pitch_accuracy: 95.0,
                timing: 80.0,
                tone: 70.0,
                breath_control: 90.0,
                pitch_range_octaves: 3.0,
                dynamic_range: "Wide".to_string(),
                vibrato: "Controlled".to_string(),
            }),
            spectral_centroid: Some(3100.0),
            format: Some(StreamFormat {
                sample_rate: 48000,
                channels: 2,
                codec: "wav".to_string(),
            }),
        })
    }

    async fn generate(
        &self,
        prompt: &GenerationPrompt,
        constraints: &ResolvedConfig,
    ) -> Result<Content, BackendError> {
        self.enter(None, Some(constraints)).await?;

        let subject = match prompt {
            GenerationPrompt::Song { prompt } => prompt.clone(),
            GenerationPrompt::Lyrics { style } => style.clone(),
        };
        Ok(Content {
            sections: vec![LyricSection {
                name: "Hook".to_string(),
                text: format!("all about {}", subject),
            }],
            rhyme_scheme: Some("ABAB".to_string()),
            ..Default::default()
        })
    }

    async fn mix(&self, asset: &Asset, config: &ResolvedConfig) -> Result<Artifact, BackendError> {
        self.enter(Some(asset), Some(config)).await?;

        Ok(Artifact {
            asset_id: "mixdown".to_string(),
            download_url: Some("/files/mixdown.wav".to_string()),
            achieved_loudness: None,
            measurements: Some(Measurements {
                detected_genre: "house".to_string(),
                average_loudness: -9.5,
                dynamic_range: 6.0,
                frequency_balance: "bright".to_string(),
            }),
        })
    }

    async fn master(&self, asset: &Asset, config: &ResolvedConfig) -> Result<Artifact, BackendError> {
        self.enter(Some(asset), Some(config)).await?;

        Ok(Artifact {
            asset_id: "master".to_string(),
            download_url: Some("/files/master.wav".to_string()),
            achieved_loudness: self.achieved_loudness,
            measurements: None,
        })
    }
}
