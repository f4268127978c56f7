use anyhow::Result;
use serde::Deserialize;

use crate::metrics::MetricsConfig;
use crate::viz::{DeviceProfile, QualityTier};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub visualization: VizSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub channels: u16,
    pub silence_threshold: f32,
    pub max_duration_secs: Option<u64>,
    pub auto_stop: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            silence_threshold: 0.02,
            max_duration_secs: None,
            auto_stop: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// Overrides the built-in filler dictionary when set.
    pub filler_words: Option<Vec<String>>,
    pub pause_threshold_secs: Option<f64>,
    pub target_wpm: Option<f64>,
}

impl MetricsSettings {
    pub fn to_metrics_config(&self) -> MetricsConfig {
        let mut config = MetricsConfig::default();
        if let Some(words) = &self.filler_words {
            config.filler_words = words.clone();
        }
        if let Some(threshold) = self.pause_threshold_secs {
            config.pause_threshold = threshold;
        }
        if let Some(wpm) = self.target_wpm {
            config.target_wpm = wpm;
        }
        config
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VizSettings {
    /// Explicit quality tier name; unset falls back to the device
    /// heuristic.
    pub quality: Option<String>,
    /// Declared device capabilities, if the host knows them.
    pub device: Option<DeviceProfile>,
}

impl VizSettings {
    pub fn quality_tier(&self) -> Option<QualityTier> {
        self.quality.as_deref().and_then(QualityTier::from_name)
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
