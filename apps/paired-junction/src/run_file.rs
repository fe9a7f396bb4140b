//! JSON run file: cycle configuration plus the intersections to bring up.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tl_control::IntersectionSpec;
use tl_core::{CycleConfig, LightState};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunFile {
    pub config:        CycleConfig,
    pub initial:       LightState,
    /// Wall seconds per simulated second; `1.0` runs in real time.
    pub time_scale:    f64,
    pub output_dir:    PathBuf,
    pub intersections: Vec<IntersectionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct IntersectionEntry {
    pub label:         String,
    #[serde(default = "yes")]
    pub operative:     bool,
    #[serde(default = "both_online")]
    pub lights_online: [bool; 2],
}

fn yes() -> bool {
    true
}

fn both_online() -> [bool; 2] {
    [true, true]
}

impl Default for RunFile {
    fn default() -> Self {
        Self {
            config:        CycleConfig::default(),
            initial:       LightState::Green,
            time_scale:    1.0,
            output_dir:    PathBuf::from("./output"),
            intersections: vec![
                IntersectionEntry::named("north-south"),
                IntersectionEntry::named("east-west"),
            ],
        }
    }
}

impl RunFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading run file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing run file {}", path.display()))
    }
}

impl IntersectionEntry {
    fn named(label: &str) -> Self {
        Self {
            label:         label.to_owned(),
            operative:     true,
            lights_online: both_online(),
        }
    }

    pub fn to_spec(&self) -> IntersectionSpec {
        let mut spec = IntersectionSpec::new(self.label.clone());
        if !self.operative {
            spec = spec.not_operative();
        }
        for (i, online) in self.lights_online.iter().enumerate() {
            if !online {
                spec = spec.light_offline(i);
            }
        }
        spec
    }
}
