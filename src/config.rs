use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::detect::{DetectionFilter, DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH};
use crate::exit::{ExitMask, ExitRegionSet};
use crate::track::{CounterSettings, VehicleCounter};

const DEFAULT_FRAME_WIDTH: u32 = 1280;
const DEFAULT_FRAME_HEIGHT: u32 = 720;
const DEFAULT_FRAME_STRIDE: u32 = 2;

pub const CONFIG_ENV: &str = "VEHICLE_COUNTER_CONFIG";

#[derive(Debug, Deserialize, Default)]
struct TrackingConfigFile {
    frame: Option<FrameConfigFile>,
    exits: Option<ExitsConfigFile>,
    tracking: Option<TrackingSettingsFile>,
    detection: Option<DetectionConfigFile>,
    frame_stride: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct FrameConfigFile {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ExitsConfigFile {
    polygons: Option<Vec<Vec<[i64; 2]>>>,
    mask_images: Option<Vec<PathBuf>>,
}

#[derive(Debug, Deserialize, Default)]
struct TrackingSettingsFile {
    path_size: Option<usize>,
    max_distance: Option<f64>,
    x_weight: Option<f64>,
    y_weight: Option<f64>,
    max_coast_frames: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectionConfigFile {
    min_width: Option<f64>,
    min_height: Option<f64>,
}

/// Settings for a counting run: frame geometry, exit regions, tracker
/// tuning, detection size filter and frame decimation.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    pub width: u32,
    pub height: u32,
    /// Exit polygons, all filled into a single mask.
    pub exit_polygons: Vec<Vec<(i64, i64)>>,
    /// Pre-drawn exit mask images (feature `mask-images`).
    pub exit_mask_images: Vec<PathBuf>,
    pub counter: CounterSettings,
    pub min_width: f64,
    pub min_height: f64,
    /// Process every n-th frame.
    pub frame_stride: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
            exit_polygons: Vec::new(),
            exit_mask_images: Vec::new(),
            counter: CounterSettings::default(),
            min_width: DEFAULT_MIN_WIDTH,
            min_height: DEFAULT_MIN_HEIGHT,
            frame_stride: DEFAULT_FRAME_STRIDE,
        }
    }
}

impl TrackingConfig {
    /// Load from the file named by `VEHICLE_COUNTER_CONFIG` (if set), then
    /// apply environment overrides and validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        Self::load_from(config_path.as_deref())
    }

    /// Like `load`, with an explicit file taking the place of the env var.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: TrackingConfigFile) -> Self {
        let defaults = Self::default();
        let frame = file.frame.unwrap_or_default();
        let exits = file.exits.unwrap_or_default();
        let tracking = file.tracking.unwrap_or_default();
        let detection = file.detection.unwrap_or_default();

        Self {
            width: frame.width.unwrap_or(defaults.width),
            height: frame.height.unwrap_or(defaults.height),
            exit_polygons: exits
                .polygons
                .unwrap_or_default()
                .into_iter()
                .map(|polygon| polygon.into_iter().map(|[x, y]| (x, y)).collect())
                .collect(),
            exit_mask_images: exits.mask_images.unwrap_or_default(),
            counter: CounterSettings {
                path_size: tracking.path_size.unwrap_or(defaults.counter.path_size),
                max_distance: tracking
                    .max_distance
                    .unwrap_or(defaults.counter.max_distance),
                x_weight: tracking.x_weight.unwrap_or(defaults.counter.x_weight),
                y_weight: tracking.y_weight.unwrap_or(defaults.counter.y_weight),
                max_coast_frames: tracking
                    .max_coast_frames
                    .unwrap_or(defaults.counter.max_coast_frames),
            },
            min_width: detection.min_width.unwrap_or(defaults.min_width),
            min_height: detection.min_height.unwrap_or(defaults.min_height),
            frame_stride: file.frame_stride.unwrap_or(defaults.frame_stride),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(path_size) = env_override("VEHICLE_COUNTER_PATH_SIZE")? {
            self.counter.path_size = path_size;
        }
        if let Some(max_distance) = env_override("VEHICLE_COUNTER_MAX_DISTANCE")? {
            self.counter.max_distance = max_distance;
        }
        if let Some(x_weight) = env_override("VEHICLE_COUNTER_X_WEIGHT")? {
            self.counter.x_weight = x_weight;
        }
        if let Some(y_weight) = env_override("VEHICLE_COUNTER_Y_WEIGHT")? {
            self.counter.y_weight = y_weight;
        }
        if let Some(max_coast) = env_override("VEHICLE_COUNTER_MAX_COAST_FRAMES")? {
            self.counter.max_coast_frames = max_coast;
        }
        if let Some(stride) = env_override("VEHICLE_COUNTER_FRAME_STRIDE")? {
            self.frame_stride = stride;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.counter.validate()?;
        if self.width == 0 || self.height == 0 {
            return Err(anyhow!(
                "frame dimensions must be non-zero (got {}x{})",
                self.width,
                self.height
            ));
        }
        if self.frame_stride == 0 {
            return Err(anyhow!("frame_stride must be >= 1"));
        }
        for (name, value) in [("min_width", self.min_width), ("min_height", self.min_height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(anyhow!("{} must be a finite value >= 0", name));
            }
        }
        Ok(())
    }

    /// Rasterise the configured exits. Polygons share one mask; every mask
    /// image becomes its own mask.
    pub fn build_exits(&self) -> Result<ExitRegionSet> {
        let mut masks = Vec::new();
        if !self.exit_polygons.is_empty() {
            masks.push(ExitMask::from_polygons(
                self.width,
                self.height,
                &self.exit_polygons,
            )?);
        }
        for path in &self.exit_mask_images {
            masks.push(self.load_mask_image(path)?);
        }
        Ok(ExitRegionSet::new(masks)?)
    }

    #[cfg(feature = "mask-images")]
    fn load_mask_image(&self, path: &Path) -> Result<ExitMask> {
        let mask = ExitMask::from_image_path(path)?;
        if mask.width() != self.width || mask.height() != self.height {
            return Err(anyhow!(
                "exit mask {} is {}x{}, frame is {}x{}",
                path.display(),
                mask.width(),
                mask.height(),
                self.width,
                self.height
            ));
        }
        Ok(mask)
    }

    #[cfg(not(feature = "mask-images"))]
    fn load_mask_image(&self, path: &Path) -> Result<ExitMask> {
        Err(anyhow!(
            "exit mask image {} requires the mask-images feature",
            path.display()
        ))
    }

    pub fn build_counter(&self) -> Result<VehicleCounter> {
        Ok(VehicleCounter::new(self.build_exits()?, self.counter)?)
    }

    pub fn build_filter(&self) -> DetectionFilter {
        DetectionFilter::new(self.min_width, self.min_height)
    }
}

fn read_config_file(path: &Path) -> Result<TrackingConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    let cfg = if is_toml {
        toml::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn env_override<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("{} has an invalid value: {}", key, value)),
        _ => Ok(None),
    }
}
