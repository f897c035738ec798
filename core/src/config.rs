use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CaveError, CaveResult};

// Distance band, in percent of the smaller map side, around a reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBand {
    pub min_percent: f32,
    pub max_percent: f32,
}

impl DistanceBand {
    pub fn new(min_percent: f32, max_percent: f32) -> Self {
        Self {
            min_percent,
            max_percent,
        }
    }
}

// A named spawn point placed relative to the anchor point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub name: String,
    #[serde(flatten)]
    pub band: DistanceBand,
}

impl SpawnRule {
    pub fn new(name: &str, min_percent: f32, max_percent: f32) -> Self {
        Self {
            name: name.to_string(),
            band: DistanceBand::new(min_percent, max_percent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    // grid
    pub width: usize,
    pub height: usize,
    pub fill_percent: u32,
    pub simulation_steps: usize,
    pub seed: u64,
    pub use_random_seed: bool,
    // growth applied before every generation, in percent
    pub growth_percent: f32,

    // corridors
    pub corridor_width: u32,

    // meshes
    pub cell_size: f32,
    pub soil_depth: f32,
    pub water_depth: f32,
    pub water_offset: [f32; 3],
    pub level_depth: f32,

    // placement
    pub obstacle_stride: usize,
    pub obstacle_spacing: f32,
    pub max_sample_attempts: u32,
    pub spawn: Vec<SpawnRule>,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            width: 192,
            height: 108,
            fill_percent: 43,
            simulation_steps: 20,
            seed: 0,
            use_random_seed: false,
            growth_percent: 4.0,
            corridor_width: 3,
            cell_size: 1.0,
            soil_depth: -7.0,
            water_depth: 0.0,
            water_offset: [0.0, 0.0, -1.0],
            level_depth: 10.0,
            obstacle_stride: 10,
            obstacle_spacing: 3.0,
            max_sample_attempts: 10_000,
            spawn: vec![
                SpawnRule::new("shark", 5.0, 10.0),
                SpawnRule::new("diver", 100.0, 120.0),
                SpawnRule::new("mermaid", 100.0, 120.0),
            ],
        }
    }
}

impl CaveConfig {
    pub fn from_toml_str(text: &str) -> CaveResult<Self> {
        let config: CaveConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> CaveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> CaveResult<()> {
        let fail = |msg: String| Err(CaveError::InvalidConfig(msg));

        if self.width < 2 || self.height < 2 {
            return fail(format!(
                "grid must be at least 2x2, got {}x{}",
                self.width, self.height
            ));
        }
        if self.fill_percent > 100 {
            return fail(format!("fill_percent {} exceeds 100", self.fill_percent));
        }
        if self.corridor_width == 0 {
            return fail("corridor_width must be at least 1".into());
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return fail(format!("cell_size {} must be positive", self.cell_size));
        }
        if !(self.growth_percent.is_finite() && self.growth_percent >= 0.0) {
            return fail(format!(
                "growth_percent {} must be non-negative",
                self.growth_percent
            ));
        }
        if !self.soil_depth.is_finite() || !self.water_depth.is_finite() {
            return fail("extrusion depths must be finite".into());
        }
        if self.obstacle_stride == 0 {
            return fail("obstacle_stride must be at least 1".into());
        }
        if self.max_sample_attempts == 0 {
            return fail("max_sample_attempts must be at least 1".into());
        }
        for rule in &self.spawn {
            let DistanceBand {
                min_percent,
                max_percent,
            } = rule.band;
            if !(min_percent >= 0.0 && min_percent <= max_percent) {
                return fail(format!(
                    "spawn '{}' has invalid band {min_percent}..{max_percent}",
                    rule.name
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CaveConfig, SpawnRule};
    use crate::error::CaveError;

    #[test]
    fn defaults_are_valid() {
        let config = CaveConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!((config.width, config.height), (192, 108));
        assert_eq!(config.spawn.len(), 3);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = CaveConfig::from_toml_str(
            r#"
            width = 64
            height = 48
            fill_percent = 50

            [[spawn]]
            name = "chest_guard"
            min_percent = 2.0
            max_percent = 4.0
            "#,
        )
        .unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.fill_percent, 50);
        assert_eq!(config.simulation_steps, 20);
        assert_eq!(config.spawn, vec![SpawnRule::new("chest_guard", 2.0, 4.0)]);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad = [
            CaveConfig {
                width: 1,
                ..CaveConfig::default()
            },
            CaveConfig {
                fill_percent: 101,
                ..CaveConfig::default()
            },
            CaveConfig {
                cell_size: 0.0,
                ..CaveConfig::default()
            },
            CaveConfig {
                obstacle_stride: 0,
                ..CaveConfig::default()
            },
            CaveConfig {
                spawn: vec![SpawnRule::new("x", 10.0, 5.0)],
                ..CaveConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(CaveError::InvalidConfig(_))));
        }
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = CaveConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, CaveError::ConfigParse(_)));
    }

    #[test]
    fn load_reads_and_validates_a_file() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("cavern_config_{}.toml", std::process::id()));
        std::fs::write(&good, "width = 80\nsimulation_steps = 6\n").unwrap();
        let config = CaveConfig::load(&good).unwrap();
        assert_eq!((config.width, config.height), (80, 108));
        assert_eq!(config.simulation_steps, 6);

        std::fs::write(&good, "corridor_width = 0\n").unwrap();
        let err = CaveConfig::load(&good).unwrap_err();
        assert!(matches!(err, CaveError::InvalidConfig(_)));
        std::fs::remove_file(&good).unwrap();

        let missing = dir.join("cavern_config_missing_file.toml");
        assert!(matches!(CaveConfig::load(missing), Err(CaveError::Io(_))));
    }
}
