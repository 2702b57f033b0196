use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::Deserialize;

use super::parse_config;
use crate::{Script, ScriptApi, ScriptLoadError, ScriptResult};

const BANDAGE: u16 = 0x0E21;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BandageRotationConfig {
    /// Heal when hits fall below this share of max hits
    pub threshold_percent: u8,
    /// Pause between checks
    pub poll_ms: u64,
    /// How long a bandage takes to apply
    pub heal_ms: u64,
    pub target_timeout_ms: u64,
    pub bandage_graphic: u16,
}

impl Default for BandageRotationConfig {
    fn default() -> Self {
        Self {
            threshold_percent: 80,
            poll_ms: 500,
            heal_ms: 5_000,
            target_timeout_ms: 2_000,
            bandage_graphic: BANDAGE,
        }
    }
}

/// Keeps the player bandaged while hits are low
pub struct BandageRotationScript {
    config: BandageRotationConfig,
}

impl BandageRotationScript {
    pub fn new(config: Option<&toml::Value>) -> Result<Self, ScriptLoadError> {
        let config: BandageRotationConfig = parse_config("bandage_rotation", config)?;
        if config.threshold_percent > 100 {
            return Err(ScriptLoadError::InvalidConfig {
                script_id: "bandage_rotation".to_string(),
                message: format!("threshold_percent {} is above 100", config.threshold_percent),
            });
        }
        Ok(Self { config })
    }
}

impl Default for BandageRotationScript {
    fn default() -> Self {
        Self {
            config: BandageRotationConfig::default(),
        }
    }
}

fn needs_healing(api: &ScriptApi, threshold_percent: u8) -> bool {
    let Some(mobile) = api.player().entity().and_then(|e| e.as_mobile().cloned()) else {
        return false;
    };
    if mobile.flags.dead || mobile.max_hits == 0 {
        return false;
    }
    u32::from(mobile.hits) * 100 < u32::from(mobile.max_hits) * u32::from(threshold_percent)
}

impl Script for BandageRotationScript {
    fn id(&self) -> &'static str {
        "bandage_rotation"
    }

    fn name(&self) -> &'static str {
        "Bandage Rotation"
    }

    fn description(&self) -> &'static str {
        "Applies bandages to the player whenever hits drop below a threshold"
    }

    fn start(
        &self,
        api: ScriptApi,
    ) -> Result<LocalBoxFuture<'static, ScriptResult>, ScriptLoadError> {
        let config = self.config.clone();
        Ok(async move {
            loop {
                if !needs_healing(&api, config.threshold_percent) {
                    api.sleep(config.poll_ms).await;
                    continue;
                }

                if !api.player().use_type(config.bandage_graphic, None) {
                    api.log("Out of bandages");
                    return api.exit();
                }

                if api
                    .target()
                    .wait_target(Some(config.target_timeout_ms))
                    .await
                {
                    api.target().set_target_to_self();
                    api.sleep(config.heal_ms).await;
                } else {
                    api.log("No target cursor for the bandage");
                }
            }
        }
        .boxed_local())
    }
}
