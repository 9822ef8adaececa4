use esp_idf_svc::nvs::{EspDefaultNvs, EspNvs, EspNvsPartition, NvsDefault};

use crate::config::SamplerConfig;

const NV_STORE_MAX: usize = 2048; // Maximum size for serialised data
pub const CONFIG_KEY: &str = "SAMPLER";

/// Read-only view of an NVS namespace holding JSON values
pub struct NVStore {
    nvs: EspNvs<NvsDefault>,
}

impl NVStore {
    pub fn new(nvs_partition: EspNvsPartition<NvsDefault>, namespace: &str) -> anyhow::Result<Self> {
        Ok(Self {
            nvs: EspDefaultNvs::new(nvs_partition, namespace, true)?,
        })
    }

    pub fn get_raw<'b>(&self, key: &str, buf: &'b mut [u8]) -> anyhow::Result<Option<&'b [u8]>> {
        Ok(self.nvs.get_raw(key, buf)?)
    }

    /// Stored override if present and valid, otherwise the compiled defaults
    pub fn sampler_config(&self) -> SamplerConfig {
        let mut buf = [0_u8; NV_STORE_MAX];
        match self.get_raw(CONFIG_KEY, &mut buf) {
            Ok(Some(data)) => match SamplerConfig::from_json(data) {
                Ok(config) => {
                    log::info!("Using NVS config: {config:?}");
                    config
                }
                Err(e) => {
                    log::warn!("Invalid NVS config ({e}) - using defaults");
                    SamplerConfig::default()
                }
            },
            Ok(None) => SamplerConfig::default(),
            Err(e) => {
                log::warn!("Error reading NVS config ({e}) - using defaults");
                SamplerConfig::default()
            }
        }
    }
}
