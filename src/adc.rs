use esp_idf_hal::adc::ADC1;
use esp_idf_hal::cpu::Core;
use esp_idf_hal::gpio::ADCPin;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::{configMAX_PRIORITIES, EspError, ESP_ERR_INVALID_STATE, ESP_ERR_TIMEOUT};
use esp_idf_hal::task::thread::ThreadSpawnConfiguration;
use esp_idf_svc::hal::adc::{AdcContConfig, AdcContDriver, AdcMeasurement, Attenuated};

use std::thread;

use crate::clock::InstantClock;
use crate::config::SamplerConfig;
use crate::report::ChannelSink;
use crate::sampler::AcquisitionLoop;
use crate::source::{AcquisitionSource, Poll};

// The spinning sampler starves everything else on its core
#[cfg(not(any(esp32, esp32s3)))]
compile_error!("adc_throughput needs a dual core chip (esp32 / esp32s3)");

const TASK_NAME: &[u8] = b"adc_sampler\0";

/// Continuous mode ADC1 driver as an acquisition source
pub struct AdcSource<'a> {
    adc: AdcContDriver<'a>,
}

impl<'a> AdcSource<'a> {
    pub fn new<P>(
        adc: ADC1,
        adc_pin: impl Peripheral<P = P> + 'a,
        config: &SamplerConfig,
    ) -> anyhow::Result<Self>
    where
        P: ADCPin<Adc = ADC1>,
    {
        let adc_config = AdcContConfig {
            sample_freq: esp_idf_hal::units::Hertz(config.sample_freq_hz),
            frame_measurements: config.batch_capacity,
            frames_count: config.frames_count,
        };

        // 0dB attenuation
        let adc_pin = Attenuated::none(adc_pin);
        let adc = AdcContDriver::new(adc, &adc_config, adc_pin)?;
        log::info!(
            "=== ADC Samples - Sample Rate: {} / Samples: {} / ADC Config: {adc_config:?}",
            config.sample_freq_hz,
            config.sample_count
        );
        Ok(Self { adc })
    }
}

impl AcquisitionSource for AdcSource<'_> {
    type Sample = AdcMeasurement;
    type Error = EspError;

    fn start(&mut self) -> Result<(), EspError> {
        self.adc.start()
    }

    fn poll(&mut self, batch: &mut [AdcMeasurement]) -> Result<Poll, EspError> {
        // Zero timeout - never blocks
        match self.adc.read(batch, 0) {
            Ok(0) => Ok(Poll::Empty),
            Ok(n) => Ok(Poll::Ready(n)),
            // Nothing buffered / driver already stopped
            Err(e) if e.code() == ESP_ERR_TIMEOUT || e.code() == ESP_ERR_INVALID_STATE => {
                Ok(Poll::Empty)
            }
            Err(e) => Err(e),
        }
    }

    fn stop(&mut self) -> Result<(), EspError> {
        self.adc.stop()
    }
}

/// Spawn the sampler on its own thread, pinned to core 1 at max priority.
/// The thread only finishes if the ADC fails to start.
pub fn sampler_task<P>(
    adc: ADC1,
    adc_pin: impl Peripheral<P = P> + Send + 'static,
    config: SamplerConfig,
    sink: ChannelSink,
) -> anyhow::Result<thread::JoinHandle<anyhow::Result<()>>>
where
    P: ADCPin<Adc = ADC1>,
{
    ThreadSpawnConfiguration {
        name: Some(TASK_NAME),
        stack_size: config.stack_size,
        priority: (configMAX_PRIORITIES - 1) as u8,
        pin_to_core: Some(Core::Core1),
        ..Default::default()
    }
    .set()?;

    let handle = thread::Builder::new()
        .stack_size(config.stack_size)
        .spawn(move || {
            let source = AdcSource::new(adc, adc_pin, &config)?;
            let mut sampler = AcquisitionLoop::new(source, InstantClock::new(), sink, &config);
            let Err(e) = sampler.run();
            log::error!("adc_sampler :: {e}");
            Err(e.into())
        })
        .map_err(|e| anyhow::anyhow!("sampler_task: {e}"));

    // Later threads get the default configuration
    ThreadSpawnConfiguration::default().set()?;
    handle
}
