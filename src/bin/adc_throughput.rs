#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    device::main()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("adc_throughput needs an ESP-IDF target (ADC1 in continuous mode)")
}

#[cfg(target_os = "espidf")]
mod device {
    use esp_idf_hal::cpu::Core;
    use esp_idf_hal::task::watchdog::{TWDTConfig, TWDTDriver};
    use esp_idf_svc::hal::prelude::*;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use std::sync::mpsc;
    use std::time::Duration;

    use adc_throughput::adc;
    use adc_throughput::nvs::NVStore;
    use adc_throughput::{ChannelSink, WindowReport};

    const NVS_NAMESPACE: &str = "ADC_TPUT";
    const WATCHDOG_TIMEOUT: u64 = 10;
    const IDLE_DELAY: Duration = Duration::from_millis(1000);

    pub fn main() -> anyhow::Result<()> {
        // It is necessary to call this function once. Otherwise some patches to the runtime
        // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
        esp_idf_svc::sys::link_patches();

        // Bind the log crate to the ESP Logging facilities
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!(
            "Starting... [{} {}@{} {}]",
            env!("BUILD_TS"),
            env!("BUILD_BRANCH"),
            env!("BUILD_HASH"),
            env!("BUILD_PROFILE")
        );

        // Initialise peripherals
        let peripherals = Peripherals::take()?;
        let nvs_default_partition = EspDefaultNvsPartition::take()?;

        let config = NVStore::new(nvs_default_partition, NVS_NAMESPACE)?.sampler_config();
        log::info!(
            "Sampler: {} samples @ {}Hz (expected {:.6}s)",
            config.sample_count,
            config.sample_freq_hz,
            config.expected_seconds()
        );

        // Hardware Watchdog - core 1 belongs to the sampler so only watch core 0
        let twdt_config = TWDTConfig {
            duration: Duration::from_secs(WATCHDOG_TIMEOUT),
            panic_on_trigger: true,
            subscribed_idle_tasks: enumset::enum_set!(Core::Core0),
        };
        let mut twdt_driver = TWDTDriver::new(peripherals.twdt, &twdt_config)?;

        // ADC1 channel 0
        #[cfg(esp32)]
        let adc_pin = peripherals.pins.gpio36;
        #[cfg(esp32s3)]
        let adc_pin = peripherals.pins.gpio1;

        // Report Channel
        let (report_tx, report_rx) = mpsc::channel::<WindowReport>();

        let sampler_task =
            adc::sampler_task(peripherals.adc1, adc_pin, config, ChannelSink(report_tx))?;

        // Dont configure watchdog until we have setup background tasks
        let mut watchdog = twdt_driver.watch_current_task()?;

        loop {
            // Sampler only exits if the ADC could not be started
            if sampler_task.is_finished() {
                match sampler_task.join() {
                    Ok(Err(e)) => log::error!("Sampler Failed: {e}"),
                    Ok(Ok(())) => log::error!("Sampler Exited"),
                    Err(_) => log::error!("Sampler Panicked"),
                }
                log::error!("Restarting");
                esp_idf_hal::reset::restart();
            }
            match report_rx.recv_timeout(IDLE_DELAY) {
                Ok(report) => {
                    println!("{report}");
                    log::debug!(
                        "Achieved {:.1}Hz ({} samples, {} poll errors)",
                        report.achieved_hz(),
                        report.collected,
                        report.poll_errors
                    );
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(e) => log::error!("ERROR :: report_rx :: {e:?}"),
            }

            // Update watchdog
            watchdog.feed()?
        }
    }
}
