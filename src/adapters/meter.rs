//! ADC-backed energy meter.
//!
//! The charger's power monitor outputs a voltage proportional to the
//! power drawn; one oneshot conversion per sample period is taken as the
//! energy delivered in that period.  On non-espidf targets the meter
//! replays a fixed delta.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::app::ports::EnergyMeter;

/// Full-scale reading of the 12-bit converter.
pub const ADC_FULL_SCALE: u16 = 4095;

/// Convert a raw reading to an energy delta, `full_scale` at 4095.
pub fn scale_reading(raw: u16, full_scale: f32) -> f32 {
    f32::from(raw.min(ADC_FULL_SCALE)) * full_scale / f32::from(ADC_FULL_SCALE)
}

pub struct AdcMeter {
    /// Energy per sample at full-scale input.
    full_scale: f32,
    #[cfg(target_os = "espidf")]
    unit: adc_oneshot_unit_handle_t,
    #[cfg(target_os = "espidf")]
    channel: adc_channel_t,
}

#[cfg(target_os = "espidf")]
impl AdcMeter {
    /// Claim ADC1 and configure `channel`.
    pub fn new(channel: u32, full_scale: f32) -> Result<Self, i32> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut unit: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: the handle is written once here and owned by the meter.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut unit) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        // SAFETY: `unit` was just created and is not shared.
        let ret = unsafe { adc_oneshot_config_channel(unit, channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }
        info!("METER: ADC1 channel {} ready", channel);
        Ok(Self {
            full_scale,
            unit,
            channel,
        })
    }

    fn read_raw(&mut self) -> u16 {
        let mut raw: i32 = 0;
        // SAFETY: the unit handle lives as long as the meter; foreground only.
        let ret = unsafe { adc_oneshot_read(self.unit, self.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            log::warn!("METER: read failed ({})", ret);
            return 0;
        }
        raw.max(0) as u16
    }
}

#[cfg(not(target_os = "espidf"))]
impl AdcMeter {
    pub fn new(_channel: u32, full_scale: f32) -> Result<Self, i32> {
        log::info!("METER(sim): fixed delta {:.1}", full_scale / 2.0);
        Ok(Self { full_scale })
    }

    fn read_raw(&mut self) -> u16 {
        ADC_FULL_SCALE / 2 + 1
    }
}

impl EnergyMeter for AdcMeter {
    fn sample_energy(&mut self) -> f32 {
        scale_reading(self.read_raw(), self.full_scale)
    }
}
