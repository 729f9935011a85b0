//! Raw sample to physical units: compensation, smoothing and altitude.

use super::calibration::{Calibration, RawSample};
use super::filter::LimitingAverageFilter;

/// Sea-level reference pressure used for altitude (hPa).
pub const SEA_LEVEL_HPA: f32 = 1015.7;

/// Fixed air temperature used for altitude (°C).
///
/// Using the measured temperature makes the altitude jump whenever the
/// sensor is touched or breathed on, so a constant is used instead.
pub const REFERENCE_TEMP_C: f32 = 25.0;

/// Barometric exponent 1 / 5.25588.
const PRESSURE_EXPONENT: f64 = 0.190_263_095_8;

/// Temperature lapse rate (K/m).
const LAPSE_RATE: f32 = 0.0065;

/// One compensated measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Filtered pressure in hPa.
    pub pressure_hpa: f32,
    /// Temperature in °C.
    pub temperature_c: f32,
    /// Altitude in meters, from the filtered pressure.
    pub altitude_m: f32,
}

/// Converts pressure (hPa) to altitude above sea level (m).
///
/// Returns 0 for non-positive pressure.
///
/// # Examples
///
/// ```
/// use rubik_i2c::devices::bmp280::pressure_to_altitude;
///
/// assert_eq!(pressure_to_altitude(1015.7), 0.0);
/// assert!(pressure_to_altitude(900.0) > 1000.0);
/// assert_eq!(pressure_to_altitude(0.0), 0.0);
/// ```
pub fn pressure_to_altitude(pressure_hpa: f32) -> f32 {
    if pressure_hpa <= 0.0 {
        return 0.0;
    }
    let ratio = f64::from(SEA_LEVEL_HPA / pressure_hpa);
    let kelvin = f64::from(REFERENCE_TEMP_C + 273.15);
    ((ratio.powf(PRESSURE_EXPONENT) - 1.0) * kelvin / f64::from(LAPSE_RATE)) as f32
}

/// Compensation state owned by one sensor handle.
///
/// Holds the calibration (immutable after construction) and the pressure
/// filter. Temperature is always compensated first since its `t_fine` feeds
/// the pressure formula.
#[derive(Clone, Debug)]
pub struct Pipeline {
    calibration: Calibration,
    filter: LimitingAverageFilter,
}

impl Pipeline {
    /// Creates a pipeline with the default filter.
    pub fn new(calibration: Calibration) -> Self {
        Self::with_filter(calibration, LimitingAverageFilter::default())
    }

    /// Creates a pipeline with a specific filter.
    pub fn with_filter(calibration: Calibration, filter: LimitingAverageFilter) -> Self {
        Self {
            calibration,
            filter,
        }
    }

    /// Calibration this pipeline was built with.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Pressure filter state.
    pub fn filter(&self) -> &LimitingAverageFilter {
        &self.filter
    }

    /// Runs one raw sample through compensation, filter and altitude.
    pub fn process(&mut self, raw: RawSample) -> Reading {
        let (centi_c, t_fine) = self.calibration.compensate_temperature(raw.temperature);
        let q24_8 = self.calibration.compensate_pressure(raw.pressure, t_fine);

        let temperature_c = (f64::from(centi_c) / 100.0) as f32;
        let pressure = (f64::from(q24_8) / 25600.0) as f32;
        let pressure_hpa = self.filter.apply(pressure);

        Reading {
            pressure_hpa,
            temperature_c,
            altitude_m: pressure_to_altitude(pressure_hpa),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasheet() -> Calibration {
        Calibration {
            dig_t1: 27504,
            dig_t2: 26435,
            dig_t3: -1000,
            dig_p1: 36477,
            dig_p2: -10685,
            dig_p3: 3024,
            dig_p4: 2855,
            dig_p5: 140,
            dig_p6: -7,
            dig_p7: 15500,
            dig_p8: -14600,
            dig_p9: 6000,
        }
    }

    const RAW: RawSample = RawSample {
        pressure: 415_148,
        temperature: 519_888,
    };

    #[test]
    fn altitude_non_positive_is_zero() {
        assert_eq!(pressure_to_altitude(0.0), 0.0);
        assert_eq!(pressure_to_altitude(-5.0), 0.0);
    }

    #[test]
    fn altitude_at_reference_is_zero() {
        assert_eq!(pressure_to_altitude(SEA_LEVEL_HPA), 0.0);
    }

    #[test]
    fn altitude_above_reference_pressure_is_negative() {
        assert!(pressure_to_altitude(1030.0) < 0.0);
    }

    #[test]
    fn altitude_datasheet_pressure() {
        // 1006.5325 hPa, about 79.2 m below the 1015.7 hPa reference
        let alt = pressure_to_altitude(1006.532_5);
        assert!((alt - 79.195).abs() < 0.01, "altitude {alt}");
    }

    #[test]
    fn process_datasheet_sample() {
        let mut pipeline = Pipeline::new(datasheet());
        let reading = pipeline.process(RAW);
        assert_eq!(reading.temperature_c, 25.08);
        assert_eq!(reading.pressure_hpa, (25_767_233f64 / 25600.0) as f32);
        assert_eq!(reading.altitude_m, pressure_to_altitude(reading.pressure_hpa));
    }

    #[test]
    fn zero_divisor_yields_zero_pressure_and_altitude() {
        let cal = Calibration {
            dig_p1: 0,
            ..datasheet()
        };
        let mut pipeline = Pipeline::new(cal);
        let reading = pipeline.process(RAW);
        assert_eq!(reading.pressure_hpa, 0.0);
        assert_eq!(reading.altitude_m, 0.0);
        assert_eq!(reading.temperature_c, 25.08);
    }

    #[test]
    fn filter_state_carries_across_samples() {
        let mut pipeline = Pipeline::new(datasheet());
        for _ in 0..5 {
            pipeline.process(RAW);
        }
        assert_eq!(pipeline.filter().cursor(), 0);
        assert!(pipeline.filter().buffer().iter().all(|&v| v > 1000.0));
    }
}
