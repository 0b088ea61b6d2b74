use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::ephemeris::{SolarEphemeris, SolarQuery};
use super::error::SolarError;
use super::site::Site;
use crate::gps::Fix;
use crate::hardware::WeatherReadings;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolarSettings {
    /// Used whenever the GPS has no usable fix.
    pub default_site: Site,
    pub timezone_offset_hours: f64,
    pub delta_ut1: f64,
    pub delta_t: f64,
    pub slope_deg: f64,
    pub azimuth_rotation_deg: f64,
}

impl Default for SolarSettings {
    fn default() -> Self {
        Self {
            default_site: Site::default(),
            timezone_offset_hours: -4.0,
            delta_ut1: 0.0,
            delta_t: 67.0,
            slope_deg: 0.0,
            azimuth_rotation_deg: 0.0,
        }
    }
}

impl SolarSettings {
    pub fn timezone(&self) -> Result<FixedOffset, SolarError> {
        let seconds = self.timezone_offset_hours * 3600.0;
        if !seconds.is_finite() {
            return Err(SolarError::InvalidTimezone(self.timezone_offset_hours));
        }
        FixedOffset::east_opt(seconds.round() as i32)
            .ok_or(SolarError::InvalidTimezone(self.timezone_offset_hours))
    }
}

/// Open-loop pointing target for one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetPosition {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    /// Location the angles were computed for.
    pub site: Site,
    /// False when the default site stood in for a missing fix.
    pub from_fix: bool,
    pub computed_at: DateTime<FixedOffset>,
}

pub struct SolarTargetCalculator<E> {
    ephemeris: E,
    settings: SolarSettings,
}

impl<E: SolarEphemeris> SolarTargetCalculator<E> {
    pub fn new(ephemeris: E, settings: SolarSettings) -> Self {
        Self {
            ephemeris,
            settings,
        }
    }

    pub fn settings(&self) -> &SolarSettings {
        &self.settings
    }

    pub fn target(
        &self,
        now: DateTime<Utc>,
        fix: &Fix,
        weather: &WeatherReadings,
    ) -> Result<TargetPosition, SolarError> {
        let (site, from_fix) = if fix.is_usable() && !fix.is_sentinel() {
            (Site::from_fix(fix), true)
        } else {
            log::warn!(
                "No usable GPS fix, using default site {:.5}, {:.5}",
                self.settings.default_site.latitude_deg,
                self.settings.default_site.longitude_deg
            );
            (self.settings.default_site, false)
        };

        let time = now.with_timezone(&self.settings.timezone()?);
        let angles = self.ephemeris.solar_angles(&SolarQuery {
            time,
            delta_ut1: self.settings.delta_ut1,
            delta_t: self.settings.delta_t,
            site,
            pressure_mb: weather.pressure_mb,
            temperature_c: weather.temperature_c,
            slope_deg: self.settings.slope_deg,
            azimuth_rotation_deg: self.settings.azimuth_rotation_deg,
        })?;

        let target = TargetPosition {
            azimuth_deg: angles.azimuth_deg,
            elevation_deg: 90.0 - angles.incidence_deg,
            site,
            from_fix,
            computed_at: time,
        };
        log::debug!(
            "Solar target az {:.2} el {:.2} (from fix: {})",
            target.azimuth_deg,
            target.elevation_deg,
            target.from_fix
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::{Hemisphere, MotionSentence, PositionSentence};
    use crate::mocks::FixedEphemeris;
    use chrono::TimeZone;

    fn usable_fix() -> Fix {
        let mut fix = Fix::default();
        fix.apply_position(&PositionSentence {
            utc: None,
            latitude: 4124.8963,
            lat_hemisphere: Hemisphere::North,
            longitude: 8151.6838,
            lon_hemisphere: Hemisphere::West,
            quality: 1,
            satellites: 8,
            altitude_m: 280.2,
        });
        fix.apply_motion(&MotionSentence {
            speed_knots: 0.0,
            course_deg: 0.0,
            date: None,
        });
        fix
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 21, 17, 20, 0).unwrap()
    }

    #[test]
    fn elevation_is_complement_of_incidence() {
        let ephemeris = FixedEphemeris::new(135.0, 30.0);
        let calculator = SolarTargetCalculator::new(ephemeris, SolarSettings::default());
        let target = calculator
            .target(now(), &usable_fix(), &WeatherReadings::default())
            .unwrap();

        assert_eq!(target.azimuth_deg, 135.0);
        assert_eq!(target.elevation_deg, 60.0);
        assert!(target.from_fix);
        assert!((target.site.latitude_deg - 41.414938).abs() < 1e-6);
    }

    #[test]
    fn falls_back_to_default_site_without_fix() {
        let ephemeris = FixedEphemeris::new(180.0, 20.0);
        let settings = SolarSettings::default();
        let calculator = SolarTargetCalculator::new(ephemeris, settings);

        let mut position_only = usable_fix();
        position_only.completeness = Default::default();
        for fix in [Fix::default(), position_only] {
            let target = calculator
                .target(now(), &fix, &WeatherReadings::default())
                .unwrap();
            assert!(!target.from_fix);
            assert_eq!(target.site, settings.default_site);
        }
    }

    #[test]
    fn passes_atmosphere_and_constants_to_ephemeris() {
        let ephemeris = FixedEphemeris::new(180.0, 20.0);
        let calculator = SolarTargetCalculator::new(ephemeris.clone(), SolarSettings::default());
        let weather = WeatherReadings {
            temperature_c: 25.0,
            humidity_pct: 40.0,
            pressure_mb: 990.0,
            light_lux: 1000.0,
        };
        let target = calculator.target(now(), &Fix::default(), &weather).unwrap();

        let query = ephemeris.last_query().unwrap();
        assert_eq!(query.pressure_mb, 990.0);
        assert_eq!(query.temperature_c, 25.0);
        assert_eq!(query.delta_t, 67.0);
        assert_eq!(query.time, now());
        assert_eq!(target.computed_at.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn rejects_out_of_range_timezone() {
        let settings = SolarSettings {
            timezone_offset_hours: 30.0,
            ..SolarSettings::default()
        };
        let calculator = SolarTargetCalculator::new(FixedEphemeris::new(0.0, 0.0), settings);
        assert!(matches!(
            calculator.target(now(), &Fix::default(), &WeatherReadings::default()),
            Err(SolarError::InvalidTimezone(_))
        ));
    }
}
