use chrono::{DateTime, Duration, FixedOffset};
use solar_positioning::spa;
use solar_positioning::types::RefractionCorrection;

use super::error::SolarError;
use super::site::Site;

/// Everything the sun-position model needs for one instant.
#[derive(Debug, Clone, Copy)]
pub struct SolarQuery {
    pub time: DateTime<FixedOffset>,
    /// UT1 - UTC, seconds.
    pub delta_ut1: f64,
    /// TT - UT1, seconds.
    pub delta_t: f64,
    pub site: Site,
    pub pressure_mb: f64,
    pub temperature_c: f64,
    /// Tilt of the collector surface from horizontal, degrees.
    pub slope_deg: f64,
    /// Surface azimuth rotation, degrees from south.
    pub azimuth_rotation_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarAngles {
    /// Degrees clockwise from north.
    pub azimuth_deg: f64,
    /// Topocentric zenith angle, refraction corrected.
    pub zenith_deg: f64,
    /// Angle between the sun and the surface normal.
    pub incidence_deg: f64,
}

pub trait SolarEphemeris {
    fn solar_angles(&self, query: &SolarQuery) -> Result<SolarAngles, SolarError>;
}

/// NREL solar position algorithm, refraction corrected for the local
/// pressure and temperature.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaEphemeris;

impl SolarEphemeris for SpaEphemeris {
    fn solar_angles(&self, query: &SolarQuery) -> Result<SolarAngles, SolarError> {
        validate(query)?;

        let refraction = RefractionCorrection::new(query.pressure_mb, query.temperature_c)
            .map_err(|e| SolarError::Position(e.to_string()))?;
        let ut1 = query.time + Duration::milliseconds((query.delta_ut1 * 1000.0).round() as i64);

        let position = spa::solar_position(
            ut1,
            query.site.latitude_deg,
            query.site.longitude_deg,
            query.site.altitude_m,
            query.delta_t,
            Some(refraction),
        )
        .map_err(|e| SolarError::Position(e.to_string()))?;

        let azimuth_deg = position.azimuth();
        let zenith_deg = position.zenith_angle();

        Ok(SolarAngles {
            azimuth_deg,
            zenith_deg,
            incidence_deg: incidence_deg(
                zenith_deg,
                azimuth_deg,
                query.slope_deg,
                query.azimuth_rotation_deg,
            ),
        })
    }
}

fn validate(query: &SolarQuery) -> Result<(), SolarError> {
    let checks = [
        ("latitude", query.site.latitude_deg, -90.0, 90.0),
        ("longitude", query.site.longitude_deg, -180.0, 180.0),
        ("pressure", query.pressure_mb, 1.0, 5000.0),
        ("temperature", query.temperature_c, -273.0, 6000.0),
        ("delta_ut1", query.delta_ut1, -1.0, 1.0),
        ("delta_t", query.delta_t, -8000.0, 8000.0),
        ("slope", query.slope_deg, -360.0, 360.0),
        ("azimuth rotation", query.azimuth_rotation_deg, -360.0, 360.0),
    ];
    for (field, value, min, max) in checks {
        if !(min..=max).contains(&value) {
            return Err(SolarError::InvalidInput { field, value });
        }
    }
    Ok(())
}

/// Angle between the sun and the normal of a surface tilted by `slope_deg`
/// and rotated `rotation_deg` from south.
fn incidence_deg(zenith_deg: f64, azimuth_deg: f64, slope_deg: f64, rotation_deg: f64) -> f64 {
    let (zenith, slope) = (zenith_deg.to_radians(), slope_deg.to_radians());
    let relative = (azimuth_deg - 180.0 - rotation_deg).to_radians();
    (zenith.cos() * slope.cos() + slope.sin() * zenith.sin() * relative.cos())
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn query(utc: DateTime<Utc>) -> SolarQuery {
        SolarQuery {
            time: utc.with_timezone(&FixedOffset::west_opt(4 * 3600).unwrap()),
            delta_ut1: 0.0,
            delta_t: 67.0,
            site: Site::default(),
            pressure_mb: 1013.25,
            temperature_c: 15.0,
            slope_deg: 0.0,
            azimuth_rotation_deg: 0.0,
        }
    }

    #[test]
    fn solstice_noon_in_toronto() {
        let noon = Utc.with_ymd_and_hms(2024, 6, 21, 17, 20, 0).unwrap();
        let angles = SpaEphemeris.solar_angles(&query(noon)).unwrap();

        let elevation = 90.0 - angles.zenith_deg;
        assert!((elevation - 69.8).abs() < 0.3, "elevation {elevation}");
        assert!((angles.azimuth_deg - 180.0).abs() < 2.0, "azimuth {}", angles.azimuth_deg);
    }

    #[test]
    fn morning_sun_is_in_the_east() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 20, 13, 0, 0).unwrap();
        let angles = SpaEphemeris.solar_angles(&query(morning)).unwrap();
        assert!(angles.azimuth_deg > 90.0 && angles.azimuth_deg < 180.0);
        assert!(angles.zenith_deg < 90.0);
    }

    #[test]
    fn midnight_sun_is_below_horizon() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 21, 5, 20, 0).unwrap();
        let angles = SpaEphemeris.solar_angles(&query(midnight)).unwrap();
        assert!(angles.zenith_deg > 90.0);
    }

    #[test]
    fn flat_surface_incidence_is_zenith() {
        let t = Utc.with_ymd_and_hms(2024, 9, 1, 15, 0, 0).unwrap();
        let angles = SpaEphemeris.solar_angles(&query(t)).unwrap();
        assert!((angles.incidence_deg - angles.zenith_deg).abs() < 1e-9);
    }

    #[test]
    fn tilted_surface_facing_the_sun_sees_it_head_on() {
        // sun 30° from zenith due south, surface tilted 30° toward south
        assert!(incidence_deg(30.0, 180.0, 30.0, 0.0).abs() < 1e-6);
        // same sun, surface rotated to face north
        assert!((incidence_deg(30.0, 180.0, 30.0, 180.0) - 60.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_impossible_inputs() {
        let t = Utc.with_ymd_and_hms(2024, 9, 1, 15, 0, 0).unwrap();
        let mut q = query(t);
        q.site.latitude_deg = 123.0;
        assert!(matches!(
            SpaEphemeris.solar_angles(&q),
            Err(SolarError::InvalidInput { field: "latitude", .. })
        ));

        let mut q = query(t);
        q.pressure_mb = f64::NAN;
        assert!(SpaEphemeris.solar_angles(&q).is_err());
    }
}
