/// Coordinate types and WGS 84 geodetic conversions.
///
/// ECEF is the canonical representation: every [`Coordinates`] variant converts to an [`Ecef`]
/// through [`Coordinates::to_ecef`]. The ECEF to LLA direction uses a closed-form, single step
/// auxiliary-angle formula and reproduces its numeric behavior as-is, including not-a-number
/// output for degenerate points.
use tracing::trace;

use crate::{
    utm::{UtmCoord, UtmProjector},
    Error, GdfResult,
};

/// WGS 84 ellipsoid parameters.
pub mod wgs84 {
    /// Semi-major axis (m)
    pub const A: f64 = 6378137.0;
    /// Flattening
    pub const F: f64 = 1.0 / 298.257223563;
    /// Semi-minor axis (m)
    pub const B: f64 = 6356752.314245179;
    /// First eccentricity
    pub const ECC: f64 = 0.081819218048345;
    /// First eccentricity squared (2f - f^2)
    pub const E2: f64 = 6.6943799901377997e-3;
}

//  _____
// |_   _|   _ _ __   ___  ___
//   | || | | | '_ \ / _ \/ __|
//   | || |_| | |_) |  __/\__ \
//   |_| \__, | .__/ \___||___/
//       |___/|_|

/// Earth-Centered-Earth-Fixed position in meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Validated geodetic latitude / longitude in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Geodetic position derived from ECEF. Fields may be NaN when the source point is degenerate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lla {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

/// Any supported input coordinate, converted to ECEF by a single entry point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Coordinates {
    Ecef(Ecef),
    LatLon(LatLon),
    Utm(UtmCoord),
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> GdfResult<Self> {
        Self::validate_lat(lat)?;
        Self::validate_lon(lon)?;
        Ok(Self { lat, lon })
    }

    fn validate_lat(lat: f64) -> GdfResult<()> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoord(format!("latitude {lat}")));
        }
        Ok(())
    }

    fn validate_lon(lon: f64) -> GdfResult<()> {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoord(format!("longitude {lon}")));
        }
        Ok(())
    }
}

impl Lla {
    pub fn is_defined(&self) -> bool {
        !(self.lat.is_nan() || self.lon.is_nan())
    }

    /// Latitude / longitude, or [`Error::UndefinedGeodeticResult`] if either is NaN.
    pub fn lat_lon(&self) -> GdfResult<LatLon> {
        if !self.is_defined() {
            return Err(Error::UndefinedGeodeticResult);
        }
        Ok(LatLon {
            lat: self.lat,
            lon: self.lon,
        })
    }
}

impl Ecef {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn lla(&self) -> Lla {
        ecef_to_lla(self)
    }

    /// Project onto the UTM grid. Undefined geodetic input is reported as
    /// [`Error::ProjectionUnavailable`].
    pub fn utm<P: UtmProjector>(&self, projector: &P) -> GdfResult<UtmCoord> {
        let lla = self.lla();
        if !lla.is_defined() {
            return Err(Error::ProjectionUnavailable(format!(
                "undefined latitude/longitude for {self:?}"
            )));
        }
        projector.project(lla.lat, lla.lon)
    }
}

impl Coordinates {
    pub fn to_ecef<P: UtmProjector>(&self, projector: &P) -> GdfResult<Ecef> {
        match self {
            Coordinates::Ecef(ecef) => Ok(*ecef),
            Coordinates::LatLon(ll) => Ok(lla_to_ecef(ll.lat, ll.lon, 0.0)),
            Coordinates::Utm(utm) => {
                let ll = projector.unproject(utm)?;
                trace!("utm {} -> {:?}", utm.zone_label(), ll);
                Ok(lla_to_ecef(ll.lat, ll.lon, 0.0))
            }
        }
    }
}

//   ____                              _
//  / ___|___  _ ____   _____ _ __ ___(_) ___  _ __
// | |   / _ \| '_ \ \ / / _ \ '__/ __| |/ _ \| '_ \
// | |__| (_) | | | \ V /  __/ |  \__ \ | (_) | | | |
//  \____\___/|_| |_|\_/ \___|_|  |___/_|\___/|_| |_|

/// Geodetic (degrees, meters) to ECEF.
pub fn lla_to_ecef(lat_deg: f64, lon_deg: f64, alt: f64) -> Ecef {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let chi = (1.0 - wgs84::E2 * lat.sin().powi(2)).sqrt();
    Ecef {
        x: (wgs84::A / chi + alt) * lat.cos() * lon.cos(),
        y: (wgs84::A / chi + alt) * lat.cos() * lon.sin(),
        z: (wgs84::A * (1.0 - wgs84::E2) / chi + alt) * lat.sin(),
    }
}

/// ECEF to geodetic (degrees, meters). Not iterative.
pub fn ecef_to_lla(ecef: &Ecef) -> Lla {
    let lat = latitude(ecef);
    Lla {
        lat,
        lon: ecef.y.atan2(ecef.x).to_degrees(),
        alt: altitude(ecef, lat),
    }
}

fn latitude(ecef: &Ecef) -> f64 {
    use wgs84::{A, B, ECC};
    let Ecef { x, y, z } = *ecef;
    let p = (x * x + y * y).sqrt();
    // 0/0 at the origin yields NaN here
    let theta = (z * A / (p * B)).atan();
    let sint3 = theta.sin().powi(3);
    let cost3 = theta.cos().powi(3);

    let num = z + ((A * A - B * B) / B) * sint3;
    let den = p - ECC * ECC * A * cost3;
    (num / den).atan().to_degrees()
}

fn altitude(ecef: &Ecef, lat_deg: f64) -> f64 {
    use wgs84::{A, ECC};
    let lat = lat_deg.to_radians();
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let ntemp = 1.0 - (ECC * lat.sin()).powi(2);
    let n = if ntemp < 0.0 { A } else { A / ntemp.sqrt() };
    p / lat.cos() - n
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{lazy_init_tracing, utm::TransverseMercator};

    const POINTS: [(f64, f64, f64); 6] = [
        (40.7467136, -118.8088034, 1250.0),
        (45.6, -122.7, 101.0),
        (-33.9249, 18.4241, 15.0),
        (0.5, 0.5, 0.0),
        (62.1, 150.3, 800.0),
        (-71.0, -60.0, 2000.0),
    ];

    #[test]
    fn test_lla_ecef_round_trip() {
        lazy_init_tracing();
        for (lat, lon, alt) in POINTS {
            let lla = lla_to_ecef(lat, lon, alt).lla();
            assert!((lla.lat - lat).abs() < 1e-6, "lat {lat} -> {}", lla.lat);
            assert!((lla.lon - lon).abs() < 1e-6, "lon {lon} -> {}", lla.lon);
            assert!((lla.alt - alt).abs() < 5e-2, "alt {alt} -> {}", lla.alt);
        }
    }

    #[test]
    fn test_equator_prime_meridian() {
        let ecef = lla_to_ecef(0.0, 0.0, 0.0);
        assert!((ecef.x - wgs84::A).abs() < 1e-6);
        assert!(ecef.y.abs() < 1e-6);
        assert!(ecef.z.abs() < 1e-6);
        let lla = ecef.lla();
        assert!(lla.alt.abs() < 1e-6);
    }

    #[test]
    fn test_origin_is_undefined() {
        lazy_init_tracing();
        let lla = Ecef::new(0.0, 0.0, 0.0).lla();
        assert!(lla.lat.is_nan());
        assert!(lla.alt.is_nan());
        assert!(!lla.is_defined());
        assert!(matches!(lla.lat_lon(), Err(Error::UndefinedGeodeticResult)));

        let utm = Ecef::new(0.0, 0.0, 0.0).utm(&TransverseMercator::default());
        assert!(matches!(utm, Err(Error::ProjectionUnavailable(_))));
    }

    #[test]
    fn test_lat_lon_validation() {
        assert!(LatLon::new(45.0, -122.0).is_ok());
        assert!(matches!(
            LatLon::new(91.0, 0.0),
            Err(Error::InvalidCoord(_))
        ));
        assert!(matches!(
            LatLon::new(0.0, -180.5),
            Err(Error::InvalidCoord(_))
        ));
    }

    #[test]
    fn test_coordinates_to_ecef() {
        lazy_init_tracing();
        let tm = TransverseMercator::default();
        let ll = LatLon::new(45.6, -122.7).unwrap();
        let from_ll = Coordinates::LatLon(ll).to_ecef(&tm).unwrap();
        let from_ecef = Coordinates::Ecef(from_ll).to_ecef(&tm).unwrap();
        assert_eq!(from_ll, from_ecef);

        let utm = tm.project(ll.lat, ll.lon).unwrap();
        let from_utm = Coordinates::Utm(utm).to_ecef(&tm).unwrap();
        // sub-meter agreement through the grid
        let d = ((from_utm.x - from_ll.x).powi(2)
            + (from_utm.y - from_ll.y).powi(2)
            + (from_utm.z - from_ll.z).powi(2))
        .sqrt();
        assert!(d < 0.01, "distance {d}");
    }
}
