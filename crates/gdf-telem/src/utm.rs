/// Universal Transverse Mercator grid projection.
///
/// The projection is an outer collaborator of the decoder: the rest of the crate only talks to
/// the [`UtmProjector`] trait, and any failure is reported as [`Error::ProjectionUnavailable`].
/// [`TransverseMercator`] is the default implementation (USGS series expansion on WGS 84).
use std::fmt;

use crate::{
    coord::{wgs84, LatLon},
    Error, GdfResult,
};

/// Scale factor on the central meridian.
pub const K0: f64 = 0.9996;
pub const FALSE_EASTING: f64 = 500_000.0;
/// Added to northings in the southern hemisphere.
pub const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

const BAND_LETTERS: &[u8; 20] = b"CDEFGHJKLMNPQRSTUVWX";

/// A position on the UTM grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UtmCoord {
    pub easting: f64,
    pub northing: f64,
    /// 1..=60
    pub zone: u8,
    /// Latitude band letter, 'C'..='X'
    pub band: char,
}

impl UtmCoord {
    pub fn is_southern(&self) -> bool {
        self.band < 'N'
    }

    /// Zone number and band, e.g. `10T`.
    pub fn zone_label(&self) -> String {
        format!("{}{}", self.zone, self.band)
    }
}

impl fmt::Display for UtmCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2}E {:.2}N",
            self.zone_label(),
            self.easting,
            self.northing
        )
    }
}

/// Projects geodetic positions to and from the UTM grid.
pub trait UtmProjector {
    fn project(&self, lat: f64, lon: f64) -> GdfResult<UtmCoord>;
    fn unproject(&self, utm: &UtmCoord) -> GdfResult<LatLon>;
}

/// Transverse Mercator on the WGS 84 ellipsoid with standard UTM zoning.
#[derive(Debug, Clone, Copy)]
pub struct TransverseMercator {
    a: f64,
    e2: f64,
}

impl Default for TransverseMercator {
    fn default() -> Self {
        Self {
            a: wgs84::A,
            e2: wgs84::E2,
        }
    }
}

/// Zone number for a position, including the Norway and Svalbard exceptions.
pub fn zone_number(lat: f64, lon: f64) -> u8 {
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }
    if (72.0..84.0).contains(&lat) {
        match lon {
            l if (0.0..9.0).contains(&l) => return 31,
            l if (9.0..21.0).contains(&l) => return 33,
            l if (21.0..33.0).contains(&l) => return 35,
            l if (33.0..42.0).contains(&l) => return 37,
            _ => {}
        }
    }
    let zone = ((lon + 180.0) / 6.0).floor() as i32 + 1;
    zone.clamp(1, 60) as u8
}

/// Latitude band letter, `None` outside the UTM latitude range.
pub fn band_letter(lat: f64) -> Option<char> {
    if !(-80.0..=84.0).contains(&lat) {
        return None;
    }
    // band X spans 72..84
    let idx = (((lat + 80.0) / 8.0).floor() as usize).min(BAND_LETTERS.len() - 1);
    Some(char::from(BAND_LETTERS[idx]))
}

fn central_meridian(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

impl TransverseMercator {
    fn ep2(&self) -> f64 {
        self.e2 / (1.0 - self.e2)
    }

    /// Meridian arc length from the equator to `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }
}

impl UtmProjector for TransverseMercator {
    fn project(&self, lat: f64, lon: f64) -> GdfResult<UtmCoord> {
        if lat.is_nan() || lon.is_nan() {
            return Err(Error::ProjectionUnavailable(format!(
                "undefined position {lat}, {lon}"
            )));
        }
        let band = band_letter(lat).ok_or_else(|| {
            Error::ProjectionUnavailable(format!("latitude {lat} outside UTM coverage"))
        })?;
        if !(-180.0..=180.0).contains(&lon) {
            return Err(Error::ProjectionUnavailable(format!("longitude {lon}")));
        }
        let zone = zone_number(lat, lon);

        let phi = lat.to_radians();
        let dlam = (lon - central_meridian(zone)).to_radians();
        let ep2 = self.ep2();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let n = self.a / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = phi.tan().powi(2);
        let c = ep2 * cos_phi * cos_phi;
        let a = cos_phi * dlam;
        let m = self.meridian_arc(phi);

        let easting = K0
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
            + FALSE_EASTING;
        let mut northing = K0
            * (m + n
                * phi.tan()
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
        if lat < 0.0 {
            northing += FALSE_NORTHING_SOUTH;
        }

        Ok(UtmCoord {
            easting,
            northing,
            zone,
            band,
        })
    }

    fn unproject(&self, utm: &UtmCoord) -> GdfResult<LatLon> {
        if !(1..=60).contains(&utm.zone) {
            return Err(Error::ProjectionUnavailable(format!("zone {}", utm.zone)));
        }
        let e2 = self.e2;
        let ep2 = self.ep2();
        let northing = if utm.is_southern() {
            utm.northing - FALSE_NORTHING_SOUTH
        } else {
            utm.northing
        };

        let m = northing / K0;
        let mu = m
            / (self.a * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let c1 = ep2 * cos1 * cos1;
        let t1 = phi1.tan().powi(2);
        let n1 = self.a / (1.0 - e2 * sin1 * sin1).sqrt();
        let r1 = self.a * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
        let d = (utm.easting - FALSE_EASTING) / (n1 * K0);

        let phi = phi1
            - (n1 * phi1.tan() / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let dlam = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos1;

        LatLon::new(
            phi.to_degrees(),
            central_meridian(utm.zone) + dlam.to_degrees(),
        )
        .map_err(|e| Error::ProjectionUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lazy_init_tracing;

    #[test]
    fn test_zone_numbers() {
        assert_eq!(zone_number(45.6, -122.7), 10);
        assert_eq!(zone_number(0.0, -180.0), 1);
        assert_eq!(zone_number(0.0, 180.0), 60);
        assert_eq!(zone_number(-33.9, 18.4), 34);
        // Norway
        assert_eq!(zone_number(60.0, 5.0), 32);
        // Svalbard
        assert_eq!(zone_number(78.0, 20.0), 33);
        assert_eq!(zone_number(78.0, 40.0), 37);
    }

    #[test]
    fn test_band_letters() {
        assert_eq!(band_letter(45.6), Some('T'));
        assert_eq!(band_letter(-33.9), Some('H'));
        assert_eq!(band_letter(0.0), Some('N'));
        assert_eq!(band_letter(-0.1), Some('M'));
        assert_eq!(band_letter(83.9), Some('X'));
        assert_eq!(band_letter(-80.0), Some('C'));
        assert_eq!(band_letter(84.1), None);
        assert_eq!(band_letter(-80.1), None);
    }

    #[test]
    fn test_central_meridian_values() {
        lazy_init_tracing();
        let tm = TransverseMercator::default();
        let utm = tm.project(0.0, 3.0).unwrap();
        assert_eq!(utm.zone_label(), "31N");
        assert!((utm.easting - FALSE_EASTING).abs() < 1e-6);
        assert!(utm.northing.abs() < 1e-6);

        // k0 * meridian arc to 45 degrees (4984944.378 m)
        let utm = tm.project(45.0, -123.0).unwrap();
        assert!((utm.easting - FALSE_EASTING).abs() < 1e-6);
        assert!((utm.northing - 4_982_950.40).abs() < 0.5, "{}", utm.northing);
    }

    #[test]
    fn test_southern_hemisphere_offset() {
        let tm = TransverseMercator::default();
        let utm = tm.project(-33.9249, 18.4241).unwrap();
        assert_eq!(utm.zone_label(), "34H");
        assert!(utm.is_southern());
        assert!(utm.northing > 6_000_000.0 && utm.northing < 6_500_000.0);
        assert!(utm.easting > 200_000.0 && utm.easting < 300_000.0);
    }

    #[test]
    fn test_project_unproject() {
        lazy_init_tracing();
        let tm = TransverseMercator::default();
        for (lat, lon) in [(45.6, -122.7), (-33.9249, 18.4241), (61.2, 149.9), (1.0, 2.0)] {
            let utm = tm.project(lat, lon).unwrap();
            let ll = tm.unproject(&utm).unwrap();
            assert!((ll.lat - lat).abs() < 1e-7, "{utm}: {} vs {lat}", ll.lat);
            assert!((ll.lon - lon).abs() < 1e-7, "{utm}: {} vs {lon}", ll.lon);
        }
    }

    #[test]
    fn test_unavailable() {
        let tm = TransverseMercator::default();
        assert!(matches!(
            tm.project(f64::NAN, 10.0),
            Err(Error::ProjectionUnavailable(_))
        ));
        assert!(matches!(
            tm.project(85.0, 10.0),
            Err(Error::ProjectionUnavailable(_))
        ));
        let bad = UtmCoord {
            easting: 500_000.0,
            northing: 0.0,
            zone: 0,
            band: 'N',
        };
        assert!(tm.unproject(&bad).is_err());
    }
}
