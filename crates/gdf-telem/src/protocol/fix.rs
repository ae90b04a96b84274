/// The repeating fix record and its sub-fields.
///
/// Wire layout, in decode order (33 bytes):
///
/// | field            | width          | notes                                    |
/// |------------------|----------------|------------------------------------------|
/// | time             | i32 BE         | low 30 bits = seconds since 2000-01-01   |
/// | ecef x, y, z     | 3 x i32 BE     | whole meters                             |
/// | mortality status | 3 bits         | shares one byte with the fix type        |
/// | fix type         | 5 bits         |                                          |
/// | dop              | u8             | / 5                                      |
/// | satellites       | 11 x (5+3 bits)| number, raw signal                       |
/// | 3D error         | u8             | / 5, 0x00 and 0xff = not available       |
/// | main voltage     | u8             | / 50                                     |
/// | beacon voltage   | u8             | / 50                                     |
/// | temperature      | u8             | - 103                                    |
use chrono::{DateTime, Utc};
use tracing::trace;

use super::GdfRecord;
use crate::{
    coord::Ecef,
    cursor::{ByteCursor, ByteWriter, Endian},
    tables, Error, GdfResult,
};

/// 2000-01-01T00:00:00Z as a unix timestamp.
pub const GDF_EPOCH_UNIX: i64 = 946_684_800;
/// The two most significant bits of the time word are reserved.
pub const TIME_MASK: i32 = 0x3FFF_FFFF;
pub const NUM_SATS: usize = 11;

const MORT_BITS: usize = 3;
const FIX_TYPE_BITS: usize = 5;
const SAT_NUMBER_BITS: usize = 5;
const SAT_SIGNAL_BITS: usize = 3;

const DOP_SCALE: f64 = 5.0;
const ERROR_SCALE: f64 = 5.0;
const VOLTAGE_SCALE: f64 = 50.0;
const TEMP_OFFSET: i16 = 103;

fn out_of_range(what: &str, value: impl std::fmt::Display) -> Error {
    Error::OutOfRange(format!("{what} {value}"))
}

/// Quantize `value * scale` to the nearest raw byte.
fn scaled_raw(what: &str, value: f64, scale: f64) -> GdfResult<u8> {
    let raw = (value * scale).round();
    if !(0.0..=255.0).contains(&raw) {
        return Err(out_of_range(what, value));
    }
    Ok(raw as u8)
}

//  _____ _      _     _
// |  ___(_) ___| | __| |___
// | |_  | |/ _ \ |/ _` / __|
// |  _| | |  __/ | (_| \__ \
// |_|   |_|\___|_|\__,_|___/

/// Fix timestamp.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimeRecord(pub DateTime<Utc>);

impl TimeRecord {
    /// Timestamp for a raw time word; reserved bits are ignored.
    pub fn from_raw(raw: i32) -> GdfResult<Self> {
        let secs = i64::from(raw & TIME_MASK);
        DateTime::from_timestamp(GDF_EPOCH_UNIX + secs, 0)
            .map(TimeRecord)
            .ok_or_else(|| out_of_range("time offset", secs))
    }

    /// Seconds since the GDF epoch, with the reserved bits clear. The wire has whole-second
    /// resolution, so a timestamp with a fractional second is rejected.
    pub fn to_raw(&self) -> GdfResult<i32> {
        if self.0.timestamp_subsec_nanos() != 0 {
            return Err(out_of_range("sub-second time", self.0));
        }
        let secs = self.0.timestamp() - GDF_EPOCH_UNIX;
        if !(0..=i64::from(TIME_MASK)).contains(&secs) {
            return Err(out_of_range("time", self.0));
        }
        Ok(secs as i32)
    }
}

impl GdfRecord for TimeRecord {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Self::from_raw(cur.read_i32(Endian::Big)?)
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_i32(self.to_raw()?, Endian::Big);
        Ok(())
    }
}

/// ECEF position in whole meters as stored on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct EcefCoordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl EcefCoordinate {
    pub fn to_ecef(&self) -> Ecef {
        Ecef::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Truncates each axis toward zero.
    pub fn from_ecef(ecef: &Ecef) -> GdfResult<Self> {
        let axis = |v: f64| -> GdfResult<i32> {
            let t = v.trunc();
            if t.is_nan() || t < f64::from(i32::MIN) || t > f64::from(i32::MAX) {
                return Err(out_of_range("ecef axis", v));
            }
            Ok(t as i32)
        };
        Ok(Self {
            x: axis(ecef.x)?,
            y: axis(ecef.y)?,
            z: axis(ecef.z)?,
        })
    }
}

impl GdfRecord for EcefCoordinate {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Ok(Self {
            x: cur.read_i32(Endian::Big)?,
            y: cur.read_i32(Endian::Big)?,
            z: cur.read_i32(Endian::Big)?,
        })
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_i32(self.x, Endian::Big);
        w.write_i32(self.y, Endian::Big);
        w.write_i32(self.z, Endian::Big);
        Ok(())
    }
}

/// Mortality status index (3 bits).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct MortStatus(u8);

impl MortStatus {
    pub fn new(index: u8) -> GdfResult<Self> {
        if index >> MORT_BITS != 0 {
            return Err(out_of_range("mortality status", index));
        }
        Ok(Self(index))
    }

    pub fn from_label(label: &str) -> GdfResult<Self> {
        Self::new(tables::mort_status_index(label)?)
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        tables::mort_status_label(self.0)
    }
}

impl GdfRecord for MortStatus {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Ok(Self(cur.read_bits(MORT_BITS)?))
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_bits(self.0, MORT_BITS)
    }
}

/// Fix type index (5 bits).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct FixType(u8);

impl FixType {
    pub fn new(index: u8) -> GdfResult<Self> {
        if index >> FIX_TYPE_BITS != 0 {
            return Err(out_of_range("fix type", index));
        }
        Ok(Self(index))
    }

    /// Lossy: resolves to the first index carrying `label`, which may not fit the field.
    pub fn from_label(label: &str) -> GdfResult<Self> {
        Self::new(tables::fix_type_index(label)?)
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        tables::fix_type_label(self.0)
    }
}

impl GdfRecord for FixType {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Ok(Self(cur.read_bits(FIX_TYPE_BITS)?))
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_bits(self.0, FIX_TYPE_BITS)
    }
}

/// Dilution of precision, raw / 5.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Dop(pub u8);

impl Dop {
    pub fn from_value(dop: f64) -> GdfResult<Self> {
        scaled_raw("dop", dop, DOP_SCALE).map(Self)
    }

    pub fn value(&self) -> f64 {
        f64::from(self.0) / DOP_SCALE
    }
}

impl GdfRecord for Dop {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Ok(Self(cur.read_u8()?))
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_u8(self.0);
        Ok(())
    }
}

/// One satellite slot: 5-bit number, 3-bit raw signal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SatelliteEntry {
    number: u8,
    signal: u8,
}

impl SatelliteEntry {
    pub fn new(number: u8, signal: u8) -> GdfResult<Self> {
        if number >> SAT_NUMBER_BITS != 0 {
            return Err(out_of_range("satellite number", number));
        }
        if signal >> SAT_SIGNAL_BITS != 0 {
            return Err(out_of_range("satellite signal", signal));
        }
        Ok(Self { number, signal })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn raw_signal(&self) -> u8 {
        self.signal
    }

    /// Derived signal-to-noise ratio, 0 for an empty slot.
    pub fn snr(&self) -> u8 {
        if self.number == 0 {
            0
        } else {
            self.signal * 3 + 29
        }
    }
}

impl GdfRecord for SatelliteEntry {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Ok(Self {
            number: cur.read_bits(SAT_NUMBER_BITS)?,
            signal: cur.read_bits(SAT_SIGNAL_BITS)?,
        })
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_bits(self.number, SAT_NUMBER_BITS)?;
        w.write_bits(self.signal, SAT_SIGNAL_BITS)
    }
}

/// The eleven satellite slots, in receiver order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SatelliteArray(pub [SatelliteEntry; NUM_SATS]);

impl SatelliteArray {
    pub fn iter(&self) -> impl Iterator<Item = &SatelliteEntry> {
        self.0.iter()
    }

    pub fn num_used(&self) -> usize {
        self.0.iter().filter(|s| s.snr() != 0).count()
    }
}

impl GdfRecord for SatelliteArray {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        let mut sats = [SatelliteEntry::default(); NUM_SATS];
        for sat in sats.iter_mut() {
            *sat = SatelliteEntry::decode(cur)?;
        }
        Ok(Self(sats))
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        self.0.iter().try_for_each(|sat| sat.encode(w))
    }
}

/// 3D position error, raw / 5. Raw 0x00 and 0xff mean "not available".
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Error3d(pub u8);

impl Default for Error3d {
    fn default() -> Self {
        Self(0xff)
    }
}

impl Error3d {
    pub fn from_value(err: Option<f64>) -> GdfResult<Self> {
        match err {
            None => Ok(Self::default()),
            Some(v) => {
                let raw = scaled_raw("3d error", v, ERROR_SCALE)?;
                if raw == 0x00 || raw == 0xff {
                    return Err(out_of_range("3d error", v));
                }
                Ok(Self(raw))
            }
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self.0 {
            0x00 | 0xff => None,
            raw => Some(f64::from(raw) / ERROR_SCALE),
        }
    }
}

impl GdfRecord for Error3d {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Ok(Self(cur.read_u8()?))
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_u8(self.0);
        Ok(())
    }
}

/// Supply voltage, raw / 50.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Voltage(pub u8);

impl Voltage {
    pub fn from_volts(volts: f64) -> GdfResult<Self> {
        scaled_raw("voltage", volts, VOLTAGE_SCALE).map(Self)
    }

    pub fn volts(&self) -> f64 {
        f64::from(self.0) / VOLTAGE_SCALE
    }
}

impl GdfRecord for Voltage {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Ok(Self(cur.read_u8()?))
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_u8(self.0);
        Ok(())
    }
}

/// Temperature in whole degrees Celsius, raw - 103.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Temperature(pub u8);

impl Temperature {
    pub fn from_celsius(deg: i16) -> GdfResult<Self> {
        deg.checked_add(TEMP_OFFSET)
            .and_then(|raw| u8::try_from(raw).ok())
            .map(Self)
            .ok_or_else(|| out_of_range("temperature", deg))
    }

    pub fn celsius(&self) -> i16 {
        i16::from(self.0) - TEMP_OFFSET
    }
}

impl GdfRecord for Temperature {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        Ok(Self(cur.read_u8()?))
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        w.write_u8(self.0);
        Ok(())
    }
}

//  _____ _
// |  ___(_)_  __
// | |_  | \ \/ /
// |  _| | |>  <
// |_|   |_/_/\_\

/// A single GPS fix with all associated telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub time: TimeRecord,
    pub position: EcefCoordinate,
    pub mort: MortStatus,
    pub fix_type: FixType,
    pub dop: Dop,
    pub sats: SatelliteArray,
    pub error: Error3d,
    pub main_v: Voltage,
    pub beacon_v: Voltage,
    pub temp: Temperature,
}

impl Fix {
    /// Satellites with a nonzero derived signal.
    pub fn num_sats_used(&self) -> usize {
        self.sats.num_used()
    }
}

impl GdfRecord for Fix {
    fn decode(cur: &mut ByteCursor<'_>) -> GdfResult<Self> {
        let start = cur.position();
        let fix = Fix {
            time: TimeRecord::decode(cur)?,
            position: EcefCoordinate::decode(cur)?,
            mort: MortStatus::decode(cur)?,
            fix_type: FixType::decode(cur)?,
            dop: Dop::decode(cur)?,
            sats: SatelliteArray::decode(cur)?,
            error: Error3d::decode(cur)?,
            main_v: Voltage::decode(cur)?,
            beacon_v: Voltage::decode(cur)?,
            temp: Temperature::decode(cur)?,
        };
        trace!("fix @{}: {} {}", start, fix.time.0, fix.fix_type.label());
        Ok(fix)
    }

    fn encode(&self, w: &mut ByteWriter) -> GdfResult<()> {
        self.time.encode(w)?;
        self.position.encode(w)?;
        self.mort.encode(w)?;
        self.fix_type.encode(w)?;
        self.dop.encode(w)?;
        self.sats.encode(w)?;
        self.error.encode(w)?;
        self.main_v.encode(w)?;
        self.beacon_v.encode(w)?;
        self.temp.encode(w)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use chrono::TimeZone;
    use rand::Rng;

    use super::*;
    use crate::{lazy_init_tracing, protocol::FIX_LEN};

    /// A plausible fix near Portland, OR.
    pub(crate) fn sample_fix() -> Fix {
        let mut sats = [SatelliteEntry::default(); NUM_SATS];
        for (i, (n, s)) in [(3, 5), (7, 2), (12, 7), (19, 0), (25, 4)].iter().enumerate() {
            sats[i] = SatelliteEntry::new(*n, *s).unwrap();
        }
        Fix {
            time: TimeRecord(Utc.with_ymd_and_hms(2011, 6, 14, 17, 30, 5).unwrap()),
            position: EcefCoordinate {
                x: -2_417_115,
                y: -3_767_937,
                z: 4_528_069,
            },
            mort: MortStatus::new(1).unwrap(),
            fix_type: FixType::new(4).unwrap(),
            dop: Dop::from_value(2.4).unwrap(),
            sats: SatelliteArray(sats),
            error: Error3d::from_value(Some(12.2)).unwrap(),
            main_v: Voltage::from_volts(3.70).unwrap(),
            beacon_v: Voltage::from_volts(3.12).unwrap(),
            temp: Temperature::from_celsius(21).unwrap(),
        }
    }

    #[test]
    fn test_fix_layout() {
        lazy_init_tracing();
        let fix = sample_fix();
        let bytes = fix.to_bytes().unwrap();
        assert_eq!(bytes.len(), FIX_LEN);
        // time word is big-endian seconds since the epoch
        let secs = Utc.with_ymd_and_hms(2011, 6, 14, 17, 30, 5).unwrap().timestamp()
            - GDF_EPOCH_UNIX;
        assert_eq!(&bytes[0..4], &(secs as i32).to_be_bytes());
        assert_eq!(&bytes[4..8], &(-2_417_115i32).to_be_bytes());
        // mortality 1 in the high 3 bits, fix type 4 in the low 5
        assert_eq!(bytes[16], 0b001_00100);
        assert_eq!(bytes[17], 12);
        // satellite 3, signal 5
        assert_eq!(bytes[18], 0b00011_101);
        assert_eq!(bytes[29], 61);
        assert_eq!(bytes[30], 185);
        assert_eq!(bytes[31], 156);
        assert_eq!(bytes[32], 124);

        let decoded = Fix::decode(&mut ByteCursor::new(&bytes)).unwrap();
        assert_eq!(decoded, fix);
        assert_eq!(decoded.num_sats_used(), 5);
        assert_eq!(decoded.fix_type.label(), "GPS-3D");
        assert_eq!(decoded.mort.label(), "Status 1");
    }

    #[test]
    fn test_time_reserved_bits_masked() {
        let t = TimeRecord::from_raw(0x4000_0000 | 3600).unwrap();
        assert_eq!(t.0, Utc.with_ymd_and_hms(2000, 1, 1, 1, 0, 0).unwrap());
        assert_eq!(t.to_raw().unwrap(), 3600);
        let t = TimeRecord::from_raw(-1).unwrap();
        assert_eq!(t.0.timestamp(), GDF_EPOCH_UNIX + i64::from(TIME_MASK));
    }

    #[test]
    fn test_time_before_epoch() {
        let t = TimeRecord(Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap());
        assert!(matches!(t.to_raw(), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_time_fractional_second_rejected() {
        let t = TimeRecord(DateTime::from_timestamp(1_000_000_000, 500_000_000).unwrap());
        assert!(matches!(t.to_raw(), Err(Error::OutOfRange(_))));
        let mut w = ByteWriter::new();
        assert!(t.encode(&mut w).is_err());
        assert!(w.is_empty());
        let whole = TimeRecord(DateTime::from_timestamp(1_000_000_000, 0).unwrap());
        let raw = whole.to_raw().unwrap();
        assert_eq!(TimeRecord::from_raw(raw).unwrap(), whole);
    }

    #[test]
    fn test_temperature_extremes() {
        assert!(matches!(
            Temperature::from_celsius(i16::MAX),
            Err(Error::OutOfRange(_))
        ));
        assert!(matches!(
            Temperature::from_celsius(i16::MIN),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn test_scaled_values() {
        let v = Voltage::from_volts(3.70).unwrap();
        assert!((v.volts() - 3.70).abs() <= 0.02);
        assert_eq!(Temperature::from_celsius(21).unwrap().celsius(), 21);
        assert_eq!(Temperature::from_celsius(-103).unwrap().0, 0);
        assert_eq!(Temperature::from_celsius(152).unwrap().0, 255);
        assert!(Temperature::from_celsius(153).is_err());
        assert!(Temperature::from_celsius(-104).is_err());
        assert_eq!(Dop::from_value(2.4).unwrap().value(), 2.4);
        assert!(Dop::from_value(51.2).is_err());
        assert!(Voltage::from_volts(-0.5).is_err());
    }

    #[test]
    fn test_error_not_available() {
        assert_eq!(Error3d(0x00).value(), None);
        assert_eq!(Error3d(0xff).value(), None);
        assert_eq!(Error3d(61).value(), Some(12.2));
        assert_eq!(Error3d::from_value(None).unwrap().value(), None);
        assert!(Error3d::from_value(Some(0.0)).is_err());
        assert!(Error3d::from_value(Some(51.0)).is_err());
    }

    #[test]
    fn test_satellite_snr() {
        assert_eq!(SatelliteEntry::new(0, 7).unwrap().snr(), 0);
        assert_eq!(SatelliteEntry::new(31, 0).unwrap().snr(), 29);
        assert_eq!(SatelliteEntry::new(31, 7).unwrap().snr(), 50);
        assert!(SatelliteEntry::new(32, 0).is_err());
        assert!(SatelliteEntry::new(1, 8).is_err());
    }

    #[test]
    fn test_label_encoding_is_lossy() {
        // every "No Fix" index collapses to 0
        let ft = FixType::from_label(FixType::new(7).unwrap().label()).unwrap();
        assert_eq!(ft.index(), 0);
        assert_eq!(FixType::from_label("val. GPS-3D").unwrap().index(), 20);
        // first "Argos-3" index does not fit 5 bits
        assert!(matches!(
            FixType::from_label("Argos-3"),
            Err(Error::OutOfRange(_))
        ));
        assert_eq!(MortStatus::from_label("Status 2").unwrap().index(), 2);
        assert!(FixType::new(32).is_err());
        assert!(MortStatus::new(8).is_err());
    }

    #[test]
    fn test_ecef_truncates_toward_zero() {
        let c = EcefCoordinate::from_ecef(&Ecef::new(1.9, -1.9, -0.5)).unwrap();
        assert_eq!(c, EcefCoordinate { x: 1, y: -1, z: 0 });
        assert!(EcefCoordinate::from_ecef(&Ecef::new(f64::NAN, 0.0, 0.0)).is_err());
        assert!(EcefCoordinate::from_ecef(&Ecef::new(3e9, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_random_fix_round_trip() {
        lazy_init_tracing();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let mut sats = [SatelliteEntry::default(); NUM_SATS];
            for sat in sats.iter_mut() {
                *sat = SatelliteEntry::new(rng.gen_range(0..32), rng.gen_range(0..8)).unwrap();
            }
            let fix = Fix {
                time: TimeRecord::from_raw(rng.gen_range(0..=TIME_MASK)).unwrap(),
                position: EcefCoordinate {
                    x: rng.gen(),
                    y: rng.gen(),
                    z: rng.gen(),
                },
                mort: MortStatus::new(rng.gen_range(0..8)).unwrap(),
                fix_type: FixType::new(rng.gen_range(0..32)).unwrap(),
                dop: Dop(rng.gen()),
                sats: SatelliteArray(sats),
                error: Error3d(rng.gen()),
                main_v: Voltage(rng.gen()),
                beacon_v: Voltage(rng.gen()),
                temp: Temperature(rng.gen()),
            };
            let bytes = fix.to_bytes().unwrap();
            assert_eq!(bytes.len(), FIX_LEN);
            let decoded = Fix::decode(&mut ByteCursor::new(&bytes)).unwrap();
            assert_eq!(decoded, fix);
        }
    }
}
