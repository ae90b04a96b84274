/// Tabular rendering of decoded fixes.
///
/// One row per fix, columns in a fixed order. Geodetic and grid values that cannot be derived
/// are written as [`NOT_AVAILABLE`] rather than failing the row.
use chrono::{FixedOffset, Offset, Utc};
use tracing::trace;

use crate::{
    document::GdfDocument,
    protocol::fix::{Fix, NUM_SATS},
    utm::{TransverseMercator, UtmProjector},
};

pub const NOT_AVAILABLE: &str = "N/A";

/// Default local time offset, UTC-08:00.
pub const DEFAULT_LOCAL_OFFSET_SECS: i32 = -8 * 3600;

/// Output table settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub delimiter: char,
    /// Offset applied to UTC for the local date / time columns.
    pub local_offset: FixedOffset,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            local_offset: FixedOffset::east_opt(DEFAULT_LOCAL_OFFSET_SECS)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl FormatOptions {
    pub fn tab() -> Self {
        Self {
            delimiter: '\t',
            ..Default::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }
}

/// Renders fixes as delimited rows.
#[derive(Debug, Clone)]
pub struct RowFormatter<P = TransverseMercator> {
    options: FormatOptions,
    projector: P,
}

impl RowFormatter<TransverseMercator> {
    pub fn new(options: FormatOptions) -> Self {
        Self::with_projector(options, TransverseMercator::default())
    }
}

impl Default for RowFormatter<TransverseMercator> {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}

impl<P: UtmProjector> RowFormatter<P> {
    pub fn with_projector(options: FormatOptions, projector: P) -> Self {
        Self { options, projector }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Column names, in row order.
    pub fn columns() -> Vec<String> {
        let mut cols: Vec<String> = [
            "Index",
            "CollarID",
            "UTC_Date",
            "UTC_Time",
            "LMT_Date",
            "LMT_Time",
            "ECEF_X",
            "ECEF_Y",
            "ECEF_Z",
            "Latitude",
            "Longitude",
            "Height",
            "Easting",
            "Northing",
            "UTM_Zone",
            "DOP",
            "FixType",
            "SatsUsed",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        for i in 1..=NUM_SATS {
            cols.push(format!("Sat_{i:02}"));
            cols.push(format!("C/N_{i:02}"));
        }
        cols.extend(["Main_V", "Beacon_V", "Temp"].iter().map(|c| c.to_string()));
        cols
    }

    pub fn header_row(&self) -> String {
        Self::columns().join(&self.options.delimiter.to_string())
    }

    /// Field values for one fix.
    pub fn fields(&self, index: usize, collar_id: u32, fix: &Fix) -> Vec<String> {
        let utc = fix.time.0;
        let local = utc.with_timezone(&self.options.local_offset);
        let ecef = fix.position.to_ecef();
        let lla = ecef.lla();

        let (lat, lon) = match lla.lat_lon() {
            Ok(ll) => (format!("{:.5}", ll.lat), format!("{:.5}", ll.lon)),
            Err(e) => {
                trace!("fix {index}: {e}");
                (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string())
            }
        };
        let alt = if lla.alt.is_nan() {
            NOT_AVAILABLE.to_string()
        } else {
            format!("{:.2}", lla.alt)
        };
        let (easting, northing, zone) = match ecef.utm(&self.projector) {
            Ok(utm) => (
                format!("{:.2}", utm.easting),
                format!("{:.2}", utm.northing),
                utm.zone_label(),
            ),
            Err(e) => {
                trace!("fix {index}: {e}");
                (
                    NOT_AVAILABLE.to_string(),
                    NOT_AVAILABLE.to_string(),
                    NOT_AVAILABLE.to_string(),
                )
            }
        };

        let mut fields = vec![
            index.to_string(),
            collar_id.to_string(),
            utc.format("%Y-%m-%d").to_string(),
            utc.format("%H:%M:%S").to_string(),
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M:%S").to_string(),
            fix.position.x.to_string(),
            fix.position.y.to_string(),
            fix.position.z.to_string(),
            lat,
            lon,
            alt,
            easting,
            northing,
            zone,
            format!("{:.1}", fix.dop.value()),
            fix.fix_type.label().to_string(),
            fix.num_sats_used().to_string(),
        ];
        for sat in fix.sats.iter() {
            fields.push(sat.number().to_string());
            fields.push(sat.snr().to_string());
        }
        fields.push(format!("{:.2}", fix.main_v.volts()));
        fields.push(format!("{:.2}", fix.beacon_v.volts()));
        fields.push(fix.temp.celsius().to_string());
        fields
    }

    pub fn row(&self, index: usize, collar_id: u32, fix: &Fix) -> String {
        self.fields(index, collar_id, fix)
            .join(&self.options.delimiter.to_string())
    }

    /// One row per fix, indexed from 1 in file order.
    pub fn document_rows(&self, doc: &GdfDocument) -> Vec<String> {
        doc.fixes()
            .iter()
            .enumerate()
            .map(|(i, fix)| self.row(i + 1, doc.collar_id(), fix))
            .collect()
    }
}
