//! The unified metadata record.
//!
//! Every decoder produces the same fixed schema of nested categories;
//! which fields are present varies with the source format. Field types
//! are fixed across decoders (floats stay floats, serial numbers are
//! strings everywhere). A fresh record is built per decode call; there
//! is no shared template.

use ndarray::Array2;
use serde::Serialize;

/// Normalized metadata of one aerial-survey image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub camera: CameraCategory,
    pub uav: UavCategory,
    pub image: ImageCategory,
    pub file: FileCategory,
    pub gps: GpsCategory,
    pub rawimage: RawImageCategory,
    pub calibration: CalibrationCategory,
    pub exif: ExifCategory,
    pub thumbnail: ThumbnailCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CameraCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_sensor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fw_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coretemp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixelshift_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixelshift_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fnumber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focallength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centralwavelength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wavelengthfwhm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detectorbitdepth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tlineargain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gyrorate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isnormalized: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UavCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitchrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yawrate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitdepth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colormin: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colormax: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorspace: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub componentsconfiguration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xresolution: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yresolution: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolutionunit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exifoffset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpsinfo: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asctec_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asctec_checksum: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asctec_mode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asctec_trigger_counter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asctec_fw_version: Option<FirmwareVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dlr_protokoll: Option<DlrProtocol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fw_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifydate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub createdate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mavversion: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mavcomponent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exifversion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime_original: Option<String>,
}

/// Autopilot firmware version block of the ARA header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FirmwareVersion {
    pub major: u16,
    pub minor: u16,
    pub build_count: u32,
    pub timestamp: u32,
    pub svn_revision: String,
}

/// DLR protocol marker of the ARA header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DlrProtocol {
    pub erkennung: String,
    pub version_major: u8,
    pub version_minor: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GpsCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_altituderef: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hor_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ver_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speedref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime_iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpsmapdatum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub climbrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub climbrateref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_altitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_hor_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_ver_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_speed_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_speed_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_speed_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acc_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acc_y: Option<f64>,
    #[serde(rename = "UTM_X", skip_serializing_if = "Option::is_none")]
    pub utm_x: Option<f64>,
    #[serde(rename = "UTM_Y", skip_serializing_if = "Option::is_none")]
    pub utm_y: Option<f64>,
    #[serde(rename = "UTM_ZoneNumber", skip_serializing_if = "Option::is_none")]
    pub utm_zone_number: Option<u8>,
    #[serde(rename = "UTM_ZoneLetter", skip_serializing_if = "Option::is_none")]
    pub utm_zone_letter: Option<char>,
}

impl GpsCategory {
    /// Stores lat/lon plus the derived UTM projection.
    pub fn set_position(&mut self, latitude: f64, longitude: f64) {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        if let Some(utm) = crate::gps::to_utm(latitude, longitude) {
            self.utm_x = Some(utm.easting);
            self.utm_y = Some(utm.northing);
            self.utm_zone_number = Some(utm.zone_number);
            self.utm_zone_letter = Some(utm.zone_letter);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawImageCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitdepth: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalibrationCategory {
    pub geometric: GeometricCalibration,
    pub radiometric: RadiometricCalibration,
    pub boresight: BoresightCalibration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_flags: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_flags: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pois: Vec<PoiPixel>,
}

/// Pixel coordinate of a point of interest embedded in the ARA header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoiPixel {
    pub id: u8,
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeometricCalibration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skew: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixelshift_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixelshift_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RadiometricCalibration {
    #[serde(rename = "R", skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    #[serde(rename = "B", skip_serializing_if = "Option::is_none")]
    pub b: Option<f64>,
    #[serde(rename = "F", skip_serializing_if = "Option::is_none")]
    pub f: Option<f64>,
    #[serde(rename = "R2", skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u32>,
    #[serde(rename = "IRWindowTemperature", skip_serializing_if = "Option::is_none")]
    pub ir_window_temperature: Option<f64>,
    #[serde(rename = "IRWindowTransmission", skip_serializing_if = "Option::is_none")]
    pub ir_window_transmission: Option<f64>,
    #[serde(rename = "Emissivity", skip_serializing_if = "Option::is_none")]
    pub emissivity: Option<f64>,
    #[serde(rename = "ObjectDistance", skip_serializing_if = "Option::is_none")]
    pub object_distance: Option<f64>,
    #[serde(
        rename = "ReflectedApparentTemperature",
        skip_serializing_if = "Option::is_none"
    )]
    pub reflected_apparent_temperature: Option<f64>,
    #[serde(
        rename = "AtmosphericTemperature",
        skip_serializing_if = "Option::is_none"
    )]
    pub atmospheric_temperature: Option<f64>,
    #[serde(rename = "RelativeHumidity", skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<f64>,
    #[serde(rename = "Coretemp", skip_serializing_if = "Option::is_none")]
    pub coretemp: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoresightCalibration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cam_pitch_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cam_roll_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cam_yaw_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExifCategory {
    #[serde(rename = "FNumber", skip_serializing_if = "Option::is_none")]
    pub fnumber: Option<f64>,
    #[serde(rename = "DateTimeOriginal", skip_serializing_if = "Option::is_none")]
    pub datetime_original: Option<String>,
    #[serde(rename = "ApertureValue", skip_serializing_if = "Option::is_none")]
    pub aperture_value: Option<f64>,
    #[serde(rename = "FocalLength", skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,
    #[serde(rename = "SubSecTimeOriginal", skip_serializing_if = "Option::is_none")]
    pub subsec_time_original: Option<f64>,
    #[serde(
        rename = "FocalPlaneResolutionUnit",
        skip_serializing_if = "Option::is_none"
    )]
    pub focal_plane_resolution_unit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThumbnailCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xresolution: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yresolution: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolutionunit: Option<f64>,
    #[serde(rename = "JPEGInterchangeFormat", skip_serializing_if = "Option::is_none")]
    pub jpeg_interchange_format: Option<f64>,
    #[serde(
        rename = "JPEGInterchangeFormatLength",
        skip_serializing_if = "Option::is_none"
    )]
    pub jpeg_interchange_format_length: Option<f64>,
}

/// Raw pixel grid, row major, dimensions from the decoded header.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPixels {
    U8(Array2<u8>),
    U16(Array2<u16>),
    U32(Array2<u32>),
    U64(Array2<u64>),
}

impl RawPixels {
    /// `(height, width)` of the grid.
    pub fn dim(&self) -> (usize, usize) {
        match self {
            RawPixels::U8(a) => a.dim(),
            RawPixels::U16(a) => a.dim(),
            RawPixels::U32(a) => a.dim(),
            RawPixels::U64(a) => a.dim(),
        }
    }

    pub fn bit_depth(&self) -> u32 {
        match self {
            RawPixels::U8(_) => 8,
            RawPixels::U16(_) => 16,
            RawPixels::U32(_) => 32,
            RawPixels::U64(_) => 64,
        }
    }
}
