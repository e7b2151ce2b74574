//! ARA container decoding.
//!
//! An ARA file is a 512 byte little-endian header followed by the raw
//! sensor grid. The header packs several firmware-defined blocks back to
//! back: a bitmap-style preamble, the autopilot block, the camera block,
//! the flight state snapshot, firmware and startup-GPS records, the DLR
//! annex with boresight offsets and points of interest, and the
//! calibration tail. Header decoding is all or nothing; a body decode
//! failure still keeps the header.

use ndarray::Array2;

use crate::error::DecodeError;
use crate::gps::{format_gps_time, utc_from_gps};
use crate::header::{
    DlrProtocol, FirmwareVersion, MetadataRecord, PoiPixel, RawPixels,
};
use crate::parse::StructReader;

/// Fixed header size; the pixel grid starts right behind it.
pub const HEADER_LEN: usize = 512;

/// Detector pixel pitch of the sensor family writing ARA files, meters.
const SENSOR_PIXEL_PITCH: f64 = 17e-6;

const POI_COUNT: usize = 9;

/// Bitmap-style preamble at offset 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BitmapBlock {
    pub mark: u16,
    pub filelength: u32,
    pub offset: u32,
    pub hsize: u32,
    pub width: u32,
    pub height: u32,
    pub planes: u16,
    pub bitperpixel: u16,
    pub compression: u32,
    pub datasize: u32,
    pub ppm_x: u32,
    pub ppm_y: u32,
    pub colors: u32,
    pub colors2: u32,
}

/// Autopilot block at offset 54.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AsctecBlock {
    pub version: u16,
    pub checksum: u16,
    pub mode: u16,
    pub trigger_counter: u16,
    pub bit_per_pixel: u16,
    pub byte_per_pixel: u16,
    pub color_min: u32,
    pub color_max: u32,
}

/// Camera block at offset 74.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraBlock {
    pub sernum: u32,
    pub sernum_sensor: u32,
    pub version: u32,
    pub fw_version: u32,
    /// Core temperature in tenths of a degree.
    pub sensortemperature: u16,
    pub crc_error_cnt: u32,
    pub dcmi_error_cnt: u32,
    pub partnum: String,
}

/// Flight state snapshot at offset 132. Coordinates in 1e-7 degrees,
/// heights and speeds in millimeters resp. mm/s, angles in centidegrees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FalconBlock {
    pub time_ms: u32,
    pub gps_week: u16,
    pub gps_time_ms: u32,
    pub gps_long: i32,
    pub gps_lat: i32,
    pub baro_height: i32,
    pub gps_hor_accuracy: u16,
    pub gps_vert_accuracy: u16,
    pub gps_speed_accuracy: u16,
    pub gps_speed_x: i16,
    pub gps_speed_y: i16,
    pub angle_pitch: i16,
    pub angle_roll: i16,
    pub angle_yaw: u16,
    pub cam_angle_pitch: i16,
    pub cam_angle_roll: i16,
    pub cam_angle_yaw: i16,
}

/// Firmware record at offset 176.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirmwareBlock {
    pub major: u16,
    pub minor: u16,
    pub build_count: u32,
    pub timestamp: u32,
    pub svn_revision: String,
}

/// GPS fix at power-up, offset 220. Same units as [`FalconBlock`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupGpsBlock {
    pub long: i32,
    pub lat: i32,
    pub height: i32,
    pub hor_accuracy: u16,
    pub vert_accuracy: u16,
    pub speed_accuracy: u16,
    pub speed_x: i16,
    pub speed_y: i16,
}

/// DLR annex at offset 242: boresight calibration and GPS antenna lever
/// arm, both in thousandths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DlrBlock {
    pub cam_pitch_offset: i16,
    pub cam_roll_offset: i16,
    pub cam_yaw_offset: i16,
    pub boresight_calib_timestamp: u32,
    pub gps_acc_x: i16,
    pub gps_acc_y: i16,
}

/// Calibration tail at offset 406.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationTail {
    pub changed_flags: u16,
    pub error_flags: u16,
    pub radiometric_b: u16,
    pub radiometric_r: u32,
    pub radiometric_f: i16,
    pub radiometric_calib_timestamp: u32,
    pub geometric_fx: u16,
    pub geometric_fy: u16,
    pub geometric_cx: u16,
    pub geometric_cy: u16,
    pub geometric_skew: i16,
    pub geometric_k1: i16,
    pub geometric_k2: i16,
    pub geometric_k3: i16,
    pub geometric_p1: i16,
    pub geometric_p2: i16,
    pub geometric_calib_timestamp: u32,
    pub erkennung: String,
    pub flags: u16,
    pub version_major: u8,
    pub version_minor: u8,
    pub geometric_pixelshift_x: i16,
    pub geometric_pixelshift_y: i16,
    pub raw_size: u32,
    pub img_size: u32,
}

/// The fully decoded 512 byte header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AraHeader {
    pub bitmap: BitmapBlock,
    pub asctec: AsctecBlock,
    pub camera: CameraBlock,
    pub falcon: FalconBlock,
    pub firmware: FirmwareBlock,
    pub startup_gps: StartupGpsBlock,
    pub dlr: DlrBlock,
    /// Points of interest with a nonzero id, at most [`POI_COUNT`].
    pub pois: Vec<PoiPixel>,
    pub tail: CalibrationTail,
}

impl AraHeader {
    /// Decodes the header from the first [`HEADER_LEN`] bytes of `buf`.
    /// Any field running past the buffer fails the whole header.
    pub fn decode(buf: &[u8]) -> Result<AraHeader, DecodeError> {
        let r = StructReader::little(buf);

        let bitmap = BitmapBlock {
            mark: r.u16_at(0)?,
            filelength: r.u32_at(2)?,
            offset: r.u32_at(10)?,
            hsize: r.u32_at(14)?,
            width: r.u32_at(18)?,
            height: r.u32_at(22)?,
            planes: r.u16_at(26)?,
            bitperpixel: r.u16_at(28)?,
            compression: r.u32_at(30)?,
            datasize: r.u32_at(34)?,
            ppm_x: r.u32_at(38)?,
            ppm_y: r.u32_at(42)?,
            colors: r.u32_at(46)?,
            colors2: r.u32_at(50)?,
        };

        let asctec = AsctecBlock {
            version: r.u16_at(54)?,
            checksum: r.u16_at(56)?,
            mode: r.u16_at(58)?,
            trigger_counter: r.u16_at(60)?,
            bit_per_pixel: r.u16_at(62)?,
            byte_per_pixel: r.u16_at(64)?,
            color_min: r.u32_at(66)?,
            color_max: r.u32_at(70)?,
        };

        let camera = CameraBlock {
            sernum: r.u32_at(74)?,
            sernum_sensor: r.u32_at(78)?,
            version: r.u32_at(82)?,
            fw_version: r.u32_at(86)?,
            sensortemperature: r.u16_at(90)?,
            crc_error_cnt: r.u32_at(92)?,
            dcmi_error_cnt: r.u32_at(96)?,
            partnum: r.str_at(100, 32)?,
        };

        let falcon = FalconBlock {
            time_ms: r.u32_at(132)?,
            gps_week: r.u16_at(136)?,
            gps_time_ms: r.u32_at(138)?,
            gps_long: r.i32_at(142)?,
            gps_lat: r.i32_at(146)?,
            baro_height: r.i32_at(150)?,
            gps_hor_accuracy: r.u16_at(154)?,
            gps_vert_accuracy: r.u16_at(156)?,
            gps_speed_accuracy: r.u16_at(158)?,
            gps_speed_x: r.i16_at(160)?,
            gps_speed_y: r.i16_at(162)?,
            angle_pitch: r.i16_at(164)?,
            angle_roll: r.i16_at(166)?,
            angle_yaw: r.u16_at(168)?,
            cam_angle_pitch: r.i16_at(170)?,
            cam_angle_roll: r.i16_at(172)?,
            cam_angle_yaw: r.i16_at(174)?,
        };

        let firmware = FirmwareBlock {
            major: r.u16_at(176)?,
            minor: r.u16_at(178)?,
            build_count: r.u32_at(180)?,
            timestamp: r.u32_at(184)?,
            svn_revision: r.str_at(188, 32)?,
        };

        let startup_gps = StartupGpsBlock {
            long: r.i32_at(220)?,
            lat: r.i32_at(224)?,
            height: r.i32_at(228)?,
            hor_accuracy: r.u16_at(232)?,
            vert_accuracy: r.u16_at(234)?,
            speed_accuracy: r.u16_at(236)?,
            speed_x: r.i16_at(238)?,
            speed_y: r.i16_at(240)?,
        };

        let dlr = DlrBlock {
            cam_pitch_offset: r.i16_at(342)?,
            cam_roll_offset: r.i16_at(344)?,
            cam_yaw_offset: r.i16_at(346)?,
            boresight_calib_timestamp: r.u32_at(348)?,
            gps_acc_x: r.i16_at(352)?,
            gps_acc_y: r.i16_at(354)?,
        };

        // 9 live slots of 5 bytes each; a 10th reserved slot follows and
        // is skipped. Empty slots carry id 0.
        let mut pois = Vec::new();
        for slot in 0..POI_COUNT {
            let base = 356 + slot * 5;
            let id = r.u8_at(base)?;
            let x = r.u16_at(base + 1)?;
            let y = r.u16_at(base + 3)?;
            if id != 0 {
                pois.push(PoiPixel { id, x, y });
            }
        }

        let tail = CalibrationTail {
            changed_flags: r.u16_at(406)?,
            error_flags: r.u16_at(408)?,
            radiometric_b: r.u16_at(410)?,
            radiometric_r: r.u32_at(412)?,
            radiometric_f: r.i16_at(416)?,
            radiometric_calib_timestamp: r.u32_at(418)?,
            geometric_fx: r.u16_at(422)?,
            geometric_fy: r.u16_at(424)?,
            geometric_cx: r.u16_at(426)?,
            geometric_cy: r.u16_at(428)?,
            geometric_skew: r.i16_at(430)?,
            geometric_k1: r.i16_at(432)?,
            geometric_k2: r.i16_at(434)?,
            geometric_k3: r.i16_at(436)?,
            geometric_p1: r.i16_at(438)?,
            geometric_p2: r.i16_at(440)?,
            geometric_calib_timestamp: r.u32_at(442)?,
            erkennung: r.str_at(446, 3)?,
            flags: r.u16_at(449)?,
            version_major: r.u8_at(451)?,
            version_minor: r.u8_at(452)?,
            geometric_pixelshift_x: r.i16_at(453)?,
            geometric_pixelshift_y: r.i16_at(455)?,
            raw_size: r.u32_at(457)?,
            img_size: r.u32_at(461)?,
        };

        Ok(AraHeader {
            bitmap,
            asctec,
            camera,
            falcon,
            firmware,
            startup_gps,
            dlr,
            pois,
            tail,
        })
    }

    /// Normalizes the header into a fresh [`MetadataRecord`], applying
    /// the firmware scale factors.
    pub fn to_record(&self, filename: &str) -> MetadataRecord {
        let mut rec = MetadataRecord::default();

        rec.file.name = Some(filename.to_owned());
        rec.file.size = Some(self.bitmap.filelength as u64);
        rec.file.asctec_version = Some(self.asctec.version as u32);
        rec.file.asctec_checksum = Some(self.asctec.checksum as u32);
        rec.file.asctec_mode = Some(self.asctec.mode as u32);
        rec.file.asctec_trigger_counter = Some(self.asctec.trigger_counter as u32);
        rec.file.asctec_fw_version = Some(FirmwareVersion {
            major: self.firmware.major,
            minor: self.firmware.minor,
            build_count: self.firmware.build_count,
            timestamp: self.firmware.timestamp,
            svn_revision: self.firmware.svn_revision.clone(),
        });
        rec.file.dlr_protokoll = Some(DlrProtocol {
            erkennung: self.tail.erkennung.clone(),
            version_major: self.tail.version_major,
            version_minor: self.tail.version_minor,
        });

        rec.image.width = Some(self.bitmap.width);
        rec.image.height = Some(self.bitmap.height);
        rec.image.bitdepth = Some(self.bitmap.bitperpixel as u32);
        rec.image.compression = Some(self.bitmap.compression);
        rec.image.colormin = Some(self.asctec.color_min);
        rec.image.colormax = Some(self.asctec.color_max);

        rec.camera.roll = Some(self.falcon.cam_angle_roll as f64 / 1e2);
        rec.camera.pitch = Some(self.falcon.cam_angle_pitch as f64 / 1e2);
        rec.camera.yaw = Some(self.falcon.cam_angle_yaw as f64 / 1e2);
        rec.camera.serial = Some(self.camera.sernum.to_string());
        rec.camera.serial_sensor = Some(self.camera.sernum_sensor.to_string());
        rec.camera.part_number = Some(self.camera.partnum.clone());
        rec.camera.version = Some(self.camera.version);
        rec.camera.fw_version = Some(self.camera.fw_version);
        rec.camera.coretemp = Some(self.camera.sensortemperature as f64 / 10.0);
        rec.camera.pixelshift_x = Some(SENSOR_PIXEL_PITCH);
        rec.camera.pixelshift_y = Some(SENSOR_PIXEL_PITCH);

        rec.uav.roll = Some(self.falcon.angle_roll as f64 / 1e2);
        rec.uav.pitch = Some(self.falcon.angle_pitch as f64 / 1e2);
        rec.uav.yaw = Some(self.falcon.angle_yaw as f64 / 1e2);

        rec.gps.set_position(
            self.falcon.gps_lat as f64 / 1e7,
            self.falcon.gps_long as f64 / 1e7,
        );
        rec.gps.rel_altitude = Some(self.falcon.baro_height as f64 / 1e3);
        rec.gps.hor_accuracy = Some(self.falcon.gps_hor_accuracy as f64 / 1e3);
        rec.gps.ver_accuracy = Some(self.falcon.gps_vert_accuracy as f64 / 1e3);
        rec.gps.speed_accuracy = Some(self.falcon.gps_speed_accuracy as f64 / 1e3);
        rec.gps.speed_x = Some(self.falcon.gps_speed_x as f64 / 1e3);
        rec.gps.speed_y = Some(self.falcon.gps_speed_y as f64 / 1e3);
        if let Some(t) = utc_from_gps(self.falcon.gps_week, self.falcon.gps_time_ms) {
            rec.gps.datetime = Some(format_gps_time(&t, false));
            rec.gps.datetime_iso = Some(format_gps_time(&t, true));
        }
        rec.gps.start_lat = Some(self.startup_gps.lat as f64 / 1e7);
        rec.gps.start_lon = Some(self.startup_gps.long as f64 / 1e7);
        rec.gps.start_altitude = Some(self.startup_gps.height as f64 / 1e3);
        rec.gps.start_hor_accuracy = Some(self.startup_gps.hor_accuracy as f64 / 1e3);
        rec.gps.start_ver_accuracy = Some(self.startup_gps.vert_accuracy as f64 / 1e3);
        rec.gps.start_speed_accuracy = Some(self.startup_gps.speed_accuracy as f64 / 1e3);
        rec.gps.start_speed_x = Some(self.startup_gps.speed_x as f64 / 1e3);
        rec.gps.start_speed_y = Some(self.startup_gps.speed_y as f64 / 1e3);
        rec.gps.acc_x = Some(self.dlr.gps_acc_x as f64 / 1e3);
        rec.gps.acc_y = Some(self.dlr.gps_acc_y as f64 / 1e3);

        rec.calibration.changed_flags = Some(self.tail.changed_flags as u32);
        rec.calibration.error_flags = Some(self.tail.error_flags as u32);
        rec.calibration.flags = Some(self.tail.flags as u32);
        rec.calibration.pois = self.pois.clone();

        let radio = &mut rec.calibration.radiometric;
        radio.b = Some(self.tail.radiometric_b as f64 / 1e2);
        radio.r = Some(self.tail.radiometric_r as f64 / 1e3);
        radio.f = Some(self.tail.radiometric_f as f64 / 1e3);
        radio.timestamp = Some(self.tail.radiometric_calib_timestamp);

        let geo = &mut rec.calibration.geometric;
        geo.fx = Some(self.tail.geometric_fx as f64 / 10.0);
        geo.fy = Some(self.tail.geometric_fy as f64 / 10.0);
        geo.cx = Some(self.tail.geometric_cx as f64 / 10.0);
        geo.cy = Some(self.tail.geometric_cy as f64 / 10.0);
        geo.skew = Some(self.tail.geometric_skew as f64 / 1e3);
        geo.k1 = Some(self.tail.geometric_k1 as f64 / 1e3);
        geo.k2 = Some(self.tail.geometric_k2 as f64 / 1e3);
        geo.k3 = Some(self.tail.geometric_k3 as f64 / 1e3);
        geo.p1 = Some(self.tail.geometric_p1 as f64 / 1e3);
        geo.p2 = Some(self.tail.geometric_p2 as f64 / 1e3);
        geo.pixelshift_x = Some(self.tail.geometric_pixelshift_x as f64 / 1e8);
        geo.pixelshift_y = Some(self.tail.geometric_pixelshift_y as f64 / 1e8);
        geo.timestamp = Some(self.tail.geometric_calib_timestamp);

        let bore = &mut rec.calibration.boresight;
        bore.cam_pitch_offset = Some(self.dlr.cam_pitch_offset as f64 / 1e3);
        bore.cam_roll_offset = Some(self.dlr.cam_roll_offset as f64 / 1e3);
        bore.cam_yaw_offset = Some(self.dlr.cam_yaw_offset as f64 / 1e3);
        bore.timestamp = Some(self.dlr.boresight_calib_timestamp);

        rec
    }
}

/// Decodes the pixel grid behind the header: `width * height` unsigned
/// little-endian samples at the header's bit depth, row major.
pub fn read_body(
    buf: &[u8],
    bitdepth: u32,
    width: u32,
    height: u32,
) -> Result<RawPixels, DecodeError> {
    let (w, h) = (width as usize, height as usize);
    let bytes_per = match bitdepth {
        8 => 1,
        16 => 2,
        32 => 4,
        64 => 8,
        other => {
            return Err(DecodeError::Unsupported(format!(
                "bit depth {} for raw body",
                other
            )))
        }
    };
    // declared dimensions come straight from the file and may be absurd
    let need = w
        .checked_mul(h)
        .and_then(|samples| samples.checked_mul(bytes_per))
        .filter(|need| need.checked_add(HEADER_LEN).is_some())
        .ok_or_else(|| DecodeError::StructDecodeFailure("raw body size overflow".into()))?;
    let body = buf
        .get(HEADER_LEN..HEADER_LEN + need)
        .ok_or(DecodeError::TruncatedRecord {
            offset: HEADER_LEN,
            need,
            have: buf.len().saturating_sub(HEADER_LEN),
        })?;

    let shape = (h, w);
    let grid = match bitdepth {
        8 => RawPixels::U8(to_grid(shape, body.to_vec())?),
        16 => RawPixels::U16(to_grid(
            shape,
            body.chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
        )?),
        32 => RawPixels::U32(to_grid(
            shape,
            body.chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )?),
        _ => RawPixels::U64(to_grid(
            shape,
            body.chunks_exact(8)
                .map(|c| {
                    u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
                })
                .collect(),
        )?),
    };
    Ok(grid)
}

fn to_grid<T>(shape: (usize, usize), data: Vec<T>) -> Result<Array2<T>, DecodeError> {
    Array2::from_shape_vec(shape, data)
        .map_err(|e| DecodeError::StructDecodeFailure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_header() -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN];
        buf[0..2].copy_from_slice(&0x4d42u16.to_le_bytes());
        buf[2..6].copy_from_slice(&(HEADER_LEN as u32 + 8).to_le_bytes());
        buf[18..22].copy_from_slice(&4u32.to_le_bytes()); // width
        buf[22..26].copy_from_slice(&2u32.to_le_bytes()); // height
        buf[28..30].copy_from_slice(&8u16.to_le_bytes()); // bit per pixel
        buf[90..92].copy_from_slice(&297u16.to_le_bytes()); // sensor temp
        buf[100..104].copy_from_slice(b"TAU2");
        buf[136..138].copy_from_slice(&2000u16.to_le_bytes()); // gps week
        buf[138..142].copy_from_slice(&16_000u32.to_le_bytes()); // tow ms
        buf[142..146].copy_from_slice(&123_456_780i32.to_le_bytes()); // lon
        buf[146..150].copy_from_slice(&481_234_500i32.to_le_bytes()); // lat
        buf[150..154].copy_from_slice(&54_300i32.to_le_bytes()); // baro mm
        buf[164..166].copy_from_slice(&(-250i16).to_le_bytes()); // pitch
        buf[168..170].copy_from_slice(&9_000u16.to_le_bytes()); // yaw
        // poi slot 0 and slot 2 occupied
        buf[356] = 3;
        buf[357..359].copy_from_slice(&120u16.to_le_bytes());
        buf[359..361].copy_from_slice(&240u16.to_le_bytes());
        buf[366] = 7;
        buf[367..369].copy_from_slice(&10u16.to_le_bytes());
        buf[369..371].copy_from_slice(&20u16.to_le_bytes());
        buf[410..412].copy_from_slice(&140u16.to_le_bytes()); // B
        buf[412..416].copy_from_slice(&366_545u32.to_le_bytes()); // R
        buf[416..418].copy_from_slice(&1_000i16.to_le_bytes()); // F
        buf[446..449].copy_from_slice(b"DLR");
        buf[451] = 2;
        buf[452] = 1;
        buf
    }

    #[test]
    fn header_decodes_scaled_record() {
        let buf = synthetic_header();
        let header = AraHeader::decode(&buf).unwrap();
        let rec = header.to_record("img_00001.ara");

        assert_eq!(rec.gps.longitude, Some(12.345678));
        assert_eq!(rec.gps.latitude, Some(48.12345));
        assert_eq!(rec.gps.rel_altitude, Some(54.3));
        assert_eq!(rec.uav.pitch, Some(-2.5));
        assert_eq!(rec.uav.yaw, Some(90.0));
        assert_eq!(rec.camera.coretemp, Some(29.7));
        assert_eq!(rec.camera.part_number.as_deref(), Some("TAU2"));
        assert_eq!(rec.camera.pixelshift_x, Some(17e-6));
        assert_eq!(rec.image.width, Some(4));
        assert_eq!(rec.image.height, Some(2));
        assert_eq!(rec.gps.datetime.as_deref(), Some("2018-05-06 00:00:00"));
        assert_eq!(
            rec.gps.datetime_iso.as_deref(),
            Some("2018-05-06T00:00:00")
        );
        assert_eq!(rec.calibration.radiometric.b, Some(1.4));
        assert_eq!(rec.calibration.radiometric.r, Some(366.545));
        assert_eq!(rec.calibration.radiometric.f, Some(1.0));
        let dlr = rec.file.dlr_protokoll.as_ref().unwrap();
        assert_eq!(dlr.erkennung, "DLR");
        assert_eq!((dlr.version_major, dlr.version_minor), (2, 1));
        // the projection fills in UTM alongside lat/lon
        assert_eq!(rec.gps.utm_zone_number, Some(33));
        assert_eq!(rec.gps.utm_zone_letter, Some('U'));
    }

    #[test]
    fn empty_poi_slots_are_filtered() {
        let buf = synthetic_header();
        let header = AraHeader::decode(&buf).unwrap();
        assert_eq!(
            header.pois,
            vec![
                PoiPixel { id: 3, x: 120, y: 240 },
                PoiPixel { id: 7, x: 10, y: 20 },
            ]
        );
    }

    #[test]
    fn short_buffer_fails_whole_header() {
        let buf = vec![0u8; 300];
        assert!(matches!(
            AraHeader::decode(&buf),
            Err(DecodeError::TruncatedRecord { .. })
        ));
    }

    #[test]
    fn body_reshapes_row_major() {
        let mut buf = synthetic_header();
        buf.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        match read_body(&buf, 8, 4, 2).unwrap() {
            RawPixels::U8(a) => {
                assert_eq!(a.dim(), (2, 4));
                assert_eq!(a[[0, 0]], 1);
                assert_eq!(a[[1, 3]], 8);
            }
            other => panic!("expected u8 grid, got {:?}", other),
        }
    }

    #[test]
    fn truncated_body_keeps_error_details() {
        let buf = synthetic_header(); // no body at all
        match read_body(&buf, 16, 4, 2) {
            Err(DecodeError::TruncatedRecord { need, have, .. }) => {
                assert_eq!((need, have), (16, 0));
            }
            other => panic!("expected TruncatedRecord, got {:?}", other),
        }
    }

    #[test]
    fn declared_dims_overflow_is_an_error() {
        let buf = synthetic_header();
        assert!(matches!(
            read_body(&buf, 16, u32::MAX, u32::MAX),
            Err(DecodeError::StructDecodeFailure(_))
        ));
        assert!(matches!(
            read_body(&buf, 64, u32::MAX, u32::MAX),
            Err(DecodeError::StructDecodeFailure(_))
        ));
    }

    #[test]
    fn unsupported_bit_depth_is_reported() {
        let buf = synthetic_header();
        assert!(matches!(
            read_body(&buf, 12, 4, 2),
            Err(DecodeError::Unsupported(_))
        ));
    }
}
