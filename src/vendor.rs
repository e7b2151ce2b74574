//! Vendor-specific record fills.
//!
//! After the format-level parsing (EXIF, XMP, FLIR blob) the record is
//! completed according to the camera vendor announced by the EXIF `Make`
//! tag. Each vendor stores attitude, position and calibration in
//! different places: DJI in `rdf:Description` attributes, FLIR in XMP
//! child elements plus the FFF parameter table. Unknown vendors leave
//! the record as the format parser built it.
//!
//! Absent tags are skipped. The only error that escapes a fill is a
//! malformed GPS coordinate tuple, which marks the file as corrupt
//! rather than merely sparse.

use crate::error::DecodeError;
use crate::exif::ExifMap;
use crate::flir::FffTable;
use crate::gps::{convert_latlon, isotimestr};
use crate::header::MetadataRecord;
use crate::parse::FieldValue;
use crate::xmp::XmpTree;

/// Camera vendor, from the EXIF `Make` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Unknown,
    Dji,
    Flir,
}

impl Vendor {
    /// Exact match on the trimmed `Make` tag.
    pub fn from_make(make: Option<&str>) -> Vendor {
        match make.map(str::trim) {
            Some("DJI") => Vendor::Dji,
            Some("FLIR") => Vendor::Flir,
            _ => Vendor::Unknown,
        }
    }
}

/// Metadata sources available when filling from a JPEG.
pub struct JpegMeta<'a> {
    pub exif: &'a ExifMap,
    pub xmp: Option<&'a XmpTree>,
    pub fff: &'a FffTable,
    pub filename: &'a str,
    /// Frame dimensions from the SOF0 segment.
    pub width: u32,
    pub height: u32,
    /// Embedded raw thermal grid dimensions.
    pub raw_width: u32,
    pub raw_height: u32,
}

/// Metadata sources available when filling from a TIFF.
pub struct TiffMeta<'a> {
    pub exif: &'a ExifMap,
    pub xmp: Option<&'a XmpTree>,
    pub filename: &'a str,
}

impl Vendor {
    pub fn fill_jpeg(self, rec: &mut MetadataRecord, meta: &JpegMeta) -> Result<(), DecodeError> {
        match self {
            Vendor::Dji => fill_dji_jpeg(rec, meta),
            Vendor::Flir => fill_flir_jpeg(rec, meta),
            Vendor::Unknown => Ok(()),
        }
    }

    pub fn fill_tiff(self, rec: &mut MetadataRecord, meta: &TiffMeta) -> Result<(), DecodeError> {
        match self {
            Vendor::Dji => fill_dji_tiff(rec, meta),
            Vendor::Flir => fill_flir_tiff(rec, meta),
            Vendor::Unknown => Ok(()),
        }
    }
}

/// Converts the GPS coordinate tag pair when both are present. A tuple
/// with the wrong element count aborts the fill.
fn apply_position(rec: &mut MetadataRecord, exif: &ExifMap) -> Result<(), DecodeError> {
    let lat = exif.dms("GPSLatitude");
    let lat_ref = exif.text("GPSLatitudeRef");
    let lon = exif.dms("GPSLongitude");
    let lon_ref = exif.text("GPSLongitudeRef");
    if let (Some(lat), Some(lat_ref), Some(lon), Some(lon_ref)) = (lat, lat_ref, lon, lon_ref) {
        let latitude = convert_latlon(&lat, &lat_ref)?;
        let longitude = convert_latlon(&lon, &lon_ref)?;
        rec.gps.set_position(latitude, longitude);
    }
    Ok(())
}

fn fff_f64(fff: &FffTable, name: &str, default: f64) -> f64 {
    fff.get(name)
        .and_then(FieldValue::as_f64)
        .unwrap_or(default)
}

fn fff_text(fff: &FffTable, name: &str) -> String {
    fff.get(name)
        .and_then(FieldValue::as_text)
        .unwrap_or_default()
        .to_owned()
}

fn fff_timestamp(fff: &FffTable, name: &str) -> Option<String> {
    match fff.get(name)? {
        FieldValue::GpsStamp {
            secs,
            millis,
            tz_minutes,
        } => isotimestr(*secs, *millis, *tz_minutes),
        _ => None,
    }
}

fn fill_flir_jpeg(rec: &mut MetadataRecord, meta: &JpegMeta) -> Result<(), DecodeError> {
    let exif = meta.exif;
    let fff = meta.fff;

    if let Some(xmp) = meta.xmp {
        rec.camera.roll = xmp.element_number("camera:roll");
        rec.camera.yaw = xmp.element_number("camera:yaw");
        rec.camera.pitch = xmp.element_number("camera:pitch");
        rec.camera.centralwavelength = xmp.element_number("camera:centralwavelength");
        rec.camera.wavelengthfwhm = xmp.element_number("camera:wavelengthfwhm");
        rec.camera.detectorbitdepth = xmp.element_number("camera:detectorbitdepth");
        rec.camera.tlineargain = xmp.element_number("camera:tlineargain");
        rec.camera.gyrorate = xmp.element_number("camera:gyrorate");
        rec.camera.isnormalized = xmp.element_number("camera:isnormalized");

        rec.file.mavversion = xmp.element_number("flir:mavversionid");
        rec.file.mavcomponent = xmp.element_number("flir:mavcomponentid");

        rec.gps.rel_altitude = xmp.element_number("flir:mavrelativealtitude");
        rec.gps.hor_accuracy = xmp.element_number("camera:gpsxyaccuracy");
        rec.gps.ver_accuracy = xmp.element_number("camera:gpszaccuracy");
        rec.gps.climbrate = xmp.element_number("flir:mavrateofclimb");
        rec.gps.climbrateref = xmp.element("flir:mavrateofclimbref").map(str::to_owned);

        rec.uav.roll = xmp.element_number("flir:mavroll");
        rec.uav.yaw = xmp.element_number("flir:mavyaw");
        rec.uav.pitch = xmp.element_number("flir:mavpitch");
        rec.uav.rollrate = xmp.element_number("flir:mavrollrate");
        rec.uav.yawrate = xmp.element_number("flir:mavyawrate");
        rec.uav.pitchrate = xmp.element_number("flir:mavpitchrate");
    }

    rec.camera.fnumber = exif.number("FNumber");
    rec.camera.focallength = exif.number("FocalLength");
    rec.camera.make = exif.text("Make");
    rec.camera.model = exif.text("Model");
    rec.camera.coretemp = Some(fff_f64(fff, "Coretemp", 1.0));
    rec.camera.part_number = Some(fff_text(fff, "CameraPartNumber"));
    rec.camera.serial = Some(fff_text(fff, "CameraSerialNumber"));

    rec.file.exifversion = exif.text("ExifVersion");
    rec.file.name = Some(meta.filename.to_owned());
    rec.file.datetime_original = fff_timestamp(fff, "DateTimeOriginal");

    rec.gps.abs_altitude = exif.number("GPSAltitude");
    rec.gps.abs_altituderef = exif.text("GPSAltitudeRef");
    rec.gps.speed = exif.number("GPSSpeed");
    rec.gps.speedref = exif.text("GPSSpeedRef");
    rec.gps.timestamp = exif.text("GPSTimeStamp");
    rec.gps.version = exif.text("GPSVersionID");
    apply_position(rec, exif)?;

    rec.image.height = Some(meta.height);
    rec.image.width = Some(meta.width);
    rec.image.colorspace = exif.number("ColorSpace");
    rec.image.componentsconfiguration = exif.text("ComponentsConfiguration");
    rec.image.bitdepth = Some(8);

    rec.rawimage.height = Some(meta.raw_height);
    rec.rawimage.width = Some(meta.raw_width);
    rec.rawimage.bitdepth = Some(16);

    let radio = &mut rec.calibration.radiometric;
    radio.r = Some(fff_f64(fff, "PlanckR1", 0.0));
    radio.f = Some(fff_f64(fff, "PlanckF", 1.0));
    radio.b = Some(fff_f64(fff, "PlanckB", 0.0));
    radio.r2 = Some(fff_f64(fff, "PlanckR2", 0.0));
    radio.timestamp = Some(0);
    radio.ir_window_temperature = Some(fff_f64(fff, "IRWindowTemperature", 0.0));
    radio.ir_window_transmission = Some(fff_f64(fff, "IRWindowTransmission", 1.0));

    Ok(())
}

/// The DJI attribute fill shared by JPEG and TIFF. No-op without an
/// `rdf:Description` node, like the reference consumers.
fn fill_dji_common(
    rec: &mut MetadataRecord,
    exif: &ExifMap,
    xmp: &XmpTree,
    filename: &str,
) -> Result<(), DecodeError> {
    rec.camera.roll = Some(xmp.attr_number_or_zero("drone-dji:gimbalrolldegree"));
    rec.camera.yaw = Some(xmp.attr_number_or_zero("drone-dji:gimbalyawdegree"));
    rec.camera.pitch = Some(xmp.attr_number_or_zero("drone-dji:gimbalpitchdegree"));
    rec.camera.model = xmp.attr("tiff:model").map(str::to_owned);
    rec.camera.make = xmp.attr("tiff:make").map(str::to_owned);

    rec.uav.roll = Some(xmp.attr_number_or_zero("drone-dji:flightrolldegree"));
    rec.uav.yaw = Some(xmp.attr_number_or_zero("drone-dji:flightyawdegree"));
    rec.uav.pitch = Some(xmp.attr_number_or_zero("drone-dji:flightpitchdegree"));

    rec.gps.abs_altitude = Some(xmp.attr_number_or_zero("drone-dji:absolutealtitude"));
    rec.gps.rel_altitude = Some(xmp.attr_number_or_zero("drone-dji:relativealtitude"));
    rec.gps.gpsmapdatum = exif.text("GPSMapDatum");
    apply_position(rec, exif)?;

    rec.file.about = xmp.attr("rdf:about").map(str::to_owned);
    rec.file.modifydate = xmp.attr("xmp:modifydate").map(str::to_owned);
    rec.file.createdate = xmp.attr("xmp:createdate").map(str::to_owned);
    rec.file.format = xmp.attr("dc:format").map(str::to_owned);
    rec.file.version = xmp.attr("crs:version").map(str::to_owned);
    rec.file.name = Some(filename.to_owned());

    let geo = &mut rec.calibration.geometric;
    geo.fx = Some(xmp.attr_number_or_zero("drone-dji:calibratedfocallength"));
    geo.cx = Some(xmp.attr_number_or_zero("drone-dji:calibratedopticalcenterx"));
    geo.cy = Some(xmp.attr_number_or_zero("drone-dji:calibratedopticalcentery"));

    rec.image.make = exif.text("Make");
    rec.image.xresolution = exif.number("XResolution");
    rec.image.yresolution = exif.number("YResolution");
    rec.image.resolutionunit = exif.number("ResolutionUnit");
    rec.image.software = exif.text("Software");
    rec.image.datetime = exif.text("DateTime");
    rec.image.artist = exif.text("Artist");
    rec.image.copyright = exif.text("Copyright");
    rec.image.exifoffset = exif.number("ExifIFDPointer");
    rec.image.gpsinfo = exif.number("GPSInfoIFDPointer");

    rec.thumbnail.compression = exif.number("Thumbnail Compression");
    rec.thumbnail.xresolution = exif.number("Thumbnail XResolution");
    rec.thumbnail.yresolution = exif.number("Thumbnail YResolution");
    rec.thumbnail.resolutionunit = exif.number("Thumbnail ResolutionUnit");
    rec.thumbnail.jpeg_interchange_format = exif.number("Thumbnail JPEGInterchangeFormat");
    rec.thumbnail.jpeg_interchange_format_length =
        exif.number("Thumbnail JPEGInterchangeFormatLength");

    rec.exif.fnumber = exif.number("FNumber");
    rec.exif.datetime_original = exif.text("DateTimeOriginal");
    rec.exif.aperture_value = exif.number("ApertureValue");
    rec.exif.focal_length = exif.number("FocalLength");
    rec.exif.subsec_time_original = exif.number("SubSecTimeOriginal");
    rec.exif.focal_plane_resolution_unit = exif.number("FocalPlaneResolutionUnit");

    Ok(())
}

fn fill_dji_jpeg(rec: &mut MetadataRecord, meta: &JpegMeta) -> Result<(), DecodeError> {
    let xmp = match meta.xmp {
        Some(x) if x.has_description() => x,
        _ => return Ok(()),
    };
    fill_dji_common(rec, meta.exif, xmp, meta.filename)?;

    rec.image.bitdepth = Some(8);
    rec.image.height = Some(meta.height);
    rec.image.width = Some(meta.width);

    rec.rawimage.height = Some(meta.raw_height);
    rec.rawimage.width = Some(meta.raw_width);
    rec.rawimage.bitdepth = Some(16);

    let fff = meta.fff;
    let radio = &mut rec.calibration.radiometric;
    radio.r = Some(fff_f64(fff, "PlanckR1", 0.0));
    radio.f = Some(fff_f64(fff, "PlanckF", 1.0));
    radio.b = Some(fff_f64(fff, "PlanckB", 0.0));
    radio.r2 = Some(fff_f64(fff, "PlanckR2", 0.0));
    radio.timestamp = Some(0);
    radio.ir_window_temperature = Some(fff_f64(fff, "IRWindowTemperature", 0.0));
    radio.ir_window_transmission = Some(fff_f64(fff, "IRWindowTransmission", 1.0));
    radio.emissivity = Some(fff_f64(fff, "Emissivity", 1.0));
    radio.object_distance = Some(fff_f64(fff, "ObjectDistance", 80.0));
    radio.reflected_apparent_temperature =
        Some(fff_f64(fff, "ReflectedApparentTemperature", 0.0));
    radio.atmospheric_temperature = Some(fff_f64(fff, "AtmosphericTemperature", 0.0));
    radio.relative_humidity = Some(fff_f64(fff, "RelativeHumidity", 0.5));
    radio.coretemp = Some(fff_f64(fff, "Coretemp", 0.0));

    Ok(())
}

fn fill_dji_tiff(rec: &mut MetadataRecord, meta: &TiffMeta) -> Result<(), DecodeError> {
    let xmp = match meta.xmp {
        Some(x) if x.has_description() => x,
        _ => return Ok(()),
    };
    fill_dji_common(rec, meta.exif, xmp, meta.filename)?;

    let exif = meta.exif;
    rec.image.bitdepth = exif.number("BitsPerSample").map(|v| v as u32);
    rec.image.height = exif.number("ImageLength").map(|v| v as u32);
    rec.image.width = exif.number("ImageWidth").map(|v| v as u32);

    rec.rawimage.height = exif.number("ImageLength").map(|v| v as u32);
    rec.rawimage.width = exif.number("ImageWidth").map(|v| v as u32);
    rec.rawimage.bitdepth = exif.number("BitsPerSample").map(|v| v as u32);

    // radiometric calibration only travels in the JPEG FLIR blob
    Ok(())
}

fn fill_flir_tiff(rec: &mut MetadataRecord, meta: &TiffMeta) -> Result<(), DecodeError> {
    let exif = meta.exif;

    rec.file.name = Some(meta.filename.to_owned());

    rec.image.width = exif.number("ImageWidth").map(|v| v as u32);
    rec.image.height = exif.number("ImageLength").map(|v| v as u32);
    rec.image.bitdepth = exif.number("BitsPerSample").map(|v| v as u32);
    rec.image.compression = exif.number("Compression").map(|v| v as u32);

    // lat/lon only; radiometric TIFFs predate the UTM consumers
    let lat = exif.dms("GPSLatitude");
    let lat_ref = exif.text("GPSLatitudeRef");
    let lon = exif.dms("GPSLongitude");
    let lon_ref = exif.text("GPSLongitudeRef");
    if let (Some(lat), Some(lat_ref), Some(lon), Some(lon_ref)) = (lat, lat_ref, lon, lon_ref) {
        rec.gps.latitude = Some(convert_latlon(&lat, &lat_ref)?);
        rec.gps.longitude = Some(convert_latlon(&lon, &lon_ref)?);
    }
    rec.gps.abs_altitude = exif.number("GPSAltitude");
    rec.gps.datetime = exif.text("DateTimeOriginal");

    if let Some(xmp) = meta.xmp {
        rec.gps.rel_altitude = xmp.element_number("flir:mavrelativealtitude");
        rec.uav.pitch = xmp.element_number("flir:mavpitch");
        rec.uav.roll = xmp.element_number("flir:mavroll");
        rec.uav.yaw = xmp.element_number("flir:mavyaw");
        rec.camera.pitch = xmp.element_number("camera:pitch");
        rec.camera.roll = xmp.element_number("camera:roll");
        rec.camera.yaw = xmp.element_number("camera:yaw");
    }

    rec.camera.serial = exif.text("CameraSerialNumber");
    rec.camera.model = exif.text("Model");
    rec.camera.make = exif.text("Make");
    rec.file.fw_version = exif.text("Software");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::ExifValue;
    use crate::flir::FffTable;

    fn coord_exif() -> ExifMap {
        let mut exif = ExifMap::default();
        exif.insert(
            "GPSLatitude",
            ExifValue::Rationals(vec![(48.0, 1.0), (6.0, 1.0), (0.0, 1.0)]),
        );
        exif.insert("GPSLatitudeRef", ExifValue::Text("N".into()));
        exif.insert(
            "GPSLongitude",
            ExifValue::Rationals(vec![(11.0, 1.0), (30.0, 1.0), (0.0, 1.0)]),
        );
        exif.insert("GPSLongitudeRef", ExifValue::Text("E".into()));
        exif
    }

    const DJI_XMP: &[u8] = br#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
 <rdf:Description rdf:about="DJI Meta Data"
  drone-dji:GimbalRollDegree="+0.00"
  drone-dji:GimbalPitchDegree="-89.90"
  drone-dji:GimbalYawDegree="+44.10"
  drone-dji:FlightRollDegree="+1.20"
  drone-dji:AbsoluteAltitude="+543.95"
  drone-dji:RelativeAltitude="+80.30"
  drone-dji:CalibratedFocalLength="640.00"
  tiff:Make="DJI" tiff:Model="XT2"
  xmp:ModifyDate="2018-09-19" dc:Format="image/jpg"/>
</rdf:RDF>"#;

    const FLIR_XMP: &[u8] = br#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
 <rdf:Description rdf:about="">
  <Camera:Roll>-0.30</Camera:Roll>
  <Camera:Pitch>12.5</Camera:Pitch>
  <Camera:Yaw>181.0</Camera:Yaw>
  <FLIR:MAVRelativeAltitude>80/1</FLIR:MAVRelativeAltitude>
  <FLIR:MAVPitch>2.5</FLIR:MAVPitch>
 </rdf:Description>
</rdf:RDF>"#;

    #[test]
    fn dji_jpeg_fill_uses_description_attributes() {
        let exif = coord_exif();
        let xmp = XmpTree::parse(DJI_XMP);
        let fff = FffTable::default();
        let meta = JpegMeta {
            exif: &exif,
            xmp: Some(&xmp),
            fff: &fff,
            filename: "dji_example.jpg",
            width: 640,
            height: 512,
            raw_width: 640,
            raw_height: 512,
        };
        let mut rec = MetadataRecord::default();
        Vendor::Dji.fill_jpeg(&mut rec, &meta).unwrap();

        assert_eq!(rec.camera.pitch, Some(-89.9));
        assert_eq!(rec.camera.yaw, Some(44.1));
        assert_eq!(rec.camera.model.as_deref(), Some("XT2"));
        assert_eq!(rec.uav.roll, Some(1.2));
        // attributes the description does not carry default to zero
        assert_eq!(rec.uav.yaw, Some(0.0));
        assert_eq!(rec.gps.abs_altitude, Some(543.95));
        assert_eq!(rec.gps.rel_altitude, Some(80.3));
        assert_eq!(rec.gps.latitude, Some(48.1));
        assert_eq!(rec.gps.longitude, Some(11.5));
        assert!(rec.gps.utm_x.is_some());
        assert_eq!(rec.calibration.geometric.fx, Some(640.0));
        assert_eq!(rec.file.modifydate.as_deref(), Some("2018-09-19"));
        assert_eq!(rec.file.name.as_deref(), Some("dji_example.jpg"));
        // an empty parameter table falls back to the radiometric defaults
        assert_eq!(rec.calibration.radiometric.f, Some(1.0));
        assert_eq!(rec.calibration.radiometric.object_distance, Some(80.0));
        assert_eq!(rec.calibration.radiometric.relative_humidity, Some(0.5));
    }

    #[test]
    fn dji_fill_without_description_is_a_noop() {
        let exif = coord_exif();
        let fff = FffTable::default();
        let meta = JpegMeta {
            exif: &exif,
            xmp: None,
            fff: &fff,
            filename: "x.jpg",
            width: 0,
            height: 0,
            raw_width: 640,
            raw_height: 512,
        };
        let mut rec = MetadataRecord::default();
        Vendor::Dji.fill_jpeg(&mut rec, &meta).unwrap();
        assert_eq!(rec, MetadataRecord::default());
    }

    #[test]
    fn flir_jpeg_fill_reads_xmp_elements_and_fff() {
        let mut exif = coord_exif();
        exif.insert("Make", ExifValue::Text("FLIR".into()));
        exif.insert("Model", ExifValue::Text("Vue Pro".into()));
        exif.insert("FNumber", ExifValue::Rationals(vec![(7.0, 5.0)]));
        let xmp = XmpTree::parse(FLIR_XMP);
        let mut fff = FffTable::default();
        fff.insert("PlanckR1", FieldValue::F32(17096.45));
        fff.insert("PlanckB", FieldValue::F32(1428.0));
        fff.insert("Coretemp", FieldValue::F32(29.7));
        fff.insert("CameraSerialNumber", FieldValue::Text("123456".into()));
        let meta = JpegMeta {
            exif: &exif,
            xmp: Some(&xmp),
            fff: &fff,
            filename: "flir.jpg",
            width: 640,
            height: 512,
            raw_width: 336,
            raw_height: 256,
        };
        let mut rec = MetadataRecord::default();
        Vendor::Flir.fill_jpeg(&mut rec, &meta).unwrap();

        assert_eq!(rec.camera.roll, Some(-0.3));
        assert_eq!(rec.camera.pitch, Some(12.5));
        assert_eq!(rec.camera.fnumber, Some(1.4));
        assert_eq!(rec.camera.serial.as_deref(), Some("123456"));
        assert_eq!(rec.camera.coretemp, Some(29.7f32 as f64));
        assert_eq!(rec.uav.pitch, Some(2.5));
        assert_eq!(rec.gps.rel_altitude, Some(80.0));
        assert_eq!(rec.gps.latitude, Some(48.1));
        assert!(rec.gps.utm_y.is_some());
        assert_eq!(rec.rawimage.width, Some(336));
        assert_eq!(rec.rawimage.bitdepth, Some(16));
        assert_eq!(rec.image.bitdepth, Some(8));
        let radio = &rec.calibration.radiometric;
        assert_eq!(radio.r, Some(17096.45f32 as f64));
        assert_eq!(radio.b, Some(1428.0));
        assert_eq!(radio.f, Some(1.0)); // absent, default
        assert_eq!(radio.ir_window_transmission, Some(1.0));
        // the DJI-only radiometric extras stay unset
        assert_eq!(radio.object_distance, None);
    }

    #[test]
    fn flir_tiff_fill_skips_utm() {
        let mut exif = coord_exif();
        exif.insert("Make", ExifValue::Text("FLIR".into()));
        exif.insert("Model", ExifValue::Text("Tau 2".into()));
        exif.insert("ImageWidth", ExifValue::Real(640.0));
        exif.insert("ImageLength", ExifValue::Real(512.0));
        exif.insert("BitsPerSample", ExifValue::Real(16.0));
        exif.insert("Compression", ExifValue::Real(1.0));
        exif.insert("Software", ExifValue::Text("v1.7.4".into()));
        let xmp = XmpTree::parse(FLIR_XMP);
        let meta = TiffMeta {
            exif: &exif,
            xmp: Some(&xmp),
            filename: "flir.tiff",
        };
        let mut rec = MetadataRecord::default();
        Vendor::Flir.fill_tiff(&mut rec, &meta).unwrap();

        assert_eq!(rec.image.width, Some(640));
        assert_eq!(rec.image.bitdepth, Some(16));
        assert_eq!(rec.gps.latitude, Some(48.1));
        assert_eq!(rec.gps.utm_x, None);
        assert_eq!(rec.file.fw_version.as_deref(), Some("v1.7.4"));
        assert_eq!(rec.camera.yaw, Some(181.0));
    }

    #[test]
    fn dji_tiff_fill_has_no_radiometric_block() {
        let mut exif = coord_exif();
        exif.insert("BitsPerSample", ExifValue::Real(16.0));
        exif.insert("ImageWidth", ExifValue::Real(640.0));
        exif.insert("ImageLength", ExifValue::Real(512.0));
        let xmp = XmpTree::parse(DJI_XMP);
        let meta = TiffMeta {
            exif: &exif,
            xmp: Some(&xmp),
            filename: "dji.tiff",
        };
        let mut rec = MetadataRecord::default();
        Vendor::Dji.fill_tiff(&mut rec, &meta).unwrap();

        assert_eq!(rec.image.bitdepth, Some(16));
        assert_eq!(rec.rawimage.width, Some(640));
        assert_eq!(rec.gps.utm_zone_number, Some(32));
        assert_eq!(rec.calibration.radiometric.r, None);
    }

    #[test]
    fn malformed_coordinate_tuple_is_a_hard_error() {
        let mut exif = ExifMap::default();
        exif.insert(
            "GPSLatitude",
            ExifValue::Rationals(vec![(48.0, 1.0), (6.0, 1.0)]),
        );
        exif.insert("GPSLatitudeRef", ExifValue::Text("N".into()));
        exif.insert("GPSLongitude", ExifValue::Rationals(vec![(11.0, 1.0)]));
        exif.insert("GPSLongitudeRef", ExifValue::Text("E".into()));
        let xmp = XmpTree::parse(DJI_XMP);
        let fff = FffTable::default();
        let meta = JpegMeta {
            exif: &exif,
            xmp: Some(&xmp),
            fff: &fff,
            filename: "bad.jpg",
            width: 0,
            height: 0,
            raw_width: 640,
            raw_height: 512,
        };
        let mut rec = MetadataRecord::default();
        assert!(matches!(
            Vendor::Dji.fill_jpeg(&mut rec, &meta),
            Err(DecodeError::InvalidCoordinateFormat(4))
        ));
    }

    #[test]
    fn vendor_dispatch_trims_the_make_tag() {
        assert_eq!(Vendor::from_make(Some("DJI")), Vendor::Dji);
        assert_eq!(Vendor::from_make(Some(" FLIR ")), Vendor::Flir);
        assert_eq!(Vendor::from_make(Some("Canon")), Vendor::Unknown);
        assert_eq!(Vendor::from_make(None), Vendor::Unknown);
    }
}
