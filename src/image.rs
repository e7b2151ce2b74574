//! Format detection and the public load surface.
//!
//! [`factory`] picks the decoder from the file extension. Every decoder
//! produces a [`Decoded`]: a fresh [`MetadataRecord`] plus, unless only
//! the header was requested, the raw pixel grid. Loading never fails for
//! sparse or damaged files; whatever could not be decoded is logged and
//! the affected parts stay empty. The one exception is a malformed GPS
//! coordinate tuple, which reports the file as corrupt to the caller.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};
use ndarray::Array2;

use crate::ara::{read_body, AraHeader, HEADER_LEN};
use crate::error::DecodeError;
use crate::exif::ExifMap;
use crate::flir::{
    decode_blob, extract_flir_blob, infer_raw_dims, FlirData, DEFAULT_RAW_HEIGHT,
    DEFAULT_RAW_WIDTH,
};
use crate::header::{MetadataRecord, RawPixels};
use crate::jpeg::{find_segments, frame_size};
use crate::vendor::{JpegMeta, TiffMeta, Vendor};
use crate::xmp::extract_xmp;

/// Result of one load call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub header: MetadataRecord,
    pub pixels: Option<RawPixels>,
}

/// A file bound to the decoder its extension selected.
#[derive(Debug, Clone)]
pub enum SourceDocument {
    Ara(AraDocument),
    Jpeg(JpegDocument),
    Tiff(TiffDocument),
}

#[derive(Debug, Clone)]
pub struct AraDocument {
    path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct JpegDocument {
    path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TiffDocument {
    path: PathBuf,
}

/// Selects the decoder for `path` by extension, case-insensitively.
/// `None` for extensions no decoder claims.
pub fn factory<P: AsRef<Path>>(path: P) -> Option<SourceDocument> {
    let path = path.as_ref();
    let ext = path.extension()?.to_str()?.to_lowercase();
    let doc = match ext.as_str() {
        "ara" | "ar2" | "raw" => SourceDocument::Ara(AraDocument {
            path: path.to_owned(),
        }),
        "jpg" | "jpeg" => SourceDocument::Jpeg(JpegDocument {
            path: path.to_owned(),
        }),
        "tif" | "tiff" => SourceDocument::Tiff(TiffDocument {
            path: path.to_owned(),
        }),
        _ => return None,
    };
    Some(doc)
}

impl SourceDocument {
    pub fn path(&self) -> &Path {
        match self {
            SourceDocument::Ara(d) => &d.path,
            SourceDocument::Jpeg(d) => &d.path,
            SourceDocument::Tiff(d) => &d.path,
        }
    }

    /// Decodes the file. With `only_header` the pixel grid is skipped.
    pub fn load(&self, only_header: bool) -> Result<Decoded, DecodeError> {
        let result = match self {
            SourceDocument::Ara(d) => d.load(only_header),
            SourceDocument::Jpeg(d) => d.load(only_header),
            SourceDocument::Tiff(d) => d.load(only_header),
        };
        match result {
            Ok(decoded) => Ok(decoded),
            Err(e @ DecodeError::InvalidCoordinateFormat(_)) => Err(e),
            Err(e) => {
                error!("{}: decode failed: {}", self.path().display(), e);
                Ok(Decoded::default())
            }
        }
    }
}

fn filename_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl AraDocument {
    fn load(&self, only_header: bool) -> Result<Decoded, DecodeError> {
        let data = std::fs::read(&self.path).map_err(|e| DecodeError::from_io(e, &self.path))?;
        if data.len() < HEADER_LEN {
            return Err(DecodeError::TruncatedRecord {
                offset: 0,
                need: HEADER_LEN,
                have: data.len(),
            });
        }
        let header = AraHeader::decode(&data)?;
        let record = header.to_record(&filename_of(&self.path));

        let pixels = if only_header {
            None
        } else {
            match read_body(
                &data,
                header.bitmap.bitperpixel as u32,
                header.bitmap.width,
                header.bitmap.height,
            ) {
                Ok(grid) => Some(grid),
                Err(e) => {
                    warn!("{}: raw body unreadable: {}", self.path.display(), e);
                    None
                }
            }
        };

        Ok(Decoded {
            header: record,
            pixels,
        })
    }
}

impl JpegDocument {
    fn load(&self, only_header: bool) -> Result<Decoded, DecodeError> {
        let data = std::fs::read(&self.path).map_err(|e| DecodeError::from_io(e, &self.path))?;

        let exif = match ExifMap::read_path(&self.path, true) {
            Ok(map) => map,
            Err(e) => {
                debug!("{}: no exif table: {}", self.path.display(), e);
                ExifMap::default()
            }
        };
        let xmp = extract_xmp(&data);

        let segments = find_segments(&data);
        let (width, height, channels) = frame_size(&segments, &data);

        let blob = extract_flir_blob(&data);
        // Cameras other than the XT2 ship smaller grids (the Vue Pro is
        // 336x256); the parameter table carries the real size.
        let (raw_width, raw_height) =
            infer_raw_dims(&blob).unwrap_or((DEFAULT_RAW_WIDTH, DEFAULT_RAW_HEIGHT));
        let flir = if blob.is_empty() {
            FlirData::default()
        } else {
            match decode_blob(&blob, raw_width, raw_height, only_header) {
                Ok(flir) => flir,
                Err(e) => {
                    warn!("{}: flir blob unreadable: {}", self.path.display(), e);
                    FlirData::default()
                }
            }
        };

        let mut record = MetadataRecord::default();
        let vendor = Vendor::from_make(exif.text("Make").as_deref());
        vendor.fill_jpeg(
            &mut record,
            &JpegMeta {
                exif: &exif,
                xmp: xmp.as_ref(),
                fff: &flir.fff,
                filename: &filename_of(&self.path),
                width,
                height,
                raw_width: raw_width as u32,
                raw_height: raw_height as u32,
            },
        )?;
        if vendor != Vendor::Unknown {
            record.image.channels = Some(channels);
        }

        let pixels = if only_header {
            None
        } else if let Some(grid) = flir.pixels {
            Some(RawPixels::U16(grid))
        } else {
            match image::open(&self.path) {
                Ok(img) => {
                    let gray = img.to_luma8();
                    let (w, h) = (gray.width() as usize, gray.height() as usize);
                    Array2::from_shape_vec((h, w), gray.into_raw())
                        .ok()
                        .map(RawPixels::U8)
                }
                Err(e) => {
                    warn!("{}: image data unreadable: {}", self.path.display(), e);
                    None
                }
            }
        };

        Ok(Decoded {
            header: record,
            pixels,
        })
    }
}

impl TiffDocument {
    fn load(&self, only_header: bool) -> Result<Decoded, DecodeError> {
        let data = std::fs::read(&self.path).map_err(|e| DecodeError::from_io(e, &self.path))?;

        let exif = match ExifMap::read_path(&self.path, false) {
            Ok(map) => map,
            Err(e) => {
                debug!("{}: no exif table: {}", self.path.display(), e);
                ExifMap::default()
            }
        };
        let xmp = extract_xmp(&data);

        let mut record = MetadataRecord::default();
        let vendor = Vendor::from_make(exif.text("Make").as_deref());
        vendor.fill_tiff(
            &mut record,
            &TiffMeta {
                exif: &exif,
                xmp: xmp.as_ref(),
                filename: &filename_of(&self.path),
            },
        )?;

        let pixels = if only_header {
            None
        } else {
            match self.read_pixels() {
                Ok(grid) => Some(grid),
                Err(e) => {
                    warn!("{}: image data unreadable: {}", self.path.display(), e);
                    None
                }
            }
        };

        Ok(Decoded {
            header: record,
            pixels,
        })
    }

    /// First page of the TIFF as a raw grid, at its stored sample width.
    fn read_pixels(&self) -> Result<RawPixels, DecodeError> {
        use tiff::decoder::{Decoder, DecodingResult};

        let file = File::open(&self.path).map_err(|e| DecodeError::from_io(e, &self.path))?;
        let mut decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| decode_failure(e.to_string()))?;
        let (width, height) = decoder
            .dimensions()
            .map_err(|e| decode_failure(e.to_string()))?;
        let shape = (height as usize, width as usize);

        let grid = match decoder
            .read_image()
            .map_err(|e| decode_failure(e.to_string()))?
        {
            DecodingResult::U8(data) => RawPixels::U8(reshape(shape, data)?),
            DecodingResult::U16(data) => RawPixels::U16(reshape(shape, data)?),
            DecodingResult::U32(data) => RawPixels::U32(reshape(shape, data)?),
            DecodingResult::U64(data) => RawPixels::U64(reshape(shape, data)?),
            _ => {
                return Err(DecodeError::Unsupported(
                    "non-integer tiff sample format".into(),
                ))
            }
        };
        Ok(grid)
    }
}

fn decode_failure(msg: String) -> DecodeError {
    DecodeError::StructDecodeFailure(msg)
}

fn reshape<T>(shape: (usize, usize), data: Vec<T>) -> Result<Array2<T>, DecodeError> {
    Array2::from_shape_vec(shape, data).map_err(|e| decode_failure(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_dispatches_on_extension() {
        assert!(matches!(
            factory("flight/img_0001.ARA"),
            Some(SourceDocument::Ara(_))
        ));
        assert!(matches!(
            factory("a.ar2"),
            Some(SourceDocument::Ara(_))
        ));
        assert!(matches!(
            factory("b.raw"),
            Some(SourceDocument::Ara(_))
        ));
        assert!(matches!(
            factory("20180919_151905_R.jpg"),
            Some(SourceDocument::Jpeg(_))
        ));
        assert!(matches!(
            factory("x.JPEG"),
            Some(SourceDocument::Jpeg(_))
        ));
        assert!(matches!(
            factory("20180530_152906.tiff"),
            Some(SourceDocument::Tiff(_))
        ));
        assert!(factory("notes.txt").is_none());
        assert!(factory("no_extension").is_none());
    }

    #[test]
    fn missing_file_degrades_to_empty_record() {
        let doc = factory("/nonexistent/path/img.ara").unwrap();
        let decoded = doc.load(false).unwrap();
        assert_eq!(decoded.header, MetadataRecord::default());
        assert!(decoded.pixels.is_none());

        let doc = factory("/nonexistent/path/img.jpg").unwrap();
        assert_eq!(doc.load(true).unwrap(), Decoded::default());
    }

    #[test]
    fn garbage_jpeg_degrades_but_does_not_fail() {
        let path = temp_path("garbage.jpg");
        std::fs::write(&path, b"\xff\xd8 not really a jpeg").unwrap();
        let decoded = factory(&path).unwrap().load(false).unwrap();
        assert_eq!(decoded.header.gps, Default::default());
        assert!(decoded.pixels.is_none());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn header_only_ara_load_is_idempotent() {
        let path = temp_path("header_only.ara");
        let mut data = vec![0u8; HEADER_LEN];
        data[18..22].copy_from_slice(&2u32.to_le_bytes());
        data[22..26].copy_from_slice(&2u32.to_le_bytes());
        data[28..30].copy_from_slice(&8u16.to_le_bytes());
        data[142..146].copy_from_slice(&115_000_000i32.to_le_bytes());
        data[146..150].copy_from_slice(&481_000_000i32.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 4]);
        std::fs::write(&path, &data).unwrap();

        let doc = factory(&path).unwrap();
        let first = doc.load(true).unwrap();
        let second = doc.load(true).unwrap();
        assert_eq!(first, second);
        assert!(first.pixels.is_none());
        assert_eq!(first.header.gps.latitude, Some(48.1));

        let full = doc.load(false).unwrap();
        assert_eq!(full.header, first.header);
        match full.pixels {
            Some(RawPixels::U8(grid)) => assert_eq!(grid.dim(), (2, 2)),
            other => panic!("expected u8 grid, got {:?}", other),
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn jpeg_thermal_grid_sizes_from_embedded_table() {
        // Vue Pro grid, smaller than the XT2 default
        let (width, height) = (336usize, 256usize);
        let mut payload = Vec::with_capacity(width * height * 2 + 0x470);
        for i in 0..width * height {
            payload.extend_from_slice(&((i % 0x2000) as u16).to_le_bytes());
        }
        let table = payload.len();
        payload.resize(table + 0x470, 0);
        payload[table + 0x02..table + 0x04].copy_from_slice(&(width as u16).to_le_bytes());
        payload[table + 0x04..table + 0x06].copy_from_slice(&(height as u16).to_le_bytes());

        let mut data = vec![0xff, 0xd8];
        for piece in payload.chunks(60_000) {
            data.extend_from_slice(&[0xff, 0xe1]);
            let declared = (170 + piece.len()) as u16;
            data.extend_from_slice(&declared.to_be_bytes());
            data.extend_from_slice(b"FLIR");
            data.extend_from_slice(&[0u8; 4]);
            data.extend_from_slice(b"FFF\0");
            data.extend_from_slice(b"ATAU");
            data.resize(data.len() + 170 - 18, 0);
            data.extend_from_slice(piece);
        }
        data.extend_from_slice(&[0xff, 0xd9]);

        let path = temp_path("vue_pro.jpg");
        std::fs::write(&path, &data).unwrap();
        let decoded = factory(&path).unwrap().load(false).unwrap();
        match decoded.pixels {
            Some(RawPixels::U16(grid)) => assert_eq!(grid.dim(), (height, width)),
            other => panic!("expected u16 grid, got {:?}", other),
        }
        std::fs::remove_file(&path).ok();
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("airimage-test-{}-{}", std::process::id(), name))
    }
}
