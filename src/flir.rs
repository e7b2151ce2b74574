//! FLIR metadata extraction from R-JPEGs.
//!
//! FLIR cameras spread one contiguous blob over several APP1 segments.
//! Each segment carries a `"FLIR"` signature and, depending on the
//! producing camera, an `"FFF"` sub-signature that moves the payload
//! start: `"ATAU"` framed chunks (DJI XT2) start at byte 170, other FFF
//! chunks (Vue Pro) at byte 554, bare FLIR chunks at byte 10. The
//! reassembled blob holds the 16-bit raw thermal grid followed by the
//! FFF parameter table, decoded through a fixed offset table.

use std::collections::BTreeMap;

use byteordered::Endianness;
use memchr::memmem;
use ndarray::Array2;

use crate::error::DecodeError;
use crate::parse::{read_fields, FieldKind, FieldSpec, FieldValue, StructReader};

const APP1: &[u8] = &[0xff, 0xe1];

/// Payload start inside an `"ATAU"` framed FFF chunk.
const START_ATAU: usize = 170;
/// Payload start inside other FFF chunks.
const START_FFF: usize = 554;
/// Payload start inside FLIR chunks without the FFF sub-signature.
const START_PLAIN: usize = 10;

/// Raw thermal image dimensions assumed when the EXIF table does not
/// carry `Raw Thermal Image Width/Height`.
pub const DEFAULT_RAW_WIDTH: usize = 640;
pub const DEFAULT_RAW_HEIGHT: usize = 512;

/// Fixed offset table of the FFF parameter block. Offsets are relative
/// to the start of the metadata region of the reassembled blob.
pub const FFF_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(0x002, "RawThermalImageWidth", FieldKind::U16),
    FieldSpec::new(0x004, "RawThermalImageHeight", FieldKind::U16),
    FieldSpec::new(0x020, "Emissivity", FieldKind::F32),
    FieldSpec::new(0x024, "ObjectDistance", FieldKind::F32),
    FieldSpec::new(0x028, "ReflectedApparentTemperature", FieldKind::F32),
    FieldSpec::new(0x02c, "AtmosphericTemperature", FieldKind::F32),
    FieldSpec::new(0x030, "IRWindowTemperature", FieldKind::F32),
    FieldSpec::new(0x034, "IRWindowTransmission", FieldKind::F32),
    FieldSpec::new(0x03c, "RelativeHumidity", FieldKind::F32),
    FieldSpec::new(0x058, "PlanckR1", FieldKind::F32),
    FieldSpec::new(0x05c, "PlanckB", FieldKind::F32),
    FieldSpec::new(0x060, "PlanckF", FieldKind::F32),
    FieldSpec::new(0x070, "AtmosphericTransAlpha1", FieldKind::F32),
    FieldSpec::new(0x074, "AtmosphericTransAlpha2", FieldKind::F32),
    FieldSpec::new(0x078, "AtmosphericTransBeta1", FieldKind::F32),
    FieldSpec::new(0x07c, "AtmosphericTransBeta2", FieldKind::F32),
    FieldSpec::new(0x080, "AtmosphericTransX", FieldKind::F32),
    FieldSpec::new(0x090, "CameraTemperatureRangeMax", FieldKind::F32),
    FieldSpec::new(0x094, "CameraTemperatureRangeMin", FieldKind::F32),
    FieldSpec::new(0x098, "CameraTemperatureMaxClip", FieldKind::F32),
    FieldSpec::new(0x09c, "CameraTemperatureMinClip", FieldKind::F32),
    FieldSpec::new(0x0a0, "CameraTemperatureMaxWarn", FieldKind::F32),
    FieldSpec::new(0x0a4, "CameraTemperatureMinWarn", FieldKind::F32),
    FieldSpec::new(0x0a8, "CameraTemperatureMaxSaturated", FieldKind::F32),
    FieldSpec::new(0x0ac, "CameraTemperatureMinSaturated", FieldKind::F32),
    FieldSpec::new(0x0d4, "CameraModel", FieldKind::Str(32)),
    FieldSpec::new(0x0f4, "CameraPartNumber", FieldKind::Str(16)),
    FieldSpec::new(0x104, "CameraSerialNumber", FieldKind::Str(16)),
    FieldSpec::new(0x114, "CameraSoftware", FieldKind::Str(16)),
    FieldSpec::new(0x170, "LensModel", FieldKind::Str(32)),
    FieldSpec::new(0x190, "LensPartNumber", FieldKind::Str(16)),
    FieldSpec::new(0x1a0, "LensSerialNumber", FieldKind::Str(16)),
    FieldSpec::new(0x1b4, "FieldOfView", FieldKind::F32),
    FieldSpec::new(0x1ec, "FilterModel", FieldKind::Str(16)),
    FieldSpec::new(0x1fc, "FilterPartNumber", FieldKind::Str(32)),
    FieldSpec::new(0x21c, "FilterSerialNumber", FieldKind::Str(32)),
    FieldSpec::new(0x308, "PlanckO", FieldKind::I32),
    FieldSpec::new(0x30c, "PlanckR2", FieldKind::F32),
    FieldSpec::new(0x338, "RawValueMedian", FieldKind::U16),
    FieldSpec::new(0x33c, "RawValueRange", FieldKind::U16),
    FieldSpec::new(0x384, "DateTimeOriginal", FieldKind::GpsStamp),
    FieldSpec::new(0x390, "FocusStepCount", FieldKind::U16),
    FieldSpec::new(0x394, "Coretemp", FieldKind::F32),
    FieldSpec::new(0x3b0, "Lenstemp", FieldKind::F32),
    FieldSpec::new(0x45c, "FocusDistance", FieldKind::F32),
    FieldSpec::new(0x464, "FrameRate", FieldKind::U16),
];

/// Name → value mapping decoded from the FFF parameter block.
pub type FffTable = BTreeMap<&'static str, FieldValue>;

/// Thermal grid plus parameter table from one reassembled blob.
#[derive(Debug, Default)]
pub struct FlirData {
    pub pixels: Option<Array2<u16>>,
    pub fff: FffTable,
}

/// Splits `data` on the APP1 marker and concatenates the payload of
/// every FLIR-signed chunk, in encounter order. Returns an empty vector
/// when the file carries no FLIR chunks.
pub fn extract_flir_blob(data: &[u8]) -> Vec<u8> {
    let mut blob = Vec::new();
    for chunk in split_on_app1(data) {
        if chunk.get(2..6) != Some(b"FLIR".as_ref()) {
            continue;
        }
        let declared = 256 * chunk[0] as usize + chunk[1] as usize;
        let start = if chunk.get(10..13) == Some(b"FFF".as_ref()) {
            if chunk.get(14..18) == Some(b"ATAU".as_ref()) {
                START_ATAU
            } else {
                START_FFF
            }
        } else {
            START_PLAIN
        };
        if start < declared {
            let end = declared.min(chunk.len());
            if start < end {
                blob.extend_from_slice(&chunk[start..end]);
            }
        }
    }
    blob
}

fn split_on_app1(data: &[u8]) -> Vec<&[u8]> {
    let mut pieces = Vec::new();
    let mut last = 0usize;
    for pos in memmem::find_iter(data, APP1) {
        pieces.push(&data[last..pos]);
        last = pos + APP1.len();
    }
    pieces.push(&data[last..]);
    pieces
}

/// Minimum length of the parameter table region (its last field ends at
/// 0x466), bounding the grid/table split from the blob tail.
const FFF_TABLE_SPAN: usize = 0x466;

/// Recovers the thermal grid dimensions from the blob itself. The
/// parameter table stores its own grid size at 0x02/0x04, so the
/// correct pixel/table split satisfies `w * h * 2 == split`. The
/// default 640x512 split is checked first, then candidate splits are
/// scanned from the table-sized tail backwards. `None` when no split is
/// self-consistent.
pub fn infer_raw_dims(blob: &[u8]) -> Option<(usize, usize)> {
    let r = StructReader::little(blob);
    let check = |split: usize| -> Option<(usize, usize)> {
        let w = r.u16_at(split + 0x02).ok()? as usize;
        let h = r.u16_at(split + 0x04).ok()? as usize;
        (w > 0 && h > 0 && w * h * 2 == split).then(|| (w, h))
    };

    let default_split = DEFAULT_RAW_WIDTH * DEFAULT_RAW_HEIGHT * 2;
    if let Some(dims) = check(default_split) {
        return Some(dims);
    }
    // grid bytes are u16 samples, so the split is always even
    let mut split = (blob.len().checked_sub(FFF_TABLE_SPAN)?) & !1;
    loop {
        if let Some(dims) = check(split) {
            return Some(dims);
        }
        if split < 2 {
            return None;
        }
        split -= 2;
    }
}

/// Decodes the reassembled blob: the first `width * height * 2` bytes
/// are the raw thermal grid (little-endian u16, row major), the rest is
/// the FFF parameter table. With `only_header` the grid bytes are
/// skipped but still delimit the table.
pub fn decode_blob(
    blob: &[u8],
    width: usize,
    height: usize,
    only_header: bool,
) -> Result<FlirData, DecodeError> {
    let pixel_bytes = width
        .checked_mul(height)
        .and_then(|samples| samples.checked_mul(2))
        .ok_or_else(|| DecodeError::StructDecodeFailure("thermal grid size overflow".into()))?;
    if blob.len() < pixel_bytes {
        return Err(DecodeError::TruncatedRecord {
            offset: 0,
            need: pixel_bytes,
            have: blob.len(),
        });
    }

    let fff = read_fields(&blob[pixel_bytes..], Endianness::Little, FFF_FIELDS)?;

    let pixels = if only_header {
        None
    } else {
        let r = StructReader::little(&blob[..pixel_bytes]);
        let mut samples = Vec::with_capacity(width * height);
        for i in 0..width * height {
            samples.push(r.u16_at(i * 2)?);
        }
        let grid = Array2::from_shape_vec((height, width), samples)
            .map_err(|e| DecodeError::StructDecodeFailure(e.to_string()))?;
        Some(grid)
    };

    Ok(FlirData { pixels, fff })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One APP1 chunk as it appears after splitting on the marker:
    /// length bytes, FLIR/FFF/ATAU signatures, then payload.
    fn atau_chunk(payload: &[u8]) -> Vec<u8> {
        let declared = (START_ATAU + payload.len()) as u16;
        let mut chunk = Vec::new();
        chunk.extend_from_slice(&declared.to_be_bytes());
        chunk.extend_from_slice(b"FLIR");
        chunk.extend_from_slice(&[0u8; 4]); // bytes 6..10
        chunk.extend_from_slice(b"FFF\0");
        chunk.extend_from_slice(b"ATAU");
        chunk.resize(START_ATAU, 0);
        chunk.extend_from_slice(payload);
        chunk
    }

    fn file_with_chunks(chunks: &[Vec<u8>]) -> Vec<u8> {
        let mut data = vec![0xff, 0xd8];
        for c in chunks {
            data.extend_from_slice(&[0xff, 0xe1]);
            data.extend_from_slice(c);
        }
        data
    }

    #[test]
    fn concatenates_atau_chunks_in_order() {
        let a = atau_chunk(&[1u8; 30]);
        let b = atau_chunk(&[2u8; 20]);
        let data = file_with_chunks(&[a.clone(), b.clone()]);

        let blob = extract_flir_blob(&data);
        let expected: usize =
            [&a, &b].iter().map(|c| c.len() - START_ATAU).sum();
        assert_eq!(blob.len(), expected);
        assert!(blob[..30].iter().all(|&v| v == 1));
        assert!(blob[30..].iter().all(|&v| v == 2));
    }

    #[test]
    fn skips_chunks_without_flir_signature() {
        let mut plain = vec![0x00, 0x20];
        plain.extend_from_slice(b"Exif");
        plain.resize(0x20, 0xaa);
        let data = file_with_chunks(&[plain]);
        assert!(extract_flir_blob(&data).is_empty());
    }

    #[test]
    fn plain_flir_chunk_payload_starts_at_ten() {
        let mut chunk = vec![0x00, 0x10];
        chunk.extend_from_slice(b"FLIR");
        chunk.extend_from_slice(&[0u8; 4]);
        chunk.extend_from_slice(&[7u8; 6]); // bytes 10..16
        let data = file_with_chunks(&[chunk]);
        assert_eq!(extract_flir_blob(&data), vec![7u8; 6]);
    }

    #[test]
    fn decodes_pixels_and_table() {
        let (width, height) = (4usize, 2usize);
        let mut blob = Vec::new();
        for v in 0..(width * height) as u16 {
            blob.extend_from_slice(&(v * 100).to_le_bytes());
        }
        let meta_start = blob.len();
        blob.resize(meta_start + 0x470, 0);
        blob[meta_start + 0x58..meta_start + 0x5c].copy_from_slice(&17096.45f32.to_le_bytes());
        blob[meta_start + 0xd4..meta_start + 0xd7].copy_from_slice(b"XT2");

        let data = decode_blob(&blob, width, height, false).unwrap();
        let grid = data.pixels.unwrap();
        assert_eq!(grid.dim(), (height, width));
        assert_eq!(grid[(0, 0)], 0);
        assert_eq!(grid[(1, 3)], 700);
        assert_eq!(data.fff["PlanckR1"], FieldValue::F32(17096.45));
        assert_eq!(data.fff["CameraModel"], FieldValue::Text("XT2".into()));
    }

    #[test]
    fn header_only_skips_pixels_but_keeps_table() {
        let mut blob = vec![0u8; 2 * 2 * 2 + 0x470];
        blob[8 + 0x002..8 + 0x004].copy_from_slice(&336u16.to_le_bytes());
        let data = decode_blob(&blob, 2, 2, true).unwrap();
        assert!(data.pixels.is_none());
        assert_eq!(data.fff["RawThermalImageWidth"], FieldValue::U16(336));
    }

    #[test]
    fn short_blob_fails_whole_decode() {
        assert!(matches!(
            decode_blob(&[0u8; 16], 640, 512, false),
            Err(DecodeError::TruncatedRecord { .. })
        ));
    }

    #[test]
    fn oversized_grid_request_is_an_error() {
        assert!(matches!(
            decode_blob(&[0u8; 16], usize::MAX, 2, true),
            Err(DecodeError::StructDecodeFailure(_))
        ));
        assert!(matches!(
            decode_blob(&[0u8; 16], usize::MAX / 2, 3, false),
            Err(DecodeError::StructDecodeFailure(_))
        ));
    }

    fn blob_with_dims(width: usize, height: usize) -> Vec<u8> {
        let mut blob = vec![0u8; width * height * 2 + 0x470];
        let table = width * height * 2;
        blob[table + 0x02..table + 0x04].copy_from_slice(&(width as u16).to_le_bytes());
        blob[table + 0x04..table + 0x06].copy_from_slice(&(height as u16).to_le_bytes());
        blob
    }

    #[test]
    fn recovers_non_default_grid_dimensions() {
        // Vue Pro sized grid
        let blob = blob_with_dims(336, 256);
        assert_eq!(infer_raw_dims(&blob), Some((336, 256)));

        let blob = blob_with_dims(DEFAULT_RAW_WIDTH, DEFAULT_RAW_HEIGHT);
        assert_eq!(
            infer_raw_dims(&blob),
            Some((DEFAULT_RAW_WIDTH, DEFAULT_RAW_HEIGHT))
        );

        assert_eq!(infer_raw_dims(&[]), None);
        assert_eq!(infer_raw_dims(&vec![0u8; 0x470]), None);
    }
}
