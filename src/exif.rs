//! Flattened EXIF tag table.
//!
//! Tags from every IFD of a JPEG or TIFF are flattened into one
//! name → value mapping. Later IFDs overwrite earlier ones with the same
//! tag name (last-write-wins, mirroring how multi-page TIFF tag tables
//! are consumed downstream); for JPEGs the thumbnail IFD keeps its own
//! names under a `"Thumbnail "` prefix instead.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::DecodeError;

/// One EXIF tag value, reduced to the shapes the normalizer consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExifValue {
    Text(String),
    Real(f64),
    /// Rational list as `(numerator, denominator)` pairs.
    Rationals(Vec<(f64, f64)>),
    Bytes(Vec<u8>),
}

/// Name → value tag table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifMap {
    tags: BTreeMap<String, ExifValue>,
}

impl ExifMap {
    /// Reads and flattens all IFDs of the container at `path`. With
    /// `thumbnail_prefix`, tags of IFD1 are stored under `"Thumbnail "`
    /// names instead of overwriting the primary ones.
    pub fn read_path(path: &Path, thumbnail_prefix: bool) -> Result<Self, DecodeError> {
        let file = File::open(path).map_err(|e| DecodeError::from_io(e, path))?;
        let mut reader = BufReader::new(&file);
        let exif = exif::Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| DecodeError::StructDecodeFailure(e.to_string()))?;

        let mut fields: Vec<&exif::Field> = exif.fields().collect();
        fields.sort_by_key(|f| f.ifd_num.index());

        let mut map = ExifMap::default();
        for field in fields {
            let key = if thumbnail_prefix && field.ifd_num == exif::In::THUMBNAIL {
                format!("Thumbnail {}", field.tag)
            } else {
                field.tag.to_string()
            };
            if let Some(value) = convert_value(&field.value) {
                map.tags.insert(key, value);
            }
        }
        Ok(map)
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, name: &str, value: ExifValue) {
        self.tags.insert(name.to_owned(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ExifValue> {
        self.tags.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Textual rendering of a tag, trimmed; `None` when absent.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.tags.get(name)? {
            ExifValue::Text(s) => Some(trim_text(s)),
            ExifValue::Real(v) => Some(format_real(*v)),
            ExifValue::Rationals(rs) => Some(
                rs.iter()
                    .map(|(n, d)| format!("{}/{}", format_real(*n), format_real(*d)))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            ExifValue::Bytes(b) => {
                let trimmed: Vec<u8> = b.iter().copied().filter(|&c| c != 0).collect();
                Some(String::from_utf8_lossy(&trimmed).trim().to_owned())
            }
        }
    }

    /// Numeric rendering of a tag: rationals are divided (zero
    /// denominators keep the numerator), text goes through [`evaldiv`].
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.tags.get(name)? {
            ExifValue::Real(v) => Some(*v),
            ExifValue::Rationals(rs) => {
                let (n, d) = *rs.first()?;
                Some(if d != 0.0 { n / d } else { n })
            }
            ExifValue::Text(s) => evaldiv(s).ok(),
            ExifValue::Bytes(_) => None,
        }
    }

    /// Coordinate tuple for [`convert_latlon`][crate::gps::convert_latlon]:
    /// rational triples flatten to 6 numbers, plain numeric lists stay as
    /// they are.
    pub fn dms(&self, name: &str) -> Option<Vec<f64>> {
        match self.tags.get(name)? {
            ExifValue::Rationals(rs) => {
                let mut flat = Vec::with_capacity(rs.len() * 2);
                for (n, d) in rs {
                    flat.push(*n);
                    flat.push(*d);
                }
                Some(flat)
            }
            ExifValue::Real(v) => Some(vec![*v]),
            ExifValue::Text(s) => {
                let parts: Vec<f64> = s
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|p| !p.is_empty())
                    .map(evaldiv)
                    .collect::<Result<_, _>>()
                    .ok()?;
                Some(parts)
            }
            ExifValue::Bytes(_) => None,
        }
    }
}

// camera firmware pads ASCII tags with NULs as well as spaces
fn trim_text(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_owned()
}

fn format_real(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn convert_value(value: &exif::Value) -> Option<ExifValue> {
    use exif::Value;
    Some(match value {
        Value::Ascii(v) => ExifValue::Text(
            v.iter()
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Value::Byte(v) => ExifValue::Bytes(v.clone()),
        Value::Undefined(v, _) => ExifValue::Bytes(v.clone()),
        Value::Short(v) => single_or_text(v.iter().map(|&x| x as f64))?,
        Value::Long(v) => single_or_text(v.iter().map(|&x| x as f64))?,
        Value::SShort(v) => single_or_text(v.iter().map(|&x| x as f64))?,
        Value::SLong(v) => single_or_text(v.iter().map(|&x| x as f64))?,
        Value::Float(v) => single_or_text(v.iter().map(|&x| x as f64))?,
        Value::Double(v) => single_or_text(v.iter().copied())?,
        Value::SByte(v) => single_or_text(v.iter().map(|&x| x as f64))?,
        Value::Rational(v) => {
            ExifValue::Rationals(v.iter().map(|r| (r.num as f64, r.denom as f64)).collect())
        }
        Value::SRational(v) => {
            ExifValue::Rationals(v.iter().map(|r| (r.num as f64, r.denom as f64)).collect())
        }
        Value::Unknown(..) => return None,
    })
}

fn single_or_text(values: impl Iterator<Item = f64>) -> Option<ExifValue> {
    let collected: Vec<f64> = values.collect();
    match collected.len() {
        0 => None,
        1 => Some(ExifValue::Real(collected[0])),
        _ => Some(ExifValue::Text(
            collected
                .iter()
                .map(|v| format_real(*v))
                .collect::<Vec<_>>()
                .join(", "),
        )),
    }
}

/// Evaluates a `"N/D"` or `"N"` string. A zero denominator returns the
/// numerator unconverted; more than one `/` or a non-numeric part is an
/// error.
pub fn evaldiv(s: &str) -> Result<f64, DecodeError> {
    let parts: Vec<&str> = s.trim().split('/').collect();
    let invalid = || DecodeError::InvalidNumber(s.to_owned());
    match parts.len() {
        1 => parts[0].trim().parse::<f64>().map_err(|_| invalid()),
        2 => {
            let num: f64 = parts[0].trim().parse().map_err(|_| invalid())?;
            let den: f64 = parts[1].trim().parse().map_err(|_| invalid())?;
            Ok(if den != 0.0 { num / den } else { num })
        }
        _ => Err(invalid()),
    }
}
