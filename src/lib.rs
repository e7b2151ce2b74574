//! Metadata normalizer for aerial survey imagery.
//!
//! Survey flights mix camera systems: the ARA raw container written by
//! the autopilot-triggered thermal head, radiometric JPEGs from FLIR
//! cameras (Vue Pro, DJI XT2), and DJI-tagged JPEGs and TIFFs. Each
//! format scatters flight state, position and calibration over a
//! different mix of fixed binary headers, EXIF tags, XMP packets and
//! FLIR's FFF parameter blocks. This crate reads any of them into one
//! [`MetadataRecord`] so downstream photogrammetry does not care where a
//! value came from, and optionally returns the raw sensor grid.
//!
//! # Usage
//!
//! [`factory`] picks the decoder from the file extension;
//! [`load`][SourceDocument::load] produces the record and, unless only
//! the header is wanted, the pixels.
//!
//! ```rust
//! # fn demo() -> Result<(), airimage::DecodeError> {
//! let doc = airimage::factory("flight/img_0042.ara").expect("supported extension");
//! let decoded = doc.load(false)?;
//! println!("{:?}", decoded.header.gps.latitude);
//! # Ok(())
//! # }
//! ```
//!
//! Sparse or damaged files degrade to an empty record instead of
//! failing; only a malformed GPS coordinate tuple is reported as an
//! error. See [`SourceDocument::load`].

pub mod ara;
pub mod error;
pub mod exif;
pub mod flir;
pub mod gps;
pub mod header;
pub mod image;
pub mod jpeg;
pub mod parse;
pub mod vendor;
pub mod xmp;

pub use crate::error::DecodeError;
pub use crate::exif::evaldiv;
pub use crate::gps::{convert_latlon, dms_to_decimal};
pub use crate::header::{MetadataRecord, RawPixels};
pub use crate::image::{factory, Decoded, SourceDocument};
pub use crate::vendor::Vendor;
