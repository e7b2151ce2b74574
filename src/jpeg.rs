//! JPEG marker segment scanner.
//!
//! Walks the raw bytes of a JPEG file and reports every occurrence of a
//! known two-byte marker together with its declared big-endian length.
//! Occurrences inside the span of an earlier top-level segment (marker
//! byte patterns showing up in entropy-coded data or nested payloads)
//! are kept but tagged as non-top-level. The unique top-level SOF0
//! segment carries the frame dimensions.

/// Second byte of every marker this scanner recognizes (the first byte
/// is always `0xFF`).
pub fn marker_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0xe0 => "APP0",
        0xe1 => "APP1",
        0xe2 => "APP2",
        0xe3 => "APP3",
        0xe4 => "APP4",
        0xe5 => "APP5",
        0xe6 => "APP6",
        0xe7 => "APP7",
        0xe8 => "APP8",
        0xe9 => "APP9",
        0xea => "APP10",
        0xeb => "APP11",
        0xec => "APP12",
        0xed => "APP13",
        0xee => "APP14",
        0xef => "APP15",
        0xc0 => "SOF0",
        0xc1 => "SOF1",
        0xc2 => "SOF2",
        0xc3 => "SOF3",
        0xc5 => "SOF5",
        0xc6 => "SOF6",
        0xc7 => "SOF7",
        0xc9 => "SOF9",
        0xca => "SOF10",
        0xcb => "SOF11",
        0xcd => "SOF13",
        0xce => "SOF14",
        0xcf => "SOF15",
        0xc4 => "DHT",
        0xdb => "DQT",
        0xda => "SOS",
        0xc8 => "JPG",
        0xf0 => "JPG0",
        0xfd => "JPG13",
        0xcc => "DAC",
        0xdc => "DNL",
        0xdd => "DRI",
        0xde => "DHP",
        0xdf => "EXP",
        0xd0 => "RST0",
        0xd1 => "RST1",
        0xd2 => "RST2",
        0xd3 => "RST3",
        0xd4 => "RST4",
        0xd5 => "RST5",
        0xd6 => "RST6",
        0xd7 => "RST7",
        0x01 => "TEM",
        0xfe => "COM",
        _ => return None,
    })
}

/// One marker occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub marker: &'static str,
    /// Byte offset of the marker itself.
    pub pos: usize,
    /// Declared segment length (big-endian u16 following the marker,
    /// covering the length field itself).
    pub len: usize,
    /// Whether this occurrence starts beyond the span of the previous
    /// top-level segment.
    pub top: bool,
}

/// Scans `data` for marker occurrences. A match consumes the marker and
/// its two length bytes; anything else advances one byte.
pub fn find_segments(data: &[u8]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut parent_end = 0usize;
    let mut i = 0usize;
    while i + 4 <= data.len() {
        if data[i] == 0xff {
            if let Some(marker) = marker_name(data[i + 1]) {
                let len = 256 * data[i + 2] as usize + data[i + 3] as usize;
                let top = i > parent_end;
                if top {
                    parent_end = i + len;
                }
                segments.push(Segment {
                    marker,
                    pos: i,
                    len,
                    top,
                });
                i += 4;
                continue;
            }
        }
        i += 1;
    }
    segments
}

/// Frame dimensions from the top-level SOF0 segment: `(width, height,
/// channels)`, or `(0, 0, 1)` when no usable SOF0 exists.
pub fn frame_size(segments: &[Segment], data: &[u8]) -> (u32, u32, u8) {
    let sof = segments.iter().find(|s| s.marker == "SOF0" && s.top);
    let decoded = sof.and_then(|s| {
        let p = s.pos;
        let payload = data.get(p + 4..p + 10)?;
        // precision byte at payload[0] is not used here
        let height = u16::from_be_bytes([payload[1], payload[2]]);
        let width = u16::from_be_bytes([payload[3], payload[4]]);
        let channels = payload[5];
        Some((width as u32, height as u32, channels))
    });
    decoded.unwrap_or((0, 0, 1))
}
