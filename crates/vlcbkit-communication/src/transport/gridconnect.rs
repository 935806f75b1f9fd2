//! GridConnect frame codec
//!
//! GridConnect is the ASCII encoding of CAN frames spoken by most USB and
//! network bus adapters. A standard data frame looks like
//! `:S<header>N<data>;` where the header is four hex digits holding the
//! 11-bit CAN identifier shifted left by five bits, and data is up to eight
//! bytes as hex pairs. The CAN identifier carries a four-bit priority above
//! the seven-bit CAN id of the sending node.

use vlcbkit_core::{TransportError, TransportResult, VlcbFrame, MAX_DATA_BYTES};

/// Priority used for ordinary traffic.
pub const DEFAULT_PRIORITY: u8 = 0b1011;

/// A decoded GridConnect frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConnectFrame {
    /// Seven-bit CAN id of the sender
    pub can_id: u8,
    /// Four-bit arbitration priority
    pub priority: u8,
    /// The carried VLCB frame
    pub frame: VlcbFrame,
}

/// Encode `frame` as sent by the node with `can_id`, at default priority
pub fn encode(frame: &VlcbFrame, can_id: u8) -> TransportResult<String> {
    encode_with_priority(frame, can_id, DEFAULT_PRIORITY)
}

/// Encode `frame` with an explicit priority
pub fn encode_with_priority(frame: &VlcbFrame, can_id: u8, priority: u8) -> TransportResult<String> {
    if frame.is_empty() {
        return Err(TransportError::Encode {
            reason: "frame has no opcode".to_string(),
        });
    }

    let identifier = (u16::from(priority & 0x0F) << 7) | u16::from(can_id & 0x7F);
    let header = identifier << 5;

    let mut line = format!(":S{:04X}N", header);
    for byte in frame.as_wire() {
        line.push_str(&format!("{:02X}", byte));
    }
    line.push(';');
    Ok(line)
}

/// Decode one GridConnect frame.
///
/// Surrounding whitespace is ignored. Extended and remote frames are
/// rejected since VLCB traffic uses standard data frames only.
pub fn decode(line: &str) -> TransportResult<GridConnectFrame> {
    let text = line.trim();
    let body = text
        .strip_prefix(':')
        .and_then(|rest| rest.strip_suffix(';'))
        .ok_or_else(|| decode_error(format!("not a GridConnect frame: {:?}", text)))?;

    let body = match body.as_bytes().first() {
        Some(b'S') => &body[1..],
        Some(b'X') => return Err(decode_error("extended frames are not supported")),
        _ => return Err(decode_error(format!("unknown frame type in {:?}", text))),
    };

    let (header, rest) = body
        .split_once(|c: char| c == 'N' || c == 'R')
        .ok_or_else(|| decode_error(format!("missing frame kind in {:?}", text)))?;
    if body.as_bytes().get(header.len()) == Some(&b'R') {
        return Err(decode_error("remote frames are not supported"));
    }

    if header.is_empty() || header.len() > 4 {
        return Err(decode_error(format!("bad header {:?}", header)));
    }
    let header = u16::from_str_radix(header, 16)
        .map_err(|e| decode_error(format!("bad header {:?}: {}", header, e)))?;
    let identifier = header >> 5;

    let bytes = parse_hex(rest)?;
    if bytes.is_empty() {
        return Err(decode_error("frame has no opcode"));
    }
    if bytes.len() > MAX_DATA_BYTES + 1 {
        return Err(decode_error(format!("{} data bytes", bytes.len())));
    }
    let frame = VlcbFrame::from_bytes(&bytes).map_err(|e| decode_error(e.to_string()))?;

    Ok(GridConnectFrame {
        can_id: (identifier & 0x7F) as u8,
        priority: ((identifier >> 7) & 0x0F) as u8,
        frame,
    })
}

fn parse_hex(text: &str) -> TransportResult<Vec<u8>> {
    if text.len() % 2 != 0 {
        return Err(decode_error(format!("odd number of hex digits in {:?}", text)));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| decode_error(format!("bad data {:?}", text)))
        })
        .collect()
}

fn decode_error(reason: impl Into<String>) -> TransportError {
    TransportError::Decode {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlcbkit_core::opcodes;

    #[test]
    fn test_encode_default_priority() {
        let frame = VlcbFrame::with_node_number(opcodes::ACON, 0x0104, &[0x00, 0x01]).unwrap();
        assert_eq!(encode(&frame, 1).unwrap(), ":SB020N9001040001;");
    }

    #[test]
    fn test_encode_rejects_empty_frame() {
        assert!(matches!(
            encode(&VlcbFrame::empty(), 1),
            Err(TransportError::Encode { .. })
        ));
    }

    #[test]
    fn test_decode_standard_frame() {
        let decoded = decode(" :SB020N9001040001;\r\n").unwrap();
        assert_eq!(decoded.can_id, 1);
        assert_eq!(decoded.priority, DEFAULT_PRIORITY);
        assert_eq!(decoded.frame.opcode(), opcodes::ACON);
        assert_eq!(decoded.frame.payload(), &[0x01, 0x04, 0x00, 0x01]);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for line in [
            "SB020N90;",
            ":SB020N9;",
            ":SB020N;",
            ":SB020RN;",
            ":SB020R;",
            ":X00080004N00;",
            ":SB020N00112233445566778899;",
            ":SZZZZN90;",
            ":SB020N9G;",
        ] {
            assert!(
                matches!(decode(line), Err(TransportError::Decode { .. })),
                "{} should not decode",
                line
            );
        }
    }
}
