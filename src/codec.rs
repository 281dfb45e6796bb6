//! Wire framing for the controller protocol.
//!
//! Command frames and the state reply end in a checksum byte holding the
//! wrapping sum of every byte before it. Discovery uses plain ASCII datagrams
//! instead.

use std::net::IpAddr;

use crate::config::device_addr;
use crate::device::DiscoveredDevice;
use crate::errors::Error;
use crate::snapshot::DeviceSnapshot;
use crate::types::{Color, PowerState};

type Result<T> = std::result::Result<T, Error>;

pub const OP_SET_COLOR: u8 = 0x31;
pub const OP_SET_POWER: u8 = 0x71;
pub const OP_QUERY_STATE: u8 = 0x81;

/// Trailer marking a command as sent from a local (LAN) client.
const LOCAL: u8 = 0x0f;

/// Length of a state reply, checksum included.
pub const STATE_REPLY_LEN: usize = 14;

/// Request broadcast to solicit discovery replies.
pub const DISCOVERY_REQUEST: &[u8] = b"HF-A11ASSISTHREAD";

const DISCOVERY_DELIMITER: char = ',';

/// Additive checksum over `bytes`, mod 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

fn seal<const N: usize>(mut frame: [u8; N]) -> [u8; N] {
    frame[N - 1] = checksum(&frame[..N - 1]);
    frame
}

/// Encode a set-color command: `31 R G B W 00 0F cs`.
pub fn encode_set_color(color: &Color) -> [u8; 8] {
    let [r, g, b, w] = color.channels();
    seal([OP_SET_COLOR, r, g, b, w, 0x00, LOCAL, 0])
}

/// Encode a power command: `71 P 0F cs`.
pub fn encode_set_power(power: PowerState) -> [u8; 4] {
    seal([OP_SET_POWER, power.byte(), LOCAL, 0])
}

/// Encode the parameterless state query: `81 8A 8B 96`.
pub fn encode_query_state() -> [u8; 4] {
    seal([OP_QUERY_STATE, 0x8a, 0x8b, 0])
}

/// Encode a state reply the way a controller sends it.
///
/// Fields the client does not interpret (device type, mode, speed, firmware
/// version) carry the values a static-color RGBW strip reports.
pub fn encode_state_reply(snapshot: &DeviceSnapshot) -> [u8; STATE_REPLY_LEN] {
    let [r, g, b, w] = snapshot.color().channels();
    seal([
        OP_QUERY_STATE,
        0x04,
        snapshot.power().byte(),
        0x61,
        0x21,
        0x01,
        r,
        g,
        b,
        w,
        0x03,
        0x00,
        LOCAL,
        0,
    ])
}

/// Decode a state reply into a snapshot.
///
/// Length and checksum are verified before the opcode is looked at, so a
/// corrupted type byte reports as [`Error::MalformedFrame`].
pub fn decode_reply(bytes: &[u8]) -> Result<DeviceSnapshot> {
    if bytes.len() != STATE_REPLY_LEN {
        return Err(Error::malformed(format!(
            "expected {} bytes, got {}",
            STATE_REPLY_LEN,
            bytes.len()
        )));
    }

    let (body, trailer) = bytes.split_at(STATE_REPLY_LEN - 1);
    let expected = checksum(body);
    if trailer[0] != expected {
        return Err(Error::malformed(format!(
            "checksum {:#04x} does not match {:#04x}",
            trailer[0], expected
        )));
    }

    if body[0] != OP_QUERY_STATE {
        return Err(Error::UnknownOpcode(body[0]));
    }

    let power = PowerState::from_byte(body[2])
        .ok_or_else(|| Error::malformed(format!("unknown power byte {:#04x}", body[2])))?;
    let color = Color::rgbw(body[6], body[7], body[8], body[9]);

    Ok(DeviceSnapshot::new(power, color))
}

/// Decode an `ip,identifier,model` discovery reply.
pub fn decode_discovery_reply(bytes: &[u8]) -> Result<DiscoveredDevice> {
    let text =
        std::str::from_utf8(bytes).map_err(|e| Error::malformed(format!("not ascii: {e}")))?;
    let text = text.trim_end_matches(|c: char| c.is_whitespace() || c == '\0');

    let fields: Vec<&str> = text.split(DISCOVERY_DELIMITER).map(str::trim).collect();
    let [ip, id, model] = fields[..] else {
        return Err(Error::malformed(format!(
            "expected 3 fields in discovery reply, got {}",
            fields.len()
        )));
    };

    let ip: IpAddr = ip
        .parse()
        .map_err(|_| Error::malformed(format!("invalid address {ip:?} in discovery reply")))?;
    if id.is_empty() {
        return Err(Error::malformed("empty device identifier"));
    }

    Ok(DiscoveredDevice::new(device_addr(ip), id, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn power_strategy() -> impl Strategy<Value = PowerState> {
        prop_oneof![Just(PowerState::On), Just(PowerState::Off)]
    }

    #[test]
    fn test_encode_set_color() {
        assert_eq!(
            encode_set_color(&Color::rgbw(255, 0, 128, 0)),
            [0x31, 0xff, 0x00, 0x80, 0x00, 0x00, 0x0f, 0xbf]
        );
    }

    #[test]
    fn test_encode_set_power() {
        assert_eq!(encode_set_power(PowerState::On), [0x71, 0x23, 0x0f, 0xa3]);
        assert_eq!(encode_set_power(PowerState::Off), [0x71, 0x24, 0x0f, 0xa4]);
    }

    #[test]
    fn test_encode_query_state() {
        assert_eq!(encode_query_state(), [0x81, 0x8a, 0x8b, 0x96]);
    }

    #[test]
    fn test_decode_reply() {
        let reply = [
            0x81, 0x25, 0x23, 0x61, 0x21, 0x10, 10, 20, 30, 0, 0x09, 0x00, 0x0f, 0,
        ];
        let reply = seal(reply);
        let snapshot = decode_reply(&reply).unwrap();
        assert_eq!(snapshot.power(), PowerState::On);
        assert_eq!(snapshot.color(), &Color::rgbw(10, 20, 30, 0));
    }

    #[test]
    fn test_decode_reply_wrong_length() {
        let reply = encode_state_reply(&DeviceSnapshot::new(PowerState::On, Color::new()));
        assert!(matches!(
            decode_reply(&reply[..13]),
            Err(Error::MalformedFrame(_))
        ));
        assert!(matches!(decode_reply(&[]), Err(Error::MalformedFrame(_))));
    }

    #[test]
    fn test_decode_reply_unknown_opcode() {
        let mut reply = encode_state_reply(&DeviceSnapshot::new(PowerState::On, Color::new()));
        reply[0] = 0x42;
        let reply = seal(reply);
        assert_eq!(decode_reply(&reply), Err(Error::UnknownOpcode(0x42)));
    }

    #[test]
    fn test_decode_reply_unknown_power() {
        let mut reply = encode_state_reply(&DeviceSnapshot::new(PowerState::On, Color::new()));
        reply[2] = 0x99;
        let reply = seal(reply);
        assert!(matches!(decode_reply(&reply), Err(Error::MalformedFrame(_))));
    }

    #[test]
    fn test_decode_discovery_reply() {
        let device = decode_discovery_reply(b"192.168.1.42,ACCF23A1B2C3,AK001-ZJ200\r\n").unwrap();
        assert_eq!(device.addr().to_string(), "192.168.1.42:5577");
        assert_eq!(device.id(), "ACCF23A1B2C3");
        assert_eq!(device.model(), "AK001-ZJ200");
    }

    #[test]
    fn test_decode_discovery_reply_rejects_bad_input() {
        let cases: [&[u8]; 7] = [
            b"192.168.1.42,ACCF23A1B2C3",
            b"192.168.1.42,ACCF23A1B2C3,AK001,extra",
            b"not-an-ip,ACCF23A1B2C3,AK001",
            b"192.168.1.42,,AK001",
            b"+ok",
            b"",
            b"\xff\xfe,a,b",
        ];
        for bad in cases {
            assert!(
                matches!(decode_discovery_reply(bad), Err(Error::MalformedFrame(_))),
                "accepted {bad:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_state_reply_roundtrip(
            power in power_strategy(),
            channels in any::<[u8; 4]>(),
        ) {
            let [r, g, b, w] = channels;
            let snapshot = DeviceSnapshot::new(power, Color::rgbw(r, g, b, w));
            let decoded = decode_reply(&encode_state_reply(&snapshot)).unwrap();
            prop_assert_eq!(decoded, snapshot);
        }

        #[test]
        fn prop_single_byte_flip_is_rejected(
            power in power_strategy(),
            channels in any::<[u8; 4]>(),
            index in 0..STATE_REPLY_LEN - 1,
            flip in 1u8..=255,
        ) {
            let [r, g, b, w] = channels;
            let mut frame =
                encode_state_reply(&DeviceSnapshot::new(power, Color::rgbw(r, g, b, w)));
            frame[index] ^= flip;
            prop_assert!(matches!(decode_reply(&frame), Err(Error::MalformedFrame(_))));
        }

        #[test]
        fn prop_set_color_is_sealed(channels in any::<[u8; 4]>()) {
            let [r, g, b, w] = channels;
            let frame = encode_set_color(&Color::rgbw(r, g, b, w));
            prop_assert_eq!(&frame[1..5], &channels[..]);
            prop_assert_eq!(frame[7], checksum(&frame[..7]));
        }
    }
}
