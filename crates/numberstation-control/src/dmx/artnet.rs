//! Art-Net protocol implementation (ArtDmx)
//!
//! Art-Net is a UDP-based protocol for transmitting DMX512 over Ethernet.

use std::net::{IpAddr, SocketAddr, UdpSocket};

use crate::{Result, StationError};

/// Default Art-Net UDP port (0x1936)
pub const ARTNET_PORT: u16 = 0x1936;

/// Size of the ArtDmx header preceding the channel data
pub const HEADER_LEN: usize = 18;

const OP_DMX: u16 = 0x5000;
const PROTOCOL_VERSION: u16 = 14;

/// Builds ArtDmx packets for one universe and tracks the sequence number
#[derive(Debug, Clone)]
pub struct ArtDmxEncoder {
    universe: u16,
    sequence: u8,
}

impl ArtDmxEncoder {
    pub fn new(universe: u16) -> Self {
        Self {
            universe,
            sequence: 1,
        }
    }

    /// Sequence number the next packet will carry
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn universe(&self) -> u16 {
        self.universe
    }

    /// Build an ArtDmx packet and advance the sequence.
    ///
    /// Sequence 0 means "sequencing disabled", so the counter wraps 255 -> 1.
    pub fn encode(&mut self, channels: &[u8]) -> Vec<u8> {
        let mut packet = vec![0u8; HEADER_LEN + channels.len()];

        // Header: "Art-Net\0"
        packet[0..8].copy_from_slice(b"Art-Net\0");

        // OpCode: OpDmx (0x5000)
        packet[8..10].copy_from_slice(&OP_DMX.to_le_bytes());

        // Protocol version (14)
        packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());

        packet[12] = self.sequence;

        // Physical (0)
        packet[13] = 0;

        // Universe, low byte first
        packet[14..16].copy_from_slice(&self.universe.to_le_bytes());

        // Length (big-endian)
        packet[16..18].copy_from_slice(&(channels.len() as u16).to_be_bytes());

        packet[HEADER_LEN..].copy_from_slice(channels);

        self.sequence = match self.sequence {
            255 => 1,
            n => n + 1,
        };

        packet
    }
}

/// Fire-and-forget UDP sender for ArtDmx packets
#[derive(Debug)]
pub struct ArtNetSender {
    socket: UdpSocket,
    target: SocketAddr,
}

impl ArtNetSender {
    /// Create a new non-blocking Art-Net sender
    ///
    /// # Arguments
    /// * `host` - Node or broadcast IP address
    /// * `port` - Destination port, typically [`ARTNET_PORT`]
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let ip: IpAddr = host.parse()?;
        let target = SocketAddr::new(ip, port);

        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;

        tracing::info!("Art-Net sender created -> {}", target);

        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Send one packet without blocking
    pub fn send(&self, packet: &[u8]) -> Result<()> {
        let sent = self.socket.send_to(packet, self.target)?;
        if sent != packet.len() {
            return Err(StationError::DmxError(format!(
                "short send: {} of {} bytes",
                sent,
                packet.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artnet_packet_structure() {
        let mut encoder = ArtDmxEncoder::new(1);
        let packet = encoder.encode(&[0u8; 512]);

        // Check header
        assert_eq!(&packet[0..8], b"Art-Net\0");

        // Check OpCode (little-endian)
        assert_eq!(packet[8], 0x00);
        assert_eq!(packet[9], 0x50);

        // Check protocol version (big-endian)
        assert_eq!(packet[10], 0);
        assert_eq!(packet[11], 14);

        assert_eq!(packet[12], 1);
        assert_eq!(packet[13], 0);

        // Universe low, high
        assert_eq!(packet[14], 1);
        assert_eq!(packet[15], 0);

        // Check length (big-endian)
        assert_eq!(packet[16], 0x02);
        assert_eq!(packet[17], 0x00);

        // Total packet size
        assert_eq!(packet.len(), HEADER_LEN + 512);
        assert!(packet[HEADER_LEN..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_length_follows_universe_size() {
        let mut encoder = ArtDmxEncoder::new(0x0102);
        let packet = encoder.encode(&[7u8; 264]);

        assert_eq!(packet[14], 0x02);
        assert_eq!(packet[15], 0x01);
        assert_eq!(u16::from_be_bytes([packet[16], packet[17]]), 264);
        assert_eq!(packet.len(), HEADER_LEN + 264);
    }

    #[test]
    fn test_sequence_wraps_to_one() {
        let mut encoder = ArtDmxEncoder::new(0);
        let channels = [0u8; 4];

        for expected in 1..=255u8 {
            assert_eq!(encoder.encode(&channels)[12], expected);
        }
        assert_eq!(encoder.sequence(), 1);
        assert_eq!(encoder.encode(&channels)[12], 1);
    }

    #[test]
    fn test_sender_creation() {
        let sender = ArtNetSender::new("127.0.0.1", ARTNET_PORT).unwrap();
        assert_eq!(sender.target().port(), 6454);
    }

    #[test]
    fn test_invalid_target() {
        assert!(ArtNetSender::new("invalid", ARTNET_PORT).is_err());
    }

    #[test]
    fn test_send_reaches_listener() {
        let listener = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let sender = ArtNetSender::new("127.0.0.1", port).unwrap();

        let packet = ArtDmxEncoder::new(1).encode(&[1, 2, 3]);
        sender.send(&packet).unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = listener.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], packet.as_slice());
    }
}
