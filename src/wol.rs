use crate::hwaddr::HardwareAddr;
use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Default wake host: the limited broadcast address.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::BROADCAST);
/// Default wake port, the discard port.
pub const DEFAULT_PORT: u16 = 9;

const SYNCHRONIZATION_SCHEME: [u8; 6] = [0xff; 6];
const ADDR_REPETITIONS: usize = 16;

/// Where magic packets get sent. Not persisted; supplied per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WakeDestination {
    pub host: IpAddr,
    pub port: u16,
}

impl WakeDestination {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self { host, port }
    }

    /// Given host, default port 9.
    pub fn with_host(host: IpAddr) -> Self {
        Self {
            host,
            port: DEFAULT_PORT,
        }
    }
}

impl Default for WakeDestination {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for WakeDestination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        SocketAddr::new(self.host, self.port).fmt(f)
    }
}

/// A socket or send call failed. Packets already handed to the network
/// stack before the failure are not rolled back; UDP sends are not
/// transactional.
#[derive(thiserror::Error, Debug)]
#[error("failed to send magic packet to {dest}")]
pub struct TransmissionFailed {
    /// Destination the datagrams were addressed to.
    pub dest: WakeDestination,
    /// Address whose datagram failed, if a specific send was underway
    /// (`None` means the socket itself could not be set up).
    pub addr: Option<HardwareAddr>,
    #[source]
    pub source: io::Error,
}

/// Builds the 102-byte magic packet for one address: six bytes of `0xFF`
/// followed by the hardware address repeated sixteen times.
pub fn magic_packet(addr: HardwareAddr) -> Vec<u8> {
    let mut data: Vec<u8> = SYNCHRONIZATION_SCHEME.to_vec();
    for _ in 0..ADDR_REPETITIONS {
        data.extend(addr.octets());
    }
    data
}

/// Wakes one machine via the default broadcast destination.
pub fn wake(addr: HardwareAddr) -> Result<(), TransmissionFailed> {
    wake_all(&[addr], WakeDestination::default())
}

/// Wakes one machine via the given destination.
pub fn wake_to(addr: HardwareAddr, dest: WakeDestination) -> Result<(), TransmissionFailed> {
    wake_all(&[addr], dest)
}

/// Wakes every machine in the batch, one datagram per address, in input
/// order. A single socket is opened for the whole batch and closed when
/// this returns. The first send error aborts the remaining batch. There
/// is exactly one send attempt per address; UDP gives no delivery
/// acknowledgment, so success only means the packets were handed to the
/// network stack.
pub fn wake_all(
    addrs: &[HardwareAddr],
    dest: WakeDestination,
) -> Result<(), TransmissionFailed> {
    let socket = open_socket().map_err(|source| TransmissionFailed {
        dest,
        addr: None,
        source,
    })?;
    for &addr in addrs {
        socket
            .send_to(&magic_packet(addr), (dest.host, dest.port))
            .map_err(|source| TransmissionFailed {
                dest,
                addr: Some(addr),
                source,
            })?;
    }
    Ok(())
}

fn open_socket() -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_broadcast(true)?;
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use crate::wol::*;

    fn addr(s: &str) -> HardwareAddr {
        s.parse().unwrap()
    }

    #[test]
    fn default_destination_is_limited_broadcast_port_nine() {
        let dest = WakeDestination::default();
        assert_eq!(dest.host, IpAddr::V4(Ipv4Addr::new(255, 255, 255, 255)));
        assert_eq!(dest.port, 9);
        assert_eq!(dest.to_string(), "255.255.255.255:9");
    }

    #[test]
    fn with_host_keeps_default_port() {
        let dest = WakeDestination::with_host(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)));
        assert_eq!(dest.port, 9);
    }

    #[test]
    fn magic_packet_layout() {
        let packet = magic_packet(addr("00:11:22:33:44:55"));
        assert_eq!(packet.len(), 102);
        assert_eq!(&packet[..6], &[0xff; 6]);
        for rep in packet[6..].chunks(6) {
            assert_eq!(rep, &[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        }
    }

    #[test]
    fn magic_packet_is_deterministic() {
        let a = addr("24:4B:FE:55:78:94");
        assert_eq!(magic_packet(a), magic_packet(a));
    }

    #[test]
    fn batch_sends_one_datagram_per_address_in_order() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();
        let dest = WakeDestination::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);

        let batch = [
            addr("00:11:22:33:44:55"),
            addr("66:77:88:99:AA:BB"),
            addr("00:11:22:33:44:55"),
        ];
        wake_all(&batch, dest).unwrap();

        let mut buf = [0u8; 256];
        for expected in &batch {
            let (len, _) = receiver.recv_from(&mut buf).unwrap();
            assert_eq!(&buf[..len], magic_packet(*expected).as_slice());
        }
    }

    #[test]
    fn send_failure_reports_transmission_failed() {
        // Port 0 is not a valid UDP destination, so the send fails.
        let dest = WakeDestination::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let a = addr("00:11:22:33:44:55");
        let err = wake_to(a, dest).unwrap_err();
        assert_eq!(err.dest, dest);
        assert_eq!(err.addr, Some(a));
    }
}
