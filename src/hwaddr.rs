use std::fmt;
use std::str::FromStr;

const OCTETS: usize = 6;
const DELIMITER: char = ':';

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0:?} is not a valid hardware address")]
    InvalidFormat(String),
    #[error("a hardware address is exactly 6 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 48-bit Ethernet hardware address.
///
/// The canonical text form is six colon-separated uppercase hex octets,
/// e.g. `00:50:95:10:95:F5`. Parsing accepts either case.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HardwareAddr([u8; OCTETS]);

impl HardwareAddr {
    /// Copies the address out of a raw byte buffer, which must be
    /// exactly 6 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != OCTETS {
            return Err(Error::InvalidLength(bytes.len()));
        }
        let mut octets = [0u8; OCTETS];
        octets.copy_from_slice(bytes);
        Ok(Self(octets))
    }

    /// Returns a copy of the raw bytes.
    pub fn octets(&self) -> [u8; OCTETS] {
        self.0
    }
}

impl FromStr for HardwareAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let mut octets = [0u8; OCTETS];
        let mut segments = 0;
        for (i, segment) in s.split(DELIMITER).enumerate() {
            if i >= OCTETS {
                return Err(Error::InvalidFormat(s.to_string()));
            }
            octets[i] = u8::from_str_radix(segment, 16)
                .map_err(|_| Error::InvalidFormat(s.to_string()))?;
            segments = i + 1;
        }
        if segments != OCTETS {
            return Err(Error::InvalidFormat(s.to_string()));
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl fmt::Debug for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HardwareAddr({})", self)
    }
}
