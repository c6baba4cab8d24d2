//! Device addresses.

use crate::constants::ADDRESS_SIZE;
use crate::error::MessageError;
use serde::{Deserialize, Serialize};

/// A 3-byte INSTEON device address.
///
/// Addresses are plain value types: two addresses are equal iff their bytes
/// are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; ADDRESS_SIZE]);

impl Address {
    /// Create an address from its raw bytes.
    pub fn from_bytes(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    /// Create an address from a byte slice, if it is exactly 3 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() == ADDRESS_SIZE {
            let mut addr = [0u8; ADDRESS_SIZE];
            addr.copy_from_slice(bytes);
            Some(Address(addr))
        } else {
            None
        }
    }

    /// Parse an address from a hex string, with or without dot separators
    /// ("1A2B3C" or "1A.2B.3C").
    pub fn from_hex(s: &str) -> Result<Self, MessageError> {
        let compact: String = s.chars().filter(|c| *c != '.').collect();
        let bytes =
            hex::decode(&compact).map_err(|e| MessageError::InvalidHex(e.to_string()))?;
        Address::from_slice(&bytes).ok_or_else(|| {
            MessageError::InvalidHex(format!("address must be {ADDRESS_SIZE} bytes, got {}", bytes.len()))
        })
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02X}.{:02X}.{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let addr = Address::from_hex("1A2B3C").unwrap();
        assert_eq!(addr, Address([0x1A, 0x2B, 0x3C]));

        let dotted = Address::from_hex("1a.2b.3c").unwrap();
        assert_eq!(dotted, addr);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Address::from_hex("1A2B").is_err());
        assert!(Address::from_hex("not hex").is_err());
    }

    #[test]
    fn test_display() {
        let addr = Address([0x0F, 0xA0, 0x01]);
        assert_eq!(addr.to_string(), "0F.A0.01");
    }

    #[test]
    fn test_from_slice() {
        assert_eq!(
            Address::from_slice(&[1, 2, 3]),
            Some(Address([1, 2, 3]))
        );
        assert_eq!(Address::from_slice(&[1, 2]), None);
    }
}
