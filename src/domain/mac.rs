//! MAC address canonicalization.
//!
//! Devices, operators and ARP tables all spell MAC addresses differently
//! (`00:50:C2:AB:AB:AB`, `0050-c2ab-abab`, `0050.c2ab.abab`). Everything the
//! hunter and the device adapters exchange uses the Cisco dotted form.

use std::fmt;
use std::str::FromStr;

use macaddr::MacAddr6;

use crate::error::AddressError;

/// Number of hex digits in a 48-bit MAC address.
const MAC_HEX_DIGITS: usize = 12;

/// A MAC address, displayed in canonical `aaaa.bbbb.cccc` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacAddress(MacAddr6);

impl MacAddress {
    /// Canonicalize an arbitrary MAC address string.
    ///
    /// Every non-hex character is discarded, the rest must be exactly 12
    /// digits long.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let digits: Vec<u8> = input
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(|d| d as u8)
            .collect();

        if digits.len() != MAC_HEX_DIGITS {
            return Err(AddressError::InvalidFormat(input.to_string()));
        }

        let mut octets = [0u8; 6];
        for (octet, pair) in octets.iter_mut().zip(digits.chunks(2)) {
            *octet = (pair[0] << 4) | pair[1];
        }
        Ok(Self(MacAddr6::from(octets)))
    }

    /// The address as octets.
    pub fn octets(&self) -> MacAddr6 {
        self.0
    }
}

impl From<MacAddr6> for MacAddress {
    fn from(mac: MacAddr6) -> Self {
        Self(mac)
    }
}

impl FromStr for MacAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0.as_bytes();
        write!(
            f,
            "{:02x}{:02x}.{:02x}{:02x}.{:02x}{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Canonicalize a MAC address string into `aaaa.bbbb.cccc`.
pub fn canonicalize_mac(input: &str) -> Result<String, AddressError> {
    MacAddress::parse(input).map(|mac| mac.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_bare_hex() {
        assert_eq!(canonicalize_mac("0050c2ababab").unwrap(), "0050.c2ab.abab");
    }

    #[test]
    fn test_canonicalize_separator_styles() {
        let expected = "0050.c2ab.abab";
        for input in [
            "00:50:C2:AB:AB:AB",
            "00-50-c2-ab-ab-ab",
            "0050.C2AB.ABAB",
            "0050c2ABabab",
            " 00 50 c2 ab ab ab ",
            "00_50_c2/ab/ab/ab",
        ] {
            assert_eq!(canonicalize_mac(input).unwrap(), expected, "input: {input}");
        }
    }

    #[test]
    fn test_canonicalize_wrong_digit_count() {
        for input in ["", "0050c2abab", "0050c2ababab00", "00:50:c2:ab:ab", "zzzz.zzzz.zzzz"] {
            assert_eq!(
                canonicalize_mac(input),
                Err(AddressError::InvalidFormat(input.to_string())),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_non_hex_letters_are_stripped_not_counted() {
        // "g" through "z" are separators as far as the canonicalizer cares
        assert_eq!(canonicalize_mac("00g50xc2ab-abab").unwrap(), "0050.c2ab.abab");
    }

    #[test]
    fn test_mac_address_from_str() {
        let mac: MacAddress = "AA:BB:CC:DD:EE:FF".parse().unwrap();
        assert_eq!(mac.octets(), MacAddr6::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff));
        assert_eq!(mac.to_string(), "aabb.ccdd.eeff");
    }

    #[test]
    fn test_octets() {
        let mac = MacAddress::parse("0050.c2ab.abab").unwrap();
        assert_eq!(mac.octets(), MacAddr6::new(0x00, 0x50, 0xc2, 0xab, 0xab, 0xab));

        let mac = MacAddress::from(MacAddr6::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff));
        assert_eq!(mac.to_string(), "aabb.ccdd.eeff");
    }

    #[test]
    fn test_notations_compare_equal() {
        let dotted = MacAddress::parse("0050.c2ab.abab").unwrap();
        let colons = MacAddress::parse("00:50:C2:AB:AB:AB").unwrap();
        assert_eq!(dotted, colons);
    }
}
