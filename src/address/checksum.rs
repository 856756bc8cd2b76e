//! EIP-55 mixed-case checksum encoding

use sha3::{Digest, Keccak256};

/// Checksummed rendering of a `0x`-prefixed 40-digit address
pub fn to_checksum(address: &str) -> String {
    let digits = address.trim_start_matches("0x").to_ascii_lowercase();
    let digest = hex::encode(Keccak256::digest(digits.as_bytes()));

    let mut out = String::with_capacity(digits.len() + 2);
    out.push_str("0x");
    for (ch, nibble) in digits.chars().zip(digest.chars()) {
        let upper = ch.is_ascii_alphabetic() && nibble.to_digit(16).unwrap_or(0) >= 8;
        out.push(if upper { ch.to_ascii_uppercase() } else { ch });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eip55_vectors() {
        let vectors = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];
        for expected in vectors {
            assert_eq!(to_checksum(&expected.to_ascii_lowercase()), expected);
            assert_eq!(to_checksum(&expected.to_ascii_uppercase().replace("0X", "0x")), expected);
        }
    }

    #[test]
    fn test_single_case_vectors_stay_single_case() {
        assert_eq!(
            to_checksum("0x52908400098527886e0f7030069857d2e4169ee7"),
            "0x52908400098527886E0F7030069857D2E4169EE7"
        );
        assert_eq!(
            to_checksum("0xDE709F2102306220921060314715629080E2FB77"),
            "0xde709f2102306220921060314715629080e2fb77"
        );
    }

    #[test]
    fn test_digits_only_address_is_unchanged() {
        let zero = "0x0000000000000000000000000000000000000000";
        assert_eq!(to_checksum(zero), zero);
    }
}
