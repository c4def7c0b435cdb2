//! DSA host-key parameter compliance.
//!
//! JetStream switches present a DSA host key whose modulus is not one of
//! the FIPS 186 sizes, which strict validators reject outright. Instead of
//! loosening validation globally, the check lives here and is applied per
//! connection: subgroup size and generator sanity are always enforced,
//! while the modulus-size check is skipped only when the connection was
//! configured with `allow_legacy_dsa`.

use russh::keys::ssh_key::public::DsaPublicKey;

/// Validate DSA domain parameters.
///
/// Returns the rejection reason when the parameters are unacceptable under
/// the given policy.
pub(crate) fn validate_dsa_parameters(
    key: &DsaPublicKey,
    allow_legacy: bool,
) -> Result<(), String> {
    let p = magnitude(key.p.as_bytes());
    let q = magnitude(key.q.as_bytes());
    let g = magnitude(key.g.as_bytes());

    if !matches!(bit_length(q), 160 | 256) {
        return Err("q must be exactly 160 or 256 bits long".to_string());
    }

    // 1 < g < p
    if cmp_magnitude(g, &[1]) != std::cmp::Ordering::Greater
        || cmp_magnitude(g, p) != std::cmp::Ordering::Less
    {
        return Err("g, p don't satisfy 1 < g < p".to_string());
    }

    if !allow_legacy && !matches!(bit_length(p), 1024 | 2048 | 3072) {
        return Err("p must be exactly 1024, 2048, or 3072 bits long".to_string());
    }

    Ok(())
}

/// Strip sign/padding zeros off a big-endian mpint encoding.
fn magnitude(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Bit length of a big-endian magnitude.
fn bit_length(magnitude: &[u8]) -> usize {
    match magnitude.first() {
        None => 0,
        Some(&first) => magnitude.len() * 8 - first.leading_zeros() as usize,
    }
}

/// Compare two big-endian magnitudes.
fn cmp_magnitude(a: &[u8], b: &[u8]) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use russh::keys::ssh_key::Mpint;

    use super::*;

    #[test]
    fn test_bit_length() {
        assert_eq!(bit_length(&[]), 0);
        assert_eq!(bit_length(&[0x01]), 1);
        assert_eq!(bit_length(&[0x80]), 8);
        assert_eq!(bit_length(&[0x01, 0x00]), 9);
        // 160-bit q: 20 bytes with the top bit set
        let q = [0x80u8; 20];
        assert_eq!(bit_length(&q), 160);
    }

    #[test]
    fn test_magnitude_strips_sign_byte() {
        assert_eq!(magnitude(&[0x00, 0x80, 0x01]), &[0x80, 0x01]);
        assert_eq!(magnitude(&[0x00, 0x00]), &[] as &[u8]);
    }

    #[test]
    fn test_cmp_magnitude() {
        assert_eq!(cmp_magnitude(&[0x02], &[0x01]), Ordering::Greater);
        assert_eq!(cmp_magnitude(&[0x01, 0x00], &[0xff]), Ordering::Greater);
        assert_eq!(cmp_magnitude(&[0x7f], &[0x80]), Ordering::Less);
    }

    fn test_key(p_bytes: usize, q_bytes: usize) -> DsaPublicKey {
        let p = vec![0x80u8; p_bytes];
        let q = vec![0x80u8; q_bytes];
        DsaPublicKey {
            p: Mpint::from_positive_bytes(&p).unwrap(),
            q: Mpint::from_positive_bytes(&q).unwrap(),
            g: Mpint::from_positive_bytes(&[0x02]).unwrap(),
            y: Mpint::from_positive_bytes(&[0x02]).unwrap(),
        }
    }

    #[test]
    fn test_compliant_key_accepted() {
        let key = test_key(128, 20); // 1024-bit p, 160-bit q
        assert!(validate_dsa_parameters(&key, false).is_ok());
        assert!(validate_dsa_parameters(&key, true).is_ok());
    }

    #[test]
    fn test_undersized_p_requires_opt_in() {
        let key = test_key(64, 20); // 512-bit p, as shipped by the firmware
        assert!(validate_dsa_parameters(&key, false).is_err());
        assert!(validate_dsa_parameters(&key, true).is_ok());
    }

    #[test]
    fn test_bad_q_rejected_even_with_opt_in() {
        let key = test_key(128, 16); // 128-bit q
        assert!(validate_dsa_parameters(&key, true).is_err());
    }
}
