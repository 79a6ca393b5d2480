//! Encryption envelope for requests and responses.
//!
//! Every XML payload is padded with ISO/IEC 7816-4 (`0x80` then zeros),
//! encrypted with AES-128-CBC under a fixed key, and sent as
//! `base64(iv ++ ciphertext)`. There is no key exchange.

use crate::constants::{KEY_SIZE, PADDING_MARKER, STATIC_KEY};
use crate::error::KirigamineError;
use aes::Aes128;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

/// AES-128 key used for the envelope
#[derive(Clone, PartialEq, Eq)]
pub struct EnvelopeKey([u8; KEY_SIZE]);

impl EnvelopeKey {
    /// Build a key from an arbitrary secret: shorter secrets are zero-padded,
    /// longer ones truncated to 16 bytes.
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut key = [0u8; KEY_SIZE];
        let len = secret.len().min(KEY_SIZE);
        key[..len].copy_from_slice(&secret[..len]);
        Self(key)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    fn cipher(&self) -> Aes128 {
        Aes128::new(&self.0.into())
    }
}

impl Default for EnvelopeKey {
    fn default() -> Self {
        Self(*STATIC_KEY)
    }
}

impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EnvelopeKey(..)")
    }
}

/// IV and ciphertext as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: [u8; KEY_SIZE],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Pad and encrypt `plaintext`. A random IV is drawn when none is given.
    pub fn seal(plaintext: &str, key: &EnvelopeKey, iv: Option<[u8; KEY_SIZE]>) -> Self {
        let iv = iv.unwrap_or_else(rand::random);
        let mut ciphertext = pad_iso7816(plaintext.as_bytes());
        cbc_encrypt(&key.cipher(), &iv, &mut ciphertext);
        Self { iv, ciphertext }
    }

    /// Decrypt, strip the padding and decode as UTF-8.
    pub fn open(&self, key: &EnvelopeKey) -> Result<String, KirigamineError> {
        let mut plaintext = self.ciphertext.clone();
        cbc_decrypt(&key.cipher(), &self.iv, &mut plaintext);
        debug!(len = plaintext.len(), "Decrypted raw payload");

        let unpadded_len = unpad_iso7816(&plaintext)?.len();
        plaintext.truncate(unpadded_len);
        Ok(String::from_utf8(plaintext)?)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, KirigamineError> {
        let raw = STANDARD.decode(encoded.trim())?;
        debug!(base64_len = encoded.len(), raw_len = raw.len(), "Decoding envelope");

        if raw.len() < KEY_SIZE {
            return Err(KirigamineError::Decode(format!(
                "envelope of {} bytes has no room for an IV",
                raw.len()
            )));
        }
        let (iv, ciphertext) = raw.split_at(KEY_SIZE);
        if ciphertext.is_empty() || ciphertext.len() % KEY_SIZE != 0 {
            return Err(KirigamineError::Decode(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                KEY_SIZE
            )));
        }

        let mut iv_bytes = [0u8; KEY_SIZE];
        iv_bytes.copy_from_slice(iv);
        debug!(iv = %hex::encode(iv_bytes), "Envelope IV");
        Ok(Self {
            iv: iv_bytes,
            ciphertext: ciphertext.to_vec(),
        })
    }

    pub fn to_base64(&self) -> String {
        let mut raw = Vec::with_capacity(KEY_SIZE + self.ciphertext.len());
        raw.extend_from_slice(&self.iv);
        raw.extend_from_slice(&self.ciphertext);
        STANDARD.encode(raw)
    }
}

/// Encrypt a plaintext payload into the base64 form sent to the adaptor.
pub fn encrypt_payload(plaintext: &str, key: &EnvelopeKey, iv: Option<[u8; KEY_SIZE]>) -> String {
    Envelope::seal(plaintext, key, iv).to_base64()
}

/// Decrypt a base64 envelope received from the adaptor.
pub fn decrypt_payload(encoded: &str, key: &EnvelopeKey) -> Result<String, KirigamineError> {
    Envelope::from_base64(encoded)?.open(key)
}

/// ISO/IEC 7816-4 padding: a `0x80` marker then zeros up to the next block
/// boundary. Aligned input still gets a full padding block.
pub fn pad_iso7816(data: &[u8]) -> Vec<u8> {
    let padded_len = (data.len() / KEY_SIZE + 1) * KEY_SIZE;
    let mut padded = Vec::with_capacity(padded_len);
    padded.extend_from_slice(data);
    padded.push(PADDING_MARKER);
    padded.resize(padded_len, 0);
    padded
}

/// Strip ISO/IEC 7816-4 padding: trailing zeros, then exactly one `0x80`.
pub fn unpad_iso7816(data: &[u8]) -> Result<&[u8], KirigamineError> {
    let marker = data
        .iter()
        .rposition(|&b| b != 0)
        .ok_or_else(|| KirigamineError::Decode("padding marker not found".to_string()))?;

    if data[marker] != PADDING_MARKER {
        return Err(KirigamineError::Decode(format!(
            "expected padding marker 0x80, found 0x{:02x}",
            data[marker]
        )));
    }
    if data.len() - marker > KEY_SIZE {
        return Err(KirigamineError::Decode(format!(
            "padding of {} bytes exceeds one block",
            data.len() - marker
        )));
    }
    Ok(&data[..marker])
}

fn cbc_encrypt(cipher: &Aes128, iv: &[u8; KEY_SIZE], data: &mut [u8]) {
    let mut previous = *iv;
    for block in data.chunks_exact_mut(KEY_SIZE) {
        for (b, p) in block.iter_mut().zip(previous.iter()) {
            *b ^= p;
        }
        cipher.encrypt_block(block.into());
        previous.copy_from_slice(block);
    }
}

fn cbc_decrypt(cipher: &Aes128, iv: &[u8; KEY_SIZE], data: &mut [u8]) {
    let mut previous = *iv;
    for block in data.chunks_exact_mut(KEY_SIZE) {
        let mut current = [0u8; KEY_SIZE];
        current.copy_from_slice(block);
        cipher.decrypt_block(block.into());
        for (b, p) in block.iter_mut().zip(previous.iter()) {
            *b ^= p;
        }
        previous = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_IV: [u8; KEY_SIZE] = [0; KEY_SIZE];

    #[test]
    fn test_known_ciphertexts() {
        let key = EnvelopeKey::default();
        let cases = [
            ("A", ZERO_IV, "AAAAAAAAAAAAAAAAAAAAAIT5vD/rsXTBfN0pB8TPkxc="),
            ("A", [0x01; KEY_SIZE], "AQEBAQEBAQEBAQEBAQEBAarATh0bybQe2zZhADpDvQQ="),
            ("B", ZERO_IV, "AAAAAAAAAAAAAAAAAAAAAPmn52wIefATSMKaGbP0/bk="),
        ];
        for (plain, iv, expected) in cases {
            let encrypted = encrypt_payload(plain, &key, Some(iv));
            assert_eq!(encrypted, expected);
            assert_eq!(decrypt_payload(&encrypted, &key).unwrap(), plain);
        }
    }

    #[test]
    fn test_padding_block_boundaries() {
        let key = EnvelopeKey::default();
        let cases = [
            ("A".repeat(15), "AAAAAAAAAAAAAAAAAAAAAMvpLQLHDQAG1qremOilhhQ="),
            (
                "A".repeat(16),
                "AAAAAAAAAAAAAAAAAAAAACzlU7obsl2kJ0Q7LuPErLogiP/E99wLWbwOvLS48OHt",
            ),
            (
                "A".repeat(17),
                "AAAAAAAAAAAAAAAAAAAAACzlU7obsl2kJ0Q7LuPErLrOVkkQTm+1G0tfe1fsFb87",
            ),
        ];
        for (plain, expected) in cases {
            let encrypted = encrypt_payload(&plain, &key, Some(ZERO_IV));
            assert_eq!(encrypted, expected);
            assert_eq!(decrypt_payload(&encrypted, &key).unwrap(), plain);
        }
    }

    #[test]
    fn test_pad_lengths() {
        assert_eq!(pad_iso7816(b""), {
            let mut v = vec![0x80];
            v.resize(16, 0);
            v
        });
        assert_eq!(pad_iso7816(&[0x41; 15]).len(), 16);
        assert_eq!(pad_iso7816(&[0x41; 16]).len(), 32);
        assert_eq!(pad_iso7816(&[0x41; 16])[16], 0x80);
    }

    #[test]
    fn test_unpad_rejects_malformed() {
        assert!(unpad_iso7816(&[0u8; 16]).is_err());
        assert!(unpad_iso7816(&[0x41, 0x42, 0x00, 0x00]).is_err());
        let mut long = vec![0x41, 0x80];
        long.resize(40, 0);
        assert!(unpad_iso7816(&long).is_err());
        assert_eq!(unpad_iso7816(&[0x41, 0x80, 0x00]).unwrap(), &[0x41]);
    }

    #[test]
    fn test_key_normalisation() {
        assert_eq!(EnvelopeKey::from_secret(b"unregistered"), EnvelopeKey::default());
        let long = EnvelopeKey::from_secret(b"0123456789abcdefXYZ");
        assert_eq!(long.as_bytes(), b"0123456789abcdef");
    }

    #[test]
    fn test_random_iv_round_trip() {
        let key = EnvelopeKey::from_secret(b"some other key");
        let plain = "<CSV><CONNECT>ON</CONNECT></CSV>";
        let first = encrypt_payload(plain, &key, None);
        let second = encrypt_payload(plain, &key, None);
        assert_ne!(first, second);
        assert_eq!(decrypt_payload(&first, &key).unwrap(), plain);
        assert_eq!(decrypt_payload(&second, &key).unwrap(), plain);
    }

    #[test]
    fn test_decrypt_rejects_bad_input() {
        let key = EnvelopeKey::default();
        assert!(decrypt_payload("not base64!", &key).unwrap_err().is_decode_error());
        // IV only
        assert!(decrypt_payload("AAAAAAAAAAAAAAAAAAAAAA==", &key).unwrap_err().is_decode_error());
        // Wrong key leaves garbage without a valid marker or UTF-8
        let encrypted = encrypt_payload("A", &key, Some(ZERO_IV));
        let wrong = EnvelopeKey::from_secret(b"wrong");
        assert!(decrypt_payload(&encrypted, &wrong).is_err());
    }
}
