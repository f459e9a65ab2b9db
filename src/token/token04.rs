//! Version 04 call-authorization tokens.
//!
//! Binary layout before base64:
//!
//! ```text
//! expire (u32 BE) | iv length (u16 BE) | iv | ciphertext length (u16 BE) | ciphertext
//! ```
//!
//! The ciphertext is the JSON encoded [`TokenInfo`] under AES-128-CBC with
//! PKCS#7 padding, keyed by the first 16 bytes of the 32 character secret.

use aes::Aes128;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

pub const VERSION: &str = "04";
pub const DEFAULT_EFFECTIVE_TIME: u32 = 3600;

const SECRET_LENGTH: usize = 32;
const KEY_LENGTH: usize = 16;
const IV_LENGTH: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("secret must be 32 characters")]
    InvalidConfiguration,
    #[error("encoding error: {0}")]
    Encoding(&'static str),
    #[error("cipher error: {0}")]
    Crypto(String),
    #[error("malformed token: {0}")]
    Malformed(&'static str),
    #[error("claims error: {0}")]
    Claims(#[from] serde_json::Error),
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Capability flags, serialised as `{"1": 1, "2": 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Privilege {
    #[serde(rename = "1")]
    pub login_room: u8,
    #[serde(rename = "2")]
    pub publish_stream: u8,
}

impl Privilege {
    pub const ALL: Privilege = Privilege {
        login_room: 1,
        publish_stream: 1,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub app_id: u32,
    pub user_id: String,
    pub nonce: i32,
    pub ctime: i64,
    pub expire: i64,
    pub payload: String,
    pub privilege: Privilege,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub expire: u32,
    pub info: TokenInfo,
}

pub fn generate_token04(
    app_id: u32,
    user_id: &str,
    secret: &str,
    effective_time_in_seconds: u32,
    payload: &str,
) -> Result<String, TokenError> {
    let key = key_from_secret(secret)?;

    let ctime = Utc::now().timestamp();
    let info = TokenInfo {
        app_id,
        user_id: user_id.to_owned(),
        nonce: OsRng.gen_range(0..i32::MAX),
        ctime,
        expire: ctime + i64::from(effective_time_in_seconds),
        payload: payload.to_owned(),
        privilege: Privilege::ALL,
    };

    let mut iv = [0u8; IV_LENGTH];
    OsRng.fill_bytes(&mut iv);

    seal(&info, key, &iv)
}

pub fn decode_token04(token: &str, secret: &str) -> Result<DecodedToken, TokenError> {
    let key = key_from_secret(secret)?;

    let encoded = token
        .strip_prefix(VERSION)
        .ok_or(TokenError::Malformed("unsupported version"))?;
    let bytes = BASE64.decode(encoded)?;

    let (expire, rest) = take_u32(&bytes)?;
    let (iv_length, rest) = take_u16(rest)?;
    let (iv, rest) = take(rest, iv_length as usize)?;
    let (ciphertext_length, rest) = take_u16(rest)?;
    let (ciphertext, rest) = take(rest, ciphertext_length as usize)?;

    if !rest.is_empty() {
        return Err(TokenError::Malformed("trailing bytes"));
    }

    let plaintext = Aes128CbcDec::new_from_slices(key, iv)
        .map_err(|e| TokenError::Crypto(e.to_string()))?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| TokenError::Crypto(e.to_string()))?;

    Ok(DecodedToken {
        expire,
        info: serde_json::from_slice(&plaintext)?,
    })
}

fn key_from_secret(secret: &str) -> Result<&[u8], TokenError> {
    if secret.chars().count() != SECRET_LENGTH {
        return Err(TokenError::InvalidConfiguration);
    }

    Ok(&secret.as_bytes()[..KEY_LENGTH])
}

fn seal(info: &TokenInfo, key: &[u8], iv: &[u8; IV_LENGTH]) -> Result<String, TokenError> {
    let expire = u32::try_from(info.expire)
        .map_err(|_| TokenError::Encoding("expiry does not fit in 4 bytes"))?;

    let plaintext = serde_json::to_vec(info)?;

    let ciphertext = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|e| TokenError::Crypto(e.to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);

    let ciphertext_length = u16::try_from(ciphertext.len())
        .map_err(|_| TokenError::Encoding("ciphertext longer than 65535 bytes"))?;

    let mut binary = Vec::with_capacity(4 + 2 + IV_LENGTH + 2 + ciphertext.len());
    binary.extend_from_slice(&expire.to_be_bytes());
    binary.extend_from_slice(&(IV_LENGTH as u16).to_be_bytes());
    binary.extend_from_slice(iv);
    binary.extend_from_slice(&ciphertext_length.to_be_bytes());
    binary.extend_from_slice(&ciphertext);

    Ok(format!("{VERSION}{}", BASE64.encode(binary)))
}

fn take(bytes: &[u8], n: usize) -> Result<(&[u8], &[u8]), TokenError> {
    bytes
        .split_at_checked(n)
        .ok_or(TokenError::Malformed("truncated"))
}

fn take_u16(bytes: &[u8]) -> Result<(u16, &[u8]), TokenError> {
    let (head, rest) = take(bytes, 2)?;
    Ok((u16::from_be_bytes([head[0], head[1]]), rest))
}

fn take_u32(bytes: &[u8]) -> Result<(u32, &[u8]), TokenError> {
    let (head, rest) = take(bytes, 4)?;
    Ok((u32::from_be_bytes([head[0], head[1], head[2], head[3]]), rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "01234567890123456789012345678901";

    #[test]
    fn example_token_carries_expected_claims() {
        let token = generate_token04(1000, "user-42", SECRET, 60, "").unwrap();
        assert!(token.starts_with("04"));

        let decoded = decode_token04(&token, SECRET).unwrap();
        assert_eq!(decoded.info.app_id, 1000);
        assert_eq!(decoded.info.user_id, "user-42");
        assert_eq!(decoded.info.expire - decoded.info.ctime, 60);
        assert_eq!(decoded.info.privilege, Privilege::ALL);
    }

    #[test]
    fn plaintext_claims_serialise_privilege_as_string_keys() {
        let token = generate_token04(7, "abc", SECRET, DEFAULT_EFFECTIVE_TIME, "ctx").unwrap();
        let decoded = decode_token04(&token, SECRET).unwrap();

        let claims = serde_json::to_value(&decoded.info).unwrap();
        assert_eq!(claims["privilege"], serde_json::json!({"1": 1, "2": 1}));
        assert_eq!(claims["payload"], "ctx");
    }

    #[test]
    fn expiry_prefix_matches_claims() {
        let token = generate_token04(1, "u", SECRET, 900, "").unwrap();
        let binary = BASE64.decode(&token[2..]).unwrap();

        let expire = u32::from_be_bytes([binary[0], binary[1], binary[2], binary[3]]);
        let decoded = decode_token04(&token, SECRET).unwrap();

        assert_eq!(i64::from(expire), decoded.info.ctime + 900);
        assert_eq!(expire, decoded.expire);
        assert_eq!(u16::from_be_bytes([binary[4], binary[5]]), 16);
    }

    #[test]
    fn ciphertext_length_is_block_aligned() {
        let token = generate_token04(1, "user", SECRET, 60, "").unwrap();
        let binary = BASE64.decode(&token[2..]).unwrap();

        let ciphertext_length = u16::from_be_bytes([binary[22], binary[23]]) as usize;
        assert_eq!(ciphertext_length % 16, 0);
        assert_eq!(binary.len(), 24 + ciphertext_length);
    }

    #[test]
    fn successive_tokens_differ_but_agree_on_claims() {
        let first = generate_token04(5, "same", SECRET, 60, "").unwrap();
        let second = generate_token04(5, "same", SECRET, 60, "").unwrap();
        assert_ne!(first, second);

        let a = decode_token04(&first, SECRET).unwrap().info;
        let b = decode_token04(&second, SECRET).unwrap().info;
        assert_eq!(a.app_id, b.app_id);
        assert_eq!(a.user_id, b.user_id);
        assert_eq!(a.payload, b.payload);
        assert_eq!(a.privilege, b.privilege);
        assert!((a.ctime - b.ctime).abs() <= 1);
    }

    #[test]
    fn secret_of_wrong_length_is_rejected() {
        for secret in ["", "short", "012345678901234567890123456789012"] {
            assert!(matches!(
                generate_token04(1, "u", secret, 60, ""),
                Err(TokenError::InvalidConfiguration)
            ));
        }
    }

    #[test]
    fn wrong_secret_does_not_decode() {
        let token = generate_token04(1, "u", SECRET, 60, "").unwrap();
        let other = "abcdefghijklmnopqrstuvwxyz012345";

        assert!(decode_token04(&token, other).is_err());
    }

    #[test]
    fn unknown_version_and_truncation_are_malformed() {
        assert!(matches!(
            decode_token04("03AAAA", SECRET),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            decode_token04("04AAAA", SECRET),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn fixed_iv_produces_reproducible_layout() {
        let info = TokenInfo {
            app_id: 1000,
            user_id: "user-42".to_owned(),
            nonce: 12345,
            ctime: 1_700_000_000,
            expire: 1_700_000_060,
            payload: String::new(),
            privilege: Privilege::ALL,
        };
        let iv = [7u8; IV_LENGTH];

        let a = seal(&info, &SECRET.as_bytes()[..KEY_LENGTH], &iv).unwrap();
        let b = seal(&info, &SECRET.as_bytes()[..KEY_LENGTH], &iv).unwrap();
        assert_eq!(a, b);

        let decoded = decode_token04(&a, SECRET).unwrap();
        assert_eq!(decoded.info, info);
        assert_eq!(decoded.expire, 1_700_000_060);
    }
}
