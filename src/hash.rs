use sha2::Digest;
use std::convert::TryInto;
use std::fmt::{Display, Formatter};

const SHA256_BYTE_COUNT: usize = 32;

/// A SHA-256 digest, i.e. a 256-bit (32-byte) array.
/// It can be displayed as a hex-encoded string and parsed back from one.
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct Sha256([u8; SHA256_BYTE_COUNT]);

impl Sha256 {
    pub const fn from_raw(raw_bytes: [u8; SHA256_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = sha2::Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let raw_bytes: [u8; SHA256_BYTE_COUNT] = result
            .as_slice()
            .try_into()
            .expect("SHA-256 output is always 32 bytes");
        Self(raw_bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        let raw_bytes: [u8; SHA256_BYTE_COUNT] = bytes.as_slice().try_into().map_err(|_| {
            format!(
                "Invalid SHA-256 length. Expected: {} but got: {} in: {}",
                SHA256_BYTE_COUNT,
                bytes.len(),
                s
            )
        })?;
        Ok(Self(raw_bytes))
    }
}

impl Display for Sha256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
