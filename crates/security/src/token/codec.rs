//! AES-GCM sealing and opening of capability tokens

use super::wire;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use jsonproxy_core::{CapabilityRecord, Error, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Length of the random nonce prepended to every token
pub const NONCE_SIZE: usize = 12;

/// Byte that must never occur in a token. HTTP Basic auth separates user and
/// password with it, and the token travels in the user field.
pub const TOKEN_DELIMITER: u8 = b':';

/// Sealing attempts before giving up on a delimiter-free token.
///
/// Each attempt draws a fresh nonce, so attempts are independent. A token of
/// `n` bytes avoids the delimiter with probability `(255/256)^n`; for a
/// 60-byte token that is about 0.79, making a 100-attempt failure roughly
/// `0.21^100`, below `1e-67`.
pub const MAX_SEAL_ATTEMPTS: usize = 100;

enum TokenCipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl TokenCipher {
    fn new(secret: &[u8]) -> Result<Self> {
        let invalid = |_| Error::configuration("invalid AES key material");
        match secret.len() {
            16 => Aes128Gcm::new_from_slice(secret)
                .map(TokenCipher::Aes128)
                .map_err(invalid),
            24 => Aes192Gcm::new_from_slice(secret)
                .map(TokenCipher::Aes192)
                .map_err(invalid),
            32 => Aes256Gcm::new_from_slice(secret)
                .map(TokenCipher::Aes256)
                .map_err(invalid),
            len => Err(Error::configuration(format!(
                "secret must be 16, 24 or 32 bytes long, got {len}"
            ))),
        }
    }

    fn seal(&self, nonce: &Nonce<U12>, plaintext: &[u8]) -> Result<Vec<u8>> {
        let sealed = match self {
            TokenCipher::Aes128(cipher) => cipher.encrypt(nonce, plaintext),
            TokenCipher::Aes192(cipher) => cipher.encrypt(nonce, plaintext),
            TokenCipher::Aes256(cipher) => cipher.encrypt(nonce, plaintext),
        };
        sealed.map_err(|_| Error::invalid_record("plaintext could not be sealed"))
    }

    fn open(&self, nonce: &Nonce<U12>, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let opened = match self {
            TokenCipher::Aes128(cipher) => cipher.decrypt(nonce, ciphertext),
            TokenCipher::Aes192(cipher) => cipher.decrypt(nonce, ciphertext),
            TokenCipher::Aes256(cipher) => cipher.decrypt(nonce, ciphertext),
        };
        opened.map_err(|_| Error::authentication("token failed integrity check"))
    }

    fn key_bits(&self) -> usize {
        match self {
            TokenCipher::Aes128(_) => 128,
            TokenCipher::Aes192(_) => 192,
            TokenCipher::Aes256(_) => 256,
        }
    }
}

/// Creates and opens capability tokens under one secret key.
///
/// A token is `nonce || AES-GCM(plaintext)`; see [`wire`](super::wire) for the
/// plaintext layout.
pub struct TokenCodec {
    cipher: TokenCipher,
}

impl TokenCodec {
    /// Create a codec from a 16, 24 or 32 byte secret (AES-128/192/256)
    pub fn new(secret: &[u8]) -> Result<Self> {
        let cipher = TokenCipher::new(secret)?;
        debug!("Token codec ready with AES-{}-GCM", cipher.key_bits());
        Ok(Self { cipher })
    }

    /// Seal a record into a token that contains no [`TOKEN_DELIMITER`] byte
    pub fn generate(&self, record: &CapabilityRecord) -> Result<Vec<u8>> {
        self.generate_with_rng(record, &mut OsRng)
    }

    /// Seal a record drawing nonces from `rng`
    pub fn generate_with_rng<R: RngCore + ?Sized>(
        &self,
        record: &CapabilityRecord,
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        let plaintext = wire::encode(record)?;

        for attempt in 1..=MAX_SEAL_ATTEMPTS {
            let mut nonce = [0u8; NONCE_SIZE];
            rng.fill_bytes(&mut nonce);

            let ciphertext = self
                .cipher
                .seal(Nonce::<U12>::from_slice(&nonce), &plaintext)?;
            if nonce.contains(&TOKEN_DELIMITER) || ciphertext.contains(&TOKEN_DELIMITER) {
                continue;
            }

            if attempt > 1 {
                debug!("Sealed token after {} attempts", attempt);
            }

            let mut token = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
            token.extend_from_slice(&nonce);
            token.extend_from_slice(&ciphertext);
            return Ok(token);
        }

        Err(Error::Generation {
            attempts: MAX_SEAL_ATTEMPTS,
        })
    }

    /// Authenticate and decrypt a token back into its record
    pub fn open(&self, token: &[u8]) -> Result<CapabilityRecord> {
        if token.len() <= NONCE_SIZE {
            return Err(Error::malformed_token(format!(
                "token of {} bytes is too short",
                token.len()
            )));
        }

        let (nonce, ciphertext) = token.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .open(Nonce::<U12>::from_slice(nonce), ciphertext)?;
        wire::decode(&plaintext)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key_bits", &self.cipher.key_bits())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    const SECRET: &[u8] = b"1234567890123456";

    fn record() -> CapabilityRecord {
        CapabilityRecord::new(vec!["foo".into()], "bar")
    }

    #[test]
    fn test_secret_lengths() {
        assert!(TokenCodec::new(&[7u8; 16]).is_ok());
        assert!(TokenCodec::new(&[7u8; 24]).is_ok());
        assert!(TokenCodec::new(&[7u8; 32]).is_ok());

        for len in [0, 8, 15, 17, 31, 33, 64] {
            let err = TokenCodec::new(&vec![7u8; len]).unwrap_err();
            assert!(matches!(err, Error::Configuration { .. }), "length {len}");
        }
    }

    #[test]
    fn test_generate_and_open() {
        for secret in [&[1u8; 16][..], &[2u8; 24][..], &[3u8; 32][..]] {
            let codec = TokenCodec::new(secret).unwrap();
            let original = record();

            let token = codec.generate(&original).unwrap();
            let opened = codec.open(&token).unwrap();

            assert_eq!(opened, original);
        }
    }

    #[test]
    fn test_tokens_differ_per_call() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let record = record();

        let first = codec.generate(&record).unwrap();
        let second = codec.generate(&record).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_token_layout() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let token = codec.generate(&record()).unwrap();

        // nonce + timestamp + "foo\0bar" + 16-byte tag
        assert_eq!(token.len(), NONCE_SIZE + 4 + 7 + 16);
        assert!(!token.contains(&TOKEN_DELIMITER));
    }

    #[test]
    fn test_open_short_token() {
        let codec = TokenCodec::new(SECRET).unwrap();

        assert!(matches!(codec.open(b""), Err(Error::MalformedToken { .. })));
        assert!(matches!(
            codec.open(&[9u8; NONCE_SIZE]),
            Err(Error::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_open_with_wrong_secret() {
        let token = TokenCodec::new(SECRET)
            .unwrap()
            .generate(&record())
            .unwrap();
        let other = TokenCodec::new(b"6543210987654321").unwrap();

        assert!(matches!(
            other.open(&token),
            Err(Error::Authentication { .. })
        ));
    }

    #[test]
    fn test_open_truncated_token() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let token = codec.generate(&record()).unwrap();

        assert!(matches!(
            codec.open(&token[..token.len() - 1]),
            Err(Error::Authentication { .. })
        ));
    }

    #[test]
    fn test_generation_gives_up_when_delimiter_is_unavoidable() {
        let codec = TokenCodec::new(SECRET).unwrap();
        // Every nonce byte is ':'
        let mut rng = StepRng::new(0x3a3a_3a3a_3a3a_3a3a, 0);

        let err = codec.generate_with_rng(&record(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            Error::Generation {
                attempts: MAX_SEAL_ATTEMPTS
            }
        ));
    }

    #[test]
    fn test_generate_rejects_invalid_record() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let record = CapabilityRecord::new(vec!["a\0b".into()], "bar");

        assert!(matches!(
            codec.generate(&record),
            Err(Error::InvalidRecord { .. })
        ));
    }
}
