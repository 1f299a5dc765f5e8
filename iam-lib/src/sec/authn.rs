use base64::{Engine, engine::general_purpose::STANDARD};
use ed25519_dalek::Signer;

pub const PUBLIC_KEY_BYTES: usize = 32;
pub const SIGNATURE_BYTES: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid byte length")]
    InvalidLength,

    #[error("invalid base64 encoding")]
    InvalidEncoding,
}

/// registered Ed25519 public key. kept as raw bytes, curve validation
/// happens at verify time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey([u8; PUBLIC_KEY_BYTES]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_BYTES]) -> Self {
        PublicKey(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let array = bytes.try_into()
            .map_err(|_| KeyError::InvalidLength)?;

        Ok(PublicKey(array))
    }

    pub fn from_base64<G>(given: G) -> Result<Self, KeyError>
    where
        G: AsRef<[u8]>
    {
        let bytes = STANDARD.decode(given)
            .map_err(|_| KeyError::InvalidEncoding)?;

        Self::from_slice(&bytes)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_BYTES] {
        &self.0
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(key) = ed25519_dalek::VerifyingKey::from_bytes(&self.0) else {
            return false;
        };

        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        key.verify_strict(message, &sig).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_BYTES]);

impl Signature {
    pub fn from_bytes(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Signature(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let array = bytes.try_into()
            .map_err(|_| KeyError::InvalidLength)?;

        Ok(Signature(array))
    }

    pub fn from_base64<G>(given: G) -> Result<Self, KeyError>
    where
        G: AsRef<[u8]>
    {
        let bytes = STANDARD.decode(given)
            .map_err(|_| KeyError::InvalidEncoding)?;

        Self::from_slice(&bytes)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_BYTES] {
        &self.0
    }
}

/// signing half, used by clients and tests. the server only ever
/// verifies
pub struct SigningKey(ed25519_dalek::SigningKey);

impl SigningKey {
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_BYTES]) -> Self {
        SigningKey(ed25519_dalek::SigningKey::from_bytes(bytes))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message).to_bytes())
    }
}

/// drops the port from a host header value. everything at and after the
/// first ':' is discarded
pub fn strip_port(host: &str) -> &str {
    match host.split_once(':') {
        Some((name, _)) => name,
        None => host,
    }
}

/// the canonical string both sides sign. built from the raw request
/// bytes, nothing is percent-decoded or re-encoded
#[derive(Debug)]
pub struct StringToSign<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub request_id: &'a str,
    pub session_token: Option<&'a str>,
}

impl StringToSign<'_> {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut rtn = String::with_capacity(
            self.method.len() +
            self.host.len() +
            self.path.len() +
            self.query.len() +
            self.request_id.len() +
            self.session_token.map(|v| v.len()).unwrap_or(0) +
            5
        );

        rtn.push_str(self.method);
        rtn.push('\n');
        rtn.push_str(self.host);
        rtn.push('\n');
        rtn.push_str(self.path);
        rtn.push('\n');
        rtn.push_str(self.query);
        rtn.push('\n');
        rtn.push_str(self.request_id);
        rtn.push('\n');

        if let Some(token) = self.session_token {
            rtn.push_str(token);
        }

        rtn.into_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn example() -> StringToSign<'static> {
        StringToSign {
            method: "GET",
            host: "iam.example.com",
            path: "/users/11111111-1111-1111-1111-111111111111",
            query: "",
            request_id: "22222222-2222-2222-2222-222222222222",
            session_token: None,
        }
    }

    #[test]
    pub fn string_to_sign_layout() {
        let expected = "GET\n\
            iam.example.com\n\
            /users/11111111-1111-1111-1111-111111111111\n\
            \n\
            22222222-2222-2222-2222-222222222222\n";

        assert_eq!(example().to_bytes(), expected.as_bytes());
    }

    #[test]
    pub fn string_to_sign_is_deterministic() {
        assert_eq!(example().to_bytes(), example().to_bytes());
    }

    #[test]
    pub fn strip_port_variants() {
        assert_eq!(strip_port("iam.example.com:8080"), "iam.example.com");
        assert_eq!(strip_port("iam.example.com"), "iam.example.com");
        assert_eq!(strip_port("localhost:80:90"), "localhost");
    }

    #[test]
    pub fn sign_verify_round_trip() {
        let key = SigningKey::from_bytes(&[7; PUBLIC_KEY_BYTES]);
        let message = example().to_bytes();
        let signature = key.sign(&message);

        assert!(key.public_key().verify(&message, &signature));
    }

    #[test]
    pub fn flipped_byte_fails_verification() {
        let key = SigningKey::from_bytes(&[7; PUBLIC_KEY_BYTES]);
        let message = example().to_bytes();
        let signature = key.sign(&message);

        let mut bytes = *signature.as_bytes();
        bytes[0] ^= 0x01;

        let tampered = Signature::from_bytes(bytes);

        assert!(!key.public_key().verify(&message, &tampered));
    }

    #[test]
    pub fn key_length_checked() {
        assert!(PublicKey::from_slice(&[0; 31]).is_err());
        assert!(Signature::from_slice(&[0; 63]).is_err());
        assert!(PublicKey::from_base64("not base64!").is_err());
    }
}
