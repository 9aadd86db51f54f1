//! Secret digests.
//!
//! The service treats the digest as an opaque, deterministic function from a
//! secret to a printable string. [`Digester`] is that seam;
//! [`Sha512Digester`] is the implementation used by default.

use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha512};

/// Length of a [`Sha512Digester`] output: 64 bytes as padded base64.
pub const SHA512_BASE64_LEN: usize = 88;

/// A deterministic one-way function applied to every submitted secret.
pub trait Digester: Send + Sync + 'static {
    /// Computes the digest of `secret`.
    ///
    /// Must return the same output for the same input on every call and across
    /// process runs.
    fn digest(&self, secret: &str) -> String;
}

/// SHA-512 of the UTF-8 bytes of the secret, rendered as standard padded
/// base64.
///
/// # Example
/// ```
/// use hashd::{Digester, SHA512_BASE64_LEN, Sha512Digester};
///
/// let digest = Sha512Digester.digest("angryMonkey");
/// assert_eq!(digest.len(), SHA512_BASE64_LEN);
/// assert!(digest.starts_with("ZEHhWB65"));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha512Digester;

impl Digester for Sha512Digester {
    fn digest(&self, secret: &str) -> String {
        STANDARD.encode(Sha512::digest(secret.as_bytes()))
    }
}

impl<F> Digester for F
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    fn digest(&self, secret: &str) -> String {
        self(secret)
    }
}
