//! Salted password digest sent during the handshake

use md5::{Digest, Md5};

/// Lowercase hex MD5 of the salt followed by the password
///
/// A fresh hasher is built for every call, so digests never share state.
pub fn salted_digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
