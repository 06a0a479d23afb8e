//! Random token material from the operating system's CSPRNG.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use data_encoding::BASE32_NOPAD;
use rand::TryRngCore;
use rand::rngs::OsRng;

/// Fill `N` bytes from the OS random source.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], String> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| e.to_string())?;
    Ok(bytes)
}

/// 16 random bytes as unpadded base32: the session token format.
pub fn session_token() -> Result<String, String> {
    Ok(BASE32_NOPAD.encode(&random_bytes::<16>()?))
}

/// 32 random bytes as URL-safe base64: the OAuth state token format.
pub fn state_token() -> Result<String, String> {
    Ok(URL_SAFE.encode(random_bytes::<32>()?))
}
