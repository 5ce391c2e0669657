/// Auth token key generation
///
/// Token keys are 20 random bytes hex-encoded, giving the 40-character
/// keys clients already store.
use rand::RngCore;

pub const TOKEN_KEY_LEN: usize = 40;

/// Generate a new random token key.
pub fn generate_key() -> String {
    let mut bytes = [0u8; TOKEN_KEY_LEN / 2];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
