//! Build share codes
//!
//! A share code is the compressed save payload wrapped in URL-safe base64
//! (no padding), so a whole build fits in a query-string fragment. The
//! checksum inside the payload keeps truncated or edited codes from
//! round-tripping.

use base64::Engine;

use super::error::SaveError;
use super::format::{decompress_and_deserialize, serialize_and_compress, BuildSave};

const CODE_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Encode a build save as a URL-safe share code
pub fn encode_share_code(save: &BuildSave) -> Result<String, SaveError> {
    let bytes = serialize_and_compress(save)?;
    Ok(CODE_ENGINE.encode(bytes))
}

/// Decode a share code back into a build save
pub fn decode_share_code(code: &str) -> Result<BuildSave, SaveError> {
    let bytes = CODE_ENGINE.decode(code.trim()).map_err(|_| SaveError::InvalidShareCode)?;
    decompress_and_deserialize(&bytes)
}
