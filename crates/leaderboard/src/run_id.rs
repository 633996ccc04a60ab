//! Wire encoding for run identities.
//!
//! Runs travel as 22-character URL-safe unpadded base64 of the UUID bytes.
//! Decoding is forgiving in exactly one way: any token that does not decode
//! to 16 bytes is treated as an identity that resolves to nothing, so
//! callers answer "not found" rather than "bad request".

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;

pub fn encode(id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(id.as_bytes())
}

pub fn decode(token: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(token.as_bytes()).ok()?;
    Uuid::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let id = Uuid::new_v4();
        let token = encode(id);
        assert_eq!(token.len(), 22);
        assert_eq!(decode(&token), Some(id));
    }

    #[test]
    fn all_a_token_is_the_nil_uuid() {
        assert_eq!(decode("AAAAAAAAAAAAAAAAAAAAAA"), Some(Uuid::nil()));
    }

    #[test]
    fn garbage_decodes_to_nothing() {
        assert_eq!(decode("!!!"), None);
        assert_eq!(decode(""), None);
        // valid base64, wrong length
        assert_eq!(decode("AAAA"), None);
        assert_eq!(decode("not-a-run-id"), None);
    }
}
