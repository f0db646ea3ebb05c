//! Docker output parsing: image content hashes and push digests.

use crate::utils::parser::extract_first;

/// Extract the built image's content hash from build output, truncated to
/// the short 12-character id. None when no hash appears.
pub fn extract_image_id(build_output: &str) -> Option<String> {
    extract_first(build_output, r"sha256:([a-f0-9]{64})").map(|id| id[..12].to_string())
}

/// Extract the full `sha256:<64-hex>` digest token from push output.
pub fn extract_digest(push_output: &str) -> Option<String> {
    extract_first(push_output, r"digest: (sha256:[a-f0-9]{64})")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "a3f2b8c91d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c1d2e3f4a5b6c7d8e9f0a";

    #[test]
    fn image_id_is_short_form() {
        let output = format!("writing image sha256:{} done", HASH);
        assert_eq!(extract_image_id(&output).as_deref(), Some("a3f2b8c91d4e"));
    }

    #[test]
    fn image_id_absent_yields_none() {
        assert!(extract_image_id("no hash in this output").is_none());
    }

    #[test]
    fn digest_keeps_full_token() {
        let output = format!("latest: digest: sha256:{} size: 1573", HASH);
        assert_eq!(
            extract_digest(&output).as_deref(),
            Some(format!("sha256:{}", HASH).as_str())
        );
    }

    #[test]
    fn digest_requires_digest_prefix() {
        let output = format!("sha256:{}", HASH);
        assert!(extract_digest(&output).is_none());
    }
}
