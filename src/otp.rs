//! TOTP provisioning URIs.
//!
//! Registration returns a raw `otp_secret`; authenticator apps enroll from
//! an `otpauth://totp/...` URI. A graphical client renders it as a QR code,
//! this one prints it alongside the secret.

use url::Url;

use crate::api::ApiError;

/// Issuer label shown in authenticator apps.
const ISSUER: &str = "Quill";

/// Build the `otpauth://totp/<username>?secret=...&issuer=...` URI for an
/// account. The username is percent-encoded as a path segment.
pub fn provisioning_uri(username: &str, secret: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse("otpauth://totp")
        .map_err(|e| ApiError::InvalidResponse(format!("otpauth base: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidResponse("otpauth URI cannot carry a path".to_string()))?
        .push(username);
    url.query_pairs_mut()
        .append_pair("secret", secret)
        .append_pair("issuer", ISSUER);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioning_uri_shape() {
        let uri = provisioning_uri("ana", "JBSWY3DPEHPK3PXP").unwrap();
        assert_eq!(
            uri.as_str(),
            "otpauth://totp/ana?secret=JBSWY3DPEHPK3PXP&issuer=Quill"
        );
    }

    #[test]
    fn test_provisioning_uri_encodes_username() {
        let uri = provisioning_uri("ana maria", "SECRET").unwrap();
        assert!(uri.as_str().contains("ana%20maria"));
        assert_eq!(uri.scheme(), "otpauth");
    }
}
