//! # Holder Link
//!
//! Holder links use the `openid-vc://` custom scheme, which only a wallet
//! installed on the device can open. For browser use the link is rewritten to
//! an equivalent HTTPS deep link served by a reference wallet.

/// The custom scheme used by holder links.
pub const OPENID_VC_SCHEME: &str = "openid-vc://";

/// The default reference wallet deep-link base.
pub const WALLET_BASE: &str = "https://wallet.verifiablecredentials.dev/siop";

/// Rewrite an `openid-vc://` holder link into an HTTPS wallet link rooted at
/// `wallet_base`. Links using any other scheme are returned unchanged.
#[must_use]
pub fn wallet_url(holder_link: &str, wallet_base: &str) -> String {
    holder_link.strip_prefix(OPENID_VC_SCHEME).map_or_else(
        || holder_link.to_string(),
        |rest| format!("{}{rest}", wallet_base.trim_end_matches('/')),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_custom_scheme() {
        let link = "openid-vc://?request_uri=https://verifier.io/request/123";
        assert_eq!(
            wallet_url(link, WALLET_BASE),
            "https://wallet.verifiablecredentials.dev/siop?request_uri=https://verifier.io/request/123"
        );
    }

    #[test]
    fn trailing_slash_on_base() {
        let link = "openid-vc://?request_uri=x";
        assert_eq!(wallet_url(link, "https://wallet.io/siop/"), "https://wallet.io/siop?request_uri=x");
    }

    #[test]
    fn other_schemes_unchanged() {
        let link = "https://verifier.io/request/123?next=openid-vc://";
        assert_eq!(wallet_url(link, WALLET_BASE), link);
    }
}
