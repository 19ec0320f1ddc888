//! URL launch collaborator seam

use url::Url;

/// Hands an outbound request URL to the platform's launch mechanism.
///
/// Fire-and-forget by contract: the wallet answers (if ever) through the
/// single callback entry point, [`WalletSession::handle_callback`], which
/// the host registers with its own URL-receive facility.
///
/// [`WalletSession::handle_callback`]: crate::WalletSession::handle_callback
pub trait UrlLauncher: Send + Sync {
    fn launch(&self, url: &Url);
}

impl<F> UrlLauncher for F
where
    F: Fn(&Url) + Send + Sync,
{
    fn launch(&self, url: &Url) {
        self(url)
    }
}
