//! Session state machine - handshake and authenticated operations

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;
use zeroize::Zeroizing;

use crypto_session::{KeyPair, PUBLIC_KEY_SIZE, SessionKey};
use deeplink::{
    Callback, LinkError, connect_url, decode_callback, encrypted_request_url, params,
};
use wallet_protocol::{
    Action, Cluster, ConnectResponse, DEFAULT_WALLET_BASE_URL, DisconnectRequest, RemoteError,
    SignRequest,
};

use crate::{SessionError, SessionResult, UrlLauncher};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session; connect may be initiated
    Idle,
    /// Connect request dispatched, wallet callback pending (possibly forever)
    AwaitingCallback,
    /// Shared secret and session token held; authenticated operations allowed
    Established,
    /// Handshake or operation failed; connect may be retried with fresh keys
    Failed,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wallet universal-link base, e.g. `https://phantom.app/ul/v1/`
    pub wallet_base_url: Url,
    /// Cluster advertised during connect
    pub cluster: Cluster,
    /// App URL shown by the wallet during connect
    pub app_url: String,
    /// Base the per-action redirect links are joined onto; must end with `/`
    /// (e.g. `pbvote://app/` yields `pbvote://app/onConnect`)
    pub redirect_base: Url,
}

impl SessionConfig {
    pub fn new(app_url: impl Into<String>, redirect_base: Url) -> Self {
        let wallet_base_url =
            Url::parse(DEFAULT_WALLET_BASE_URL).expect("default wallet base URL is valid");
        Self {
            wallet_base_url,
            cluster: Cluster::default(),
            app_url: app_url.into(),
            redirect_base,
        }
    }
}

/// Outcome of handling one inbound callback
#[derive(Debug)]
pub enum SessionEvent {
    /// Stale or unrelated callback; state unchanged
    Ignored,
    /// The wallet rejected the request (e.g. user declined); fields verbatim
    Rejected(RemoteError),
    /// Handshake complete; session token held
    Established { wallet_public_key: String },
    /// Session torn down; secret material cleared
    Disconnected,
    /// Decrypted response to a signed operation
    Response { action: Action, value: Value },
}

/// Secret material of an established session.
///
/// Bundled so the shared key and session token are always populated and
/// cleared together; dropped (and zeroized) on disconnect or failure.
struct Established {
    key: SessionKey,
    dapp_public_key: [u8; PUBLIC_KEY_SIZE],
    session_token: Zeroizing<String>,
    wallet_public_key: String,
}

/// One live session per application run.
///
/// All transitions run through [`connect`], [`disconnect`],
/// [`sign_request`], and [`handle_callback`]; the host is responsible for
/// serializing access (the transport delivers callbacks arbitrarily later,
/// including never).
///
/// [`connect`]: WalletSession::connect
/// [`disconnect`]: WalletSession::disconnect
/// [`sign_request`]: WalletSession::sign_request
/// [`handle_callback`]: WalletSession::handle_callback
pub struct WalletSession {
    config: SessionConfig,
    launcher: Arc<dyn UrlLauncher>,
    phase: SessionPhase,
    /// Keypair of the in-flight connect attempt; present iff AwaitingCallback
    pending: Option<KeyPair>,
    established: Option<Established>,
    phase_tx: watch::Sender<SessionPhase>,
}

impl WalletSession {
    pub fn new(config: SessionConfig, launcher: Arc<dyn UrlLauncher>) -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Idle);
        Self {
            config,
            launcher,
            phase: SessionPhase::Idle,
            pending: None,
            established: None,
            phase_tx,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Watch phase transitions, e.g. to impose a caller-side timeout on a
    /// wallet that never answers (the protocol itself has none: an abandoned
    /// flow is indefinitely pending, not an error).
    pub fn phase_watch(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }

    /// Wallet public key (base58) of the established session
    pub fn wallet_public_key(&self) -> Option<&str> {
        self.established.as_ref().map(|e| e.wallet_public_key.as_str())
    }

    /// Session token of the established session
    pub fn session_token(&self) -> Option<&str> {
        self.established.as_ref().map(|e| e.session_token.as_str())
    }

    /// Initiate the connect handshake.
    ///
    /// Generates a fresh one-time keypair (never reused across attempts),
    /// dispatches the connect URL, and moves to AwaitingCallback. Returns
    /// the dispatched URL.
    pub fn connect(&mut self) -> SessionResult<Url> {
        match self.phase {
            SessionPhase::AwaitingCallback => return Err(SessionError::AlreadyConnecting),
            SessionPhase::Established => return Err(SessionError::AlreadyEstablished),
            SessionPhase::Idle | SessionPhase::Failed => {}
        }

        let keypair = KeyPair::generate();
        let url = connect_url(
            &self.config.wallet_base_url,
            &keypair.public_key_bytes(),
            self.config.cluster,
            &self.config.app_url,
            &self.redirect_link(Action::Connect)?,
        )?;

        self.pending = Some(keypair);
        self.set_phase(SessionPhase::AwaitingCallback);
        info!(cluster = %self.config.cluster, "dispatching connect request");
        self.launcher.launch(&url);
        Ok(url)
    }

    /// Request session teardown.
    ///
    /// Encrypts the session token into a disconnect request and dispatches
    /// it. Secret material is cleared when the wallet's callback arrives.
    pub fn disconnect(&mut self) -> SessionResult<Url> {
        let established = self.established.as_ref().ok_or(SessionError::NotEstablished)?;

        let payload = DisconnectRequest {
            session: established.session_token.to_string(),
        };
        let envelope = established.key.encrypt(&payload)?;
        let url = encrypted_request_url(
            &self.config.wallet_base_url,
            Action::Disconnect,
            &established.dapp_public_key,
            &envelope,
            &self.redirect_link(Action::Disconnect)?,
        )?;

        info!("dispatching disconnect request");
        self.launcher.launch(&url);
        Ok(url)
    }

    /// Dispatch an arbitrary signed operation.
    ///
    /// The session token is attached automatically; `params` carries the
    /// operation-specific fields verbatim. Follows the same
    /// encrypt - encode - launch path as disconnect.
    pub fn sign_request(&mut self, request_params: Value) -> SessionResult<Url> {
        let established = self.established.as_ref().ok_or(SessionError::NotEstablished)?;

        let payload = SignRequest {
            session: established.session_token.to_string(),
            params: request_params,
        };
        let envelope = established.key.encrypt(&payload)?;
        let url = encrypted_request_url(
            &self.config.wallet_base_url,
            Action::SignRequest,
            &established.dapp_public_key,
            &envelope,
            &self.redirect_link(Action::SignRequest)?,
        )?;

        info!("dispatching sign request");
        self.launcher.launch(&url);
        Ok(url)
    }

    /// The single inbound callback entry point.
    ///
    /// The external channel may deliver stale, duplicate, or unrelated URLs
    /// at any time; anything not matching the currently expected callback is
    /// logged and ignored without a state change.
    pub fn handle_callback(&mut self, raw: &str) -> SessionResult<SessionEvent> {
        let callback = match decode_callback(raw) {
            Ok(callback) => callback,
            Err(LinkError::UnrecognizedCallback(path)) => {
                warn!(path = %path, "ignoring callback with unrecognized path");
                return Ok(SessionEvent::Ignored);
            }
            Err(err) => {
                if self.phase == SessionPhase::AwaitingCallback {
                    self.fail();
                    return Err(err.into());
                }
                debug!(error = %err, "ignoring undecodable callback outside handshake");
                return Ok(SessionEvent::Ignored);
            }
        };

        match callback {
            Callback::Rejected { action, error } => Ok(self.on_rejected(action, error)),
            Callback::Connect {
                wallet_public_key,
                envelope,
            } => self.on_connect_callback(wallet_public_key, envelope),
            Callback::Response { action, envelope } => self.on_response(action, envelope),
        }
    }

    fn on_rejected(&mut self, action: Option<Action>, error: RemoteError) -> SessionEvent {
        match self.phase {
            SessionPhase::AwaitingCallback => {
                info!(code = %error.code, "wallet rejected connect request");
                self.fail();
                SessionEvent::Rejected(error)
            }
            // A declined operation leaves the session intact
            SessionPhase::Established if action != Some(Action::Connect) => {
                info!(code = %error.code, "wallet rejected operation");
                SessionEvent::Rejected(error)
            }
            _ => {
                debug!(code = %error.code, "ignoring stale wallet rejection");
                SessionEvent::Ignored
            }
        }
    }

    fn on_connect_callback(
        &mut self,
        wallet_public_key: [u8; PUBLIC_KEY_SIZE],
        envelope: crypto_session::EncryptedEnvelope,
    ) -> SessionResult<SessionEvent> {
        if self.phase != SessionPhase::AwaitingCallback {
            debug!("ignoring connect callback outside handshake");
            return Ok(SessionEvent::Ignored);
        }

        let Some(keypair) = self.pending.take() else {
            self.fail();
            return Err(SessionError::HandshakeDecryption);
        };
        let dapp_public_key = keypair.public_key_bytes();

        // The remote key and envelope are attacker-controlled until the
        // authentication tag verifies; surface a single opaque failure.
        let key = match keypair.diffie_hellman(&wallet_public_key) {
            Ok(key) => key,
            Err(_) => {
                self.fail();
                return Err(SessionError::HandshakeDecryption);
            }
        };
        let response: ConnectResponse = match key.decrypt(&envelope) {
            Ok(response) => response,
            Err(_) => {
                self.fail();
                return Err(SessionError::HandshakeDecryption);
            }
        };

        let wallet_public_key = response.public_key.clone();
        self.established = Some(Established {
            key,
            dapp_public_key,
            session_token: Zeroizing::new(response.session),
            wallet_public_key: response.public_key,
        });
        self.set_phase(SessionPhase::Established);
        info!(wallet = %wallet_public_key, "session established");
        Ok(SessionEvent::Established { wallet_public_key })
    }

    fn on_response(
        &mut self,
        action: Action,
        envelope: Option<crypto_session::EncryptedEnvelope>,
    ) -> SessionResult<SessionEvent> {
        let Some(established) = self.established.as_ref() else {
            debug!(action = %action, "ignoring response callback without session");
            return Ok(SessionEvent::Ignored);
        };

        match action {
            Action::Connect => unreachable!("connect callbacks are handled separately"),
            Action::Disconnect => {
                if let Some(envelope) = envelope {
                    match established.key.decrypt::<Value>(&envelope) {
                        Ok(ack) => debug!(ack = %ack, "disconnect acknowledged"),
                        Err(err) => warn!(error = %err, "undecryptable disconnect ack"),
                    }
                }
                // Teardown proceeds either way; the wallet redirected back
                self.clear_to_idle();
                info!("session disconnected");
                Ok(SessionEvent::Disconnected)
            }
            Action::SignRequest => {
                let Some(envelope) = envelope else {
                    self.fail();
                    return Err(LinkError::MissingField(params::DATA).into());
                };
                match established.key.decrypt::<Value>(&envelope) {
                    Ok(value) => Ok(SessionEvent::Response { action, value }),
                    Err(err) => {
                        self.fail();
                        Err(err.into())
                    }
                }
            }
        }
    }

    fn redirect_link(&self, action: Action) -> SessionResult<Url> {
        Ok(self.config.redirect_base.join(action.callback_path())
            .map_err(LinkError::from)?)
    }

    /// Drop all secret material and enter the terminal failed phase.
    /// A later connect() starts over with a fresh keypair.
    fn fail(&mut self) {
        self.pending = None;
        self.established = None;
        self.set_phase(SessionPhase::Failed);
    }

    fn clear_to_idle(&mut self) {
        self.pending = None;
        self.established = None;
        self.set_phase(SessionPhase::Idle);
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.phase_tx.send_replace(phase);
    }
}
