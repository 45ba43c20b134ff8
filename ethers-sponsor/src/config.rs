use crate::chain::Hardfork;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identity markers that make `eth_signTransaction` polyfilling the default.
pub const DEFAULT_WALLET_MARKERS: &[&str] = &["isMetaMask", "_metamask"];

/// Identity hints advertised by the wrapped endpoint.
///
/// Browser wallets expose marker fields (e.g. `isMetaMask`) on their provider
/// object. Whoever constructs the proxy collects those markers here; they are
/// only used to pick configuration defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointHints {
    markers: BTreeSet<String>,
}

impl EndpointHints {
    /// Creates an empty set of hints
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identity marker
    #[must_use]
    pub fn marker<T: Into<String>>(mut self, marker: T) -> Self {
        self.markers.insert(marker.into());
        self
    }

    /// Returns true if the endpoint advertised the given marker
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.contains(marker)
    }

    /// Iterates over the advertised markers
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for EndpointHints {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { markers: iter.into_iter().map(Into::into).collect() }
    }
}

/// User supplied overrides for [`ProviderConfig`].
///
/// Every field left unset is resolved from defaults and [`EndpointHints`] when
/// the proxy is constructed.
///
/// ```
/// use ethers_sponsor::{Hardfork, SponsorOptions};
///
/// let opts: SponsorOptions =
///     serde_json::from_str(r#"{"hookSends":true,"hardfork":"berlin"}"#).unwrap();
/// assert_eq!(opts, SponsorOptions::new().hook_sends(true).hardfork(Hardfork::Berlin));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SponsorOptions {
    /// Intercept `eth_sendTransaction`
    pub hook_sends: Option<bool>,
    /// Intercept `eth_signTransaction`
    pub polyfill_sign: Option<bool>,
    /// Ruleset used for every chain the endpoint reports
    pub hardfork: Option<Hardfork>,
    /// Markers which, when advertised by the endpoint, turn on `polyfill_sign`
    pub wallet_markers: Vec<String>,
}

impl Default for SponsorOptions {
    fn default() -> Self {
        Self {
            hook_sends: None,
            polyfill_sign: None,
            hardfork: None,
            wallet_markers: DEFAULT_WALLET_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl SponsorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether `eth_sendTransaction` is completed, signed and broadcast as raw
    #[must_use]
    pub fn hook_sends(mut self, hook_sends: bool) -> Self {
        self.hook_sends = Some(hook_sends);
        self
    }

    /// Sets whether `eth_signTransaction` is answered by the proxy
    #[must_use]
    pub fn polyfill_sign(mut self, polyfill_sign: bool) -> Self {
        self.polyfill_sign = Some(polyfill_sign);
        self
    }

    /// Sets the hardfork ruleset
    #[must_use]
    pub fn hardfork(mut self, hardfork: Hardfork) -> Self {
        self.hardfork = Some(hardfork);
        self
    }

    /// Replaces the wallet identity markers used to default `polyfill_sign`
    #[must_use]
    pub fn wallet_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wallet_markers = markers.into_iter().map(Into::into).collect();
        self
    }
}

/// Fully resolved, immutable proxy configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub hook_sends: bool,
    pub polyfill_sign: bool,
    pub hardfork: Hardfork,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::resolve(&SponsorOptions::default(), &EndpointHints::default())
    }
}

impl ProviderConfig {
    /// Resolves the configuration from explicit options, falling back to the
    /// endpoint's identity hints for `polyfill_sign`.
    pub fn resolve(opts: &SponsorOptions, hints: &EndpointHints) -> Self {
        let polyfill_sign = opts
            .polyfill_sign
            .unwrap_or_else(|| opts.wallet_markers.iter().any(|m| hints.has_marker(m)));
        Self {
            hook_sends: opts.hook_sends.unwrap_or(false),
            polyfill_sign,
            hardfork: opts.hardfork.unwrap_or_default(),
        }
    }
}
