//! # Engine Configuration
//!
//! Static configuration consumed by the issuance, query, and summary
//! components. Deserializable so a host can load it from its own source;
//! [`Config::default`] carries working values for tests and examples.

use serde::{Deserialize, Serialize};

/// Base credential type carried by every issued credential.
pub const BASE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// Base presentation type carried by every presentation.
pub const BASE_PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// Engine configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Business-partner number of the authority wallet — the only wallet
    /// trusted to issue Membership/Dismantler/Framework/Summary credentials.
    pub authority_bpn: String,

    /// DID method prefix used to derive a wallet DID from its BPN,
    /// e.g. `did:web:wallet.example.com` + `:BPNL...`.
    pub did_method: String,

    /// Default credential lifetime, applied when the caller supplies no
    /// expiration date.
    pub default_expiry_days: i64,

    /// Use-case framework credential types accepted by framework issuance
    /// and included in summary derivation.
    pub framework_types: Vec<String>,

    /// `@context` entries present on every issued credential.
    pub base_contexts: Vec<String>,

    /// `@context` entry required by the signature suite.
    pub signature_context: String,

    /// Contract template URL embedded in summary credential subjects.
    pub contract_template: String,

    /// Page size used when a query does not specify one.
    pub default_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            authority_bpn: "BPNL000000000000".into(),
            did_method: "did:web:localhost".into(),
            default_expiry_days: 365,
            framework_types: vec![
                "BehaviorTwinCredential".into(),
                "PcfCredential".into(),
                "QualityCredential".into(),
                "ResiliencyCredential".into(),
                "SustainabilityCredential".into(),
                "TraceabilityCredential".into(),
            ],
            base_contexts: vec![
                "https://www.w3.org/2018/credentials/v1".into(),
                "https://w3id.org/security/suites/jws-2020/v1".into(),
            ],
            signature_context: "https://w3id.org/security/suites/ed25519-2020/v1".into(),
            contract_template: "https://public.catena-x.org/contracts/credential.v1.pdf".into(),
            default_page_size: 25,
        }
    }
}

impl Config {
    /// Derives the DID for a business-partner number.
    #[must_use]
    pub fn did_for(&self, bpn: &str) -> String {
        format!("{}:{bpn}", self.did_method)
    }

    /// True if `use_case` is one of the configured framework types.
    #[must_use]
    pub fn supports_framework(&self, use_case: &str) -> bool {
        self.framework_types.iter().any(|t| t == use_case)
    }
}
