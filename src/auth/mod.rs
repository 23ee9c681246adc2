//! Trust and authentication hooks.
//!
//! The transport raises a challenge when a server presents a certificate chain
//! or asks for credentials. These functions answer it from the session's
//! [`AccessPolicy`] and have no side effects: the caller applies the decision.

use crate::config::{AccessPolicy, Credential};

/// A server presented a certificate chain that needs a trust decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTrustChallenge {
    /// Server name the connection was opened for.
    pub host: String,
    /// Number of certificates in the presented chain, leaf included.
    pub chain_len: usize,
}

/// A server answered with `WWW-Authenticate: Basic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicChallenge {
    /// The protection space, when the server named one.
    pub realm: Option<String>,
}

/// Something the transport needs the session to decide on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Challenge {
    /// Certificate chain evaluation.
    ServerTrust(ServerTrustChallenge),
    /// `WWW-Authenticate: Basic`.
    Basic(BasicChallenge),
    /// Any other authentication method.
    Other {
        /// Scheme name as sent by the server.
        method: String,
    },
}

/// How a challenge is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeDisposition {
    /// Accept the presented certificate chain without validating it.
    AcceptServerTrust,
    /// Answer with this credential, for the challenged request only.
    UseCredential(Credential),
    /// Decline and let the transport do what it would do on its own.
    PerformDefaultHandling,
}

/// Trust decision for a presented certificate chain.
///
/// Only an explicit `verify_tls = false` accepts; every other policy defers to
/// normal certificate validation.
pub fn decide_server_trust(
    policy: &AccessPolicy,
    challenge: &ServerTrustChallenge,
) -> ChallengeDisposition {
    if policy.verify_tls() {
        ChallengeDisposition::PerformDefaultHandling
    } else {
        log::debug!(
            "Accepting {}-certificate chain from {} without validation",
            challenge.chain_len,
            challenge.host
        );
        ChallengeDisposition::AcceptServerTrust
    }
}

/// Looks up the challenged realm in the policy's credentials.
pub fn answer_basic_challenge(
    policy: &AccessPolicy,
    challenge: &BasicChallenge,
) -> ChallengeDisposition {
    let Some(realm) = challenge.realm.as_deref() else {
        return ChallengeDisposition::PerformDefaultHandling;
    };
    match policy.credential_for(realm) {
        Some(credential) => {
            log::debug!("Answering basic challenge for realm '{realm}'");
            ChallengeDisposition::UseCredential(credential.clone())
        }
        None => {
            log::debug!("No credential for realm '{realm}', declining");
            ChallengeDisposition::PerformDefaultHandling
        }
    }
}

/// Answers any challenge.
pub fn handle_challenge(policy: &AccessPolicy, challenge: &Challenge) -> ChallengeDisposition {
    match challenge {
        Challenge::ServerTrust(trust) => decide_server_trust(policy, trust),
        Challenge::Basic(basic) => answer_basic_challenge(policy, basic),
        Challenge::Other { method } => {
            log::debug!("Unsupported authentication method '{method}', declining");
            ChallengeDisposition::PerformDefaultHandling
        }
    }
}

/// Reads a `WWW-Authenticate` value holding a single challenge.
///
/// Returns `None` unless the scheme is `Basic` (case-insensitive). The realm
/// parameter may be quoted or a bare token; escapes inside quotes are not
/// interpreted.
pub fn parse_basic_challenge(value: &str) -> Option<BasicChallenge> {
    let value = value.trim();
    let (scheme, params) = value
        .split_once(char::is_whitespace)
        .unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    Some(BasicChallenge {
        realm: realm_param(params),
    })
}

fn realm_param(params: &str) -> Option<String> {
    let mut rest = params.trim_start();
    while !rest.is_empty() {
        let (name, after_name) = rest.split_once('=')?;
        let after_name = after_name.trim_start();
        let (value, remainder) = match after_name.strip_prefix('"') {
            Some(quoted) => {
                let end = quoted.find('"')?;
                (&quoted[..end], &quoted[end + 1..])
            }
            None => {
                let end = after_name.find(',').unwrap_or(after_name.len());
                (after_name[..end].trim_end(), &after_name[end..])
            }
        };
        if name.trim().eq_ignore_ascii_case("realm") {
            return Some(value.to_string());
        }
        rest = remainder.trim_start().trim_start_matches(',').trim_start();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::builder()
            .credential("domotique", "foo", "bar")
            .build()
            .expect("valid policy")
    }

    fn basic(realm: &str) -> BasicChallenge {
        BasicChallenge {
            realm: Some(realm.to_string()),
        }
    }

    fn trust() -> ServerTrustChallenge {
        ServerTrustChallenge {
            host: "self-signed.local".to_string(),
            chain_len: 1,
        }
    }

    #[test]
    fn test_mapped_realm_supplies_credential() {
        assert_eq!(
            answer_basic_challenge(&policy(), &basic("domotique")),
            ChallengeDisposition::UseCredential(Credential::new("foo", "bar"))
        );
    }

    #[test]
    fn test_unmapped_realm_declines() {
        assert_eq!(
            answer_basic_challenge(&policy(), &basic("elsewhere")),
            ChallengeDisposition::PerformDefaultHandling
        );
        assert_eq!(
            answer_basic_challenge(&policy(), &BasicChallenge { realm: None }),
            ChallengeDisposition::PerformDefaultHandling
        );
    }

    #[test]
    fn test_realm_lookup_is_exact() {
        assert_eq!(
            answer_basic_challenge(&policy(), &basic("Domotique")),
            ChallengeDisposition::PerformDefaultHandling
        );
    }

    #[test]
    fn test_trust_override_only_when_verification_is_off() {
        assert_eq!(
            decide_server_trust(&AccessPolicy::insecure(), &trust()),
            ChallengeDisposition::AcceptServerTrust
        );
        assert_eq!(
            decide_server_trust(&AccessPolicy::default(), &trust()),
            ChallengeDisposition::PerformDefaultHandling
        );
    }

    #[test]
    fn test_handle_challenge_dispatch() {
        let insecure = AccessPolicy::insecure();
        assert_eq!(
            handle_challenge(&insecure, &Challenge::ServerTrust(trust())),
            ChallengeDisposition::AcceptServerTrust
        );
        assert_eq!(
            handle_challenge(&policy(), &Challenge::Basic(basic("domotique"))),
            ChallengeDisposition::UseCredential(Credential::new("foo", "bar"))
        );
        assert_eq!(
            handle_challenge(
                &insecure,
                &Challenge::Other {
                    method: "Digest".to_string()
                }
            ),
            ChallengeDisposition::PerformDefaultHandling
        );
    }

    #[test]
    fn test_parse_basic_challenge() {
        let parse = |v| parse_basic_challenge(v).and_then(|c| c.realm);
        assert_eq!(parse("Basic realm=\"domotique\""), Some("domotique".to_string()));
        assert_eq!(parse("basic REALM=domotique"), Some("domotique".to_string()));
        assert_eq!(
            parse("Basic charset=\"UTF-8\", realm=\"my home\""),
            Some("my home".to_string())
        );
        assert_eq!(parse("Basic realm=a, charset=UTF-8"), Some("a".to_string()));
        assert_eq!(parse("Basic"), None);
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(parse_basic_challenge("Digest realm=\"x\", nonce=\"y\"").is_none());
        assert!(parse_basic_challenge("Bearer").is_none());
        assert!(parse_basic_challenge("").is_none());
        assert!(parse_basic_challenge("Basic").is_some());
    }
}
