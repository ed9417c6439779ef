// ABOUTME: Primary stack naming convention `tdl-<org>-ltd-<stage>`.
// ABOUTME: Derives the deterministic, length-capped companion services stack name.

use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

const PREFIX: &str = "tdl-";
const INFIX: &str = "-ltd-";

/// Suffix appended to the companion services stack name.
pub const COMPANION_SUFFIX: &str = "-srvcs";

/// Maximum length of a companion stack name.
pub const COMPANION_MAX_LEN: usize = 20;

/// Longest org segment kept verbatim in the companion name.
const COMPANION_ORG_LEN: usize = 14;
/// Hex digits of the org hash used when the org segment is truncated.
const COMPANION_HASH_LEN: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackNameError {
    #[error("stack name must start with `tdl-`: {0}")]
    MissingPrefix(String),

    #[error("stack name must contain `-ltd-<stage>`: {0}")]
    MissingStage(String),

    #[error("organization segment cannot be empty")]
    EmptyOrg,

    #[error("stage segment cannot be empty")]
    EmptyStage,

    #[error("invalid character in organization: '{0}'")]
    InvalidOrgChar(char),

    #[error("invalid character in stage: '{0}'")]
    InvalidStageChar(char),
}

/// A validated primary stack name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackName {
    value: String,
    org: String,
    stage: String,
}

impl StackName {
    /// Build a stack name from its org and stage segments.
    pub fn new(org: &str, stage: &str) -> Result<Self, StackNameError> {
        validate_org(org)?;
        validate_stage(stage)?;
        Ok(Self {
            value: format!("{PREFIX}{org}{INFIX}{stage}"),
            org: org.to_string(),
            stage: stage.to_string(),
        })
    }

    /// Parse a full stack name such as `tdl-acme-ltd-prod`.
    pub fn parse(value: &str) -> Result<Self, StackNameError> {
        let rest = value
            .strip_prefix(PREFIX)
            .ok_or_else(|| StackNameError::MissingPrefix(value.to_string()))?;

        // The stage never contains a hyphen, so the last infix splits the name.
        let split = rest
            .rfind(INFIX)
            .ok_or_else(|| StackNameError::MissingStage(value.to_string()))?;

        let org = &rest[..split];
        let stage = &rest[split + INFIX.len()..];
        Self::new(org, stage)
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Name of the optional companion services stack for this deployment.
    ///
    /// Orgs longer than 14 characters are cut and tagged with a short hash of
    /// the full org so distinct long orgs do not collide.
    pub fn companion(&self) -> String {
        let org_part = if self.org.len() <= COMPANION_ORG_LEN {
            self.org.clone()
        } else {
            let digest = Sha256::digest(self.org.as_bytes());
            let hash = hex::encode(&digest[..COMPANION_HASH_LEN / 2]);
            let keep = COMPANION_ORG_LEN - COMPANION_HASH_LEN;
            format!("{}{}", &self.org[..keep], hash)
        };

        let mut name = format!("{org_part}{COMPANION_SUFFIX}");
        if name.len() > COMPANION_MAX_LEN {
            let cut = COMPANION_MAX_LEN - COMPANION_SUFFIX.len();
            name = format!("{}{COMPANION_SUFFIX}", &org_part[..cut]);
        }
        name
    }
}

fn validate_org(org: &str) -> Result<(), StackNameError> {
    if org.is_empty() {
        return Err(StackNameError::EmptyOrg);
    }
    for c in org.chars() {
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
            return Err(StackNameError::InvalidOrgChar(c));
        }
    }
    Ok(())
}

fn validate_stage(stage: &str) -> Result<(), StackNameError> {
    if stage.is_empty() {
        return Err(StackNameError::EmptyStage);
    }
    for c in stage.chars() {
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() {
            return Err(StackNameError::InvalidStageChar(c));
        }
    }
    Ok(())
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_org_and_stage() {
        let name = StackName::parse("tdl-acme-corp-ltd-prod").unwrap();
        assert_eq!(name.org(), "acme-corp");
        assert_eq!(name.stage(), "prod");
        assert_eq!(name.as_str(), "tdl-acme-corp-ltd-prod");
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(matches!(
            StackName::parse("acme-ltd-prod"),
            Err(StackNameError::MissingPrefix(_))
        ));
    }

    #[test]
    fn rejects_missing_stage() {
        assert!(matches!(
            StackName::parse("tdl-acme-prod"),
            Err(StackNameError::MissingStage(_))
        ));
    }

    #[test]
    fn rejects_uppercase_org() {
        assert_eq!(
            StackName::new("Acme", "prod"),
            Err(StackNameError::InvalidOrgChar('A'))
        );
    }

    #[test]
    fn short_org_companion_is_verbatim() {
        let name = StackName::new("acme", "prod").unwrap();
        assert_eq!(name.companion(), "acme-srvcs");
    }

    #[test]
    fn long_org_companion_is_truncated_and_hashed() {
        let name = StackName::new("averyveryverylongorganisation", "dev").unwrap();
        let companion = name.companion();
        assert_eq!(companion.len(), COMPANION_MAX_LEN);
        assert!(companion.starts_with("averyveryv"));
        assert!(companion.ends_with(COMPANION_SUFFIX));
    }

    #[test]
    fn long_org_hash_is_the_leading_digest_hex() {
        let name = StackName::new("averyveryverylongorganisation", "dev").unwrap();
        assert_eq!(name.companion(), "averyveryv9b71-srvcs");
    }

    #[test]
    fn long_orgs_sharing_a_prefix_get_distinct_companions() {
        let a = StackName::new("averyveryverylongorg-one", "dev").unwrap();
        let b = StackName::new("averyveryverylongorg-two", "dev").unwrap();
        assert_ne!(a.companion(), b.companion());
    }
}
