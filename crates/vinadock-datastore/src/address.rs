//! Datastore address parsing.

use std::fmt;

use crate::error::{DatastoreError, Result};

pub const SCHEME: &str = "vinadock://";

/// A parsed `vinadock://{profile}/{project}/{name}` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub profile: String,
    pub project: String,
    pub name: String,
}

impl Address {
    pub fn new(profile: &str, project: &str, name: &str) -> Result<Self> {
        let address = Self {
            profile: profile.to_string(),
            project: project.to_string(),
            name: name.to_string(),
        };
        for segment in [profile, project, name] {
            check_segment(segment, &address.to_string())?;
        }
        Ok(address)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let rest = raw
            .strip_prefix(SCHEME)
            .ok_or_else(|| invalid(raw, "expected vinadock:// scheme"))?;

        let mut parts = rest.splitn(3, '/');
        let (profile, project, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(j), Some(n)) => (p, j, n),
            _ => return Err(invalid(raw, "expected profile/project/name")),
        };

        for segment in [profile, project, name] {
            check_segment(segment, raw)?;
        }

        Ok(Self {
            profile: profile.to_string(),
            project: project.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}/{}", SCHEME, self.profile, self.project, self.name)
    }
}

fn check_segment(segment: &str, raw: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(invalid(raw, "empty path segment"));
    }
    if segment.contains('/') || segment.contains('\\') || segment.contains("..") {
        return Err(invalid(raw, "path separators and '..' are not allowed"));
    }
    Ok(())
}

fn invalid(raw: &str, reason: &str) -> DatastoreError {
    DatastoreError::InvalidAddress {
        address: raw.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let addr = Address::parse("vinadock://local/docking/out_results.json").unwrap();
        assert_eq!(addr.profile, "local");
        assert_eq!(addr.project, "docking");
        assert_eq!(addr.name, "out_results.json");
        assert_eq!(addr.to_string(), "vinadock://local/docking/out_results.json");
    }

    #[test]
    fn test_rejects_foreign_scheme() {
        let err = Address::parse("s3://bucket/key/name").unwrap_err();
        assert!(err.to_string().contains("vinadock:// scheme"));
    }

    #[test]
    fn test_rejects_missing_segments() {
        assert!(Address::parse("vinadock://local/docking").is_err());
        assert!(Address::parse("vinadock://local//name").is_err());
    }

    #[test]
    fn test_rejects_traversal() {
        assert!(Address::parse("vinadock://local/docking/../../etc/passwd").is_err());
        assert!(Address::parse("vinadock://local/docking/a\\b").is_err());
        assert!(Address::new("local", "docking", "..").is_err());
    }
}
