//! Documentation-version extraction and compatibility rules.
//!
//! URLs carry versions as path components: `/3/`, `/3.11/`, `/v2/`,
//! `/version/1.4/`. Only major and minor matter here — a bare major is a
//! "generic" version that matches any minor of the same line.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// Version path-component pattern, deliberately unanchored.
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:v|version/)?(\d+(?:\.\d+)?)/").expect("valid regex"));

/// A version as it appears in documentation URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocVersion {
    pub major: u64,
    /// Absent for generic-major versions like `/3/`.
    pub minor: Option<u64>,
}

/// Error for strings that are not dotted-numeric versions.
#[derive(Debug, thiserror::Error)]
#[error("invalid version '{0}'")]
pub struct InvalidVersion(String);

impl FromStr for DocVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');

        let major = parts
            .next()
            .filter(|p| !p.is_empty())
            .and_then(|p| p.parse::<u64>().ok())
            .ok_or_else(|| InvalidVersion(s.to_string()))?;

        let minor = match parts.next() {
            Some(part) => Some(
                part.parse::<u64>()
                    .map_err(|_| InvalidVersion(s.to_string()))?,
            ),
            None => None,
        };

        // Patch and deeper components are tolerated but ignored.
        for part in parts {
            part.parse::<u64>()
                .map_err(|_| InvalidVersion(s.to_string()))?;
        }

        Ok(Self { major, minor })
    }
}

impl std::fmt::Display for DocVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.minor {
            Some(minor) => write!(f, "{}.{}", self.major, minor),
            None => write!(f, "{}", self.major),
        }
    }
}

/// Pull the first version-looking component out of a URL, if any.
pub fn extract_version(url: &str) -> Option<String> {
    VERSION_RE.captures(url).map(|caps| caps[1].to_string())
}

/// Decide whether a version found in a URL satisfies the requested one.
///
/// Rules:
/// - either side failing to parse rejects with a reason;
/// - no version found at all is allowed as generic;
/// - a bare-major found version matches any requested minor of that major;
/// - otherwise major **and** minor must both match.
pub fn check_compatibility(requested: &str, found: Option<&str>) -> (bool, String) {
    let desired: DocVersion = match requested.parse() {
        Ok(v) => v,
        Err(_) => return (false, format!("Versão desejada '{requested}' é inválida.")),
    };

    let Some(found_raw) = found else {
        return (
            true,
            "Nenhuma versão encontrada na URL, permitido como genérico.".to_string(),
        );
    };

    let found_version: DocVersion = match found_raw.parse() {
        Ok(v) => v,
        Err(_) => return (false, format!("Versão encontrada '{found_raw}' é inválida.")),
    };

    if found_version.major != desired.major {
        return (
            false,
            format!(
                "Major incorreto. Esperado: {}, encontrado: {}",
                desired.major, found_version.major
            ),
        );
    }

    let Some(found_minor) = found_version.minor else {
        return (
            true,
            format!("Versão genérica major '{}' permitida.", found_version.major),
        );
    };

    let desired_minor = desired.minor.unwrap_or(0);
    if found_minor != desired_minor {
        return (
            false,
            format!(
                "Minor incorreto. Esperado: {desired_minor}, encontrado: {found_minor}"
            ),
        );
    }

    (true, format!("Versão '{found_version}' compatível."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_major_only() {
        let v: DocVersion = "3".parse().unwrap();
        assert_eq!(v, DocVersion { major: 3, minor: None });
    }

    #[test]
    fn parse_major_minor() {
        let v: DocVersion = "3.11".parse().unwrap();
        assert_eq!(v.major, 3);
        assert_eq!(v.minor, Some(11));
    }

    #[test]
    fn parse_tolerates_patch() {
        let v: DocVersion = "1.4.2".parse().unwrap();
        assert_eq!((v.major, v.minor), (1, Some(4)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<DocVersion>().is_err());
        assert!("three".parse::<DocVersion>().is_err());
        assert!("3.x".parse::<DocVersion>().is_err());
    }

    #[test]
    fn extract_plain_component() {
        assert_eq!(
            extract_version("https://docs.python.org/3/library/os.html").as_deref(),
            Some("3")
        );
        assert_eq!(
            extract_version("https://docs.example.com/3.11/tutorial/").as_deref(),
            Some("3.11")
        );
    }

    #[test]
    fn extract_v_and_version_prefixes() {
        assert_eq!(
            extract_version("https://docs.example.com/v2/api/").as_deref(),
            Some("2")
        );
        assert_eq!(
            extract_version("https://docs.example.com/version/1.4/intro/").as_deref(),
            Some("1.4")
        );
    }

    #[test]
    fn extract_absent_when_no_version() {
        assert_eq!(extract_version("https://docs.example.com/guide/intro"), None);
    }

    #[test]
    fn compatibility_generic_when_url_has_no_version() {
        let (ok, reason) = check_compatibility("3.11", None);
        assert!(ok);
        assert!(reason.contains("genérico"));
    }

    #[test]
    fn compatibility_generic_major_allowed() {
        let (ok, reason) = check_compatibility("3.11", Some("3"));
        assert!(ok);
        assert!(reason.contains("genérica"));
    }

    #[test]
    fn compatibility_major_mismatch_rejected() {
        let (ok, reason) = check_compatibility("3.11", Some("2"));
        assert!(!ok);
        assert_eq!(reason, "Major incorreto. Esperado: 3, encontrado: 2");
    }

    #[test]
    fn compatibility_requires_equal_minor() {
        let (ok, reason) = check_compatibility("3.11", Some("3.10"));
        assert!(!ok);
        assert!(reason.starts_with("Minor incorreto"));

        let (ok, _) = check_compatibility("3.11", Some("3.11"));
        assert!(ok);
    }

    #[test]
    fn compatibility_invalid_requested_rejected() {
        let (ok, reason) = check_compatibility("latest", Some("3"));
        assert!(!ok);
        assert!(reason.contains("inválida"));
    }
}
