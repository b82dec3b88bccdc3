//! Tool-version parsing for the remediation version gate.

use std::fmt;
use std::str::FromStr;

use gradlint_error::Error;

/// A lenient `major.minor[.patch]` tool version. Pre-release suffixes
/// (`2.14-rc-1`) are ignored for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GradleVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GradleVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// The newest version that still lacks the `plugins { }` block syntax.
    pub const PLUGINS_DSL_CUTOFF: GradleVersion = GradleVersion::new(2, 1, 0);

    /// Whether this version accepts the `plugins { }` block syntax.
    pub fn supports_plugins_dsl(&self) -> bool {
        *self > Self::PLUGINS_DSL_CUTOFF
    }
}

impl FromStr for GradleVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base = s.split('-').next().unwrap_or(s).trim();
        let mut parts = base.split('.');
        let mut next = |name: &'static str| -> Result<u32, Error> {
            match parts.next() {
                None | Some("") => Ok(0),
                Some(p) => p.parse::<u32>().map_err(|_| {
                    Error::invalid_argument(format!("bad {} component in version '{}'", name, s))
                        .with_operation("version::parse")
                }),
            }
        };
        let major = next("major")?;
        let minor = next("minor")?;
        let patch = next("patch")?;
        Ok(GradleVersion::new(major, minor, patch))
    }
}

impl fmt::Display for GradleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("3.2".parse::<GradleVersion>().unwrap(), GradleVersion::new(3, 2, 0));
        assert_eq!(
            "2.14.1".parse::<GradleVersion>().unwrap(),
            GradleVersion::new(2, 14, 1)
        );
        assert_eq!(
            "2.14-rc-1".parse::<GradleVersion>().unwrap(),
            GradleVersion::new(2, 14, 0)
        );
        assert!("two.one".parse::<GradleVersion>().is_err());
    }

    #[test]
    fn test_plugins_dsl_gate() {
        assert!("3.2".parse::<GradleVersion>().unwrap().supports_plugins_dsl());
        assert!("2.2".parse::<GradleVersion>().unwrap().supports_plugins_dsl());
        assert!(!"2.1".parse::<GradleVersion>().unwrap().supports_plugins_dsl());
        assert!(!"2.0".parse::<GradleVersion>().unwrap().supports_plugins_dsl());
        assert!(!"1.12".parse::<GradleVersion>().unwrap().supports_plugins_dsl());
    }

    #[test]
    fn test_ordering() {
        let v214: GradleVersion = "2.14".parse().unwrap();
        let v22: GradleVersion = "2.2".parse().unwrap();
        assert!(v214 > v22);
    }
}
