//! Version ordering.
//!
//! Accepts `1`, `1.2`, `1.2.3.4`, an optional leading `v`, a `-prerelease`
//! suffix and `+build` metadata. Missing segments compare as zero and a
//! prerelease sorts before its release.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed version.
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
    pre: Vec<String>,
}

/// The text is not a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVersion(pub String);

impl fmt::Display for InvalidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not a semantic version", self.0)
    }
}

impl std::error::Error for InvalidVersion {}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVersion(s.to_string());
        let text = s.trim();
        let text = text.strip_prefix('v').unwrap_or(text);
        let text = text.split_once('+').map_or(text, |(core, _build)| core);
        let (core, pre) = match text.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre)),
            Some(_) => return Err(invalid()),
            None => (text, None),
        };

        let segments = core
            .split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                segment.parse::<u64>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match pre {
            Some(pre) => {
                let identifiers: Vec<String> = pre.split('.').map(str::to_string).collect();
                if identifiers.iter().any(String::is_empty) {
                    return Err(invalid());
                }
                identifiers
            }
            None => Vec::new(),
        };

        Ok(Version { segments, pre })
    }
}

impl Version {
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    fn segment(&self, i: usize) -> u64 {
        self.segments.get(i).copied().unwrap_or(0)
    }
}

fn compare_identifiers(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                for (a, b) in self.pre.iter().zip(&other.pre) {
                    match compare_identifiers(a, b) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                }
                self.pre.len().cmp(&other.pre.len())
            }
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse() {
        assert!(v("1.2.3") == v("v1.2.3"));
        assert!(v("1.2.3+build.5") == v("1.2.3"));
        assert!(v("2.0.0-rc.1").is_prerelease());
        assert!(!v("2.0.0").is_prerelease());
    }

    #[test]
    fn test_parse_invalid() {
        for s in ["", "v", "latest", "1..2", "1.2.x", "1.2.3-", "1.2.3-rc..1"] {
            assert!(s.parse::<Version>().is_err(), "{s}");
        }
    }

    #[test]
    fn test_ordering() {
        assert!(v("1.2.10") > v("1.2.9"));
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("2") > v("1.99.99"));
        assert_eq!(v("1.2").cmp(&v("1.2.0")), Ordering::Equal);
        assert!(v("1.2.3.1") > v("1.2.3"));
    }

    #[test]
    fn test_prerelease_ordering() {
        assert!(v("1.0.0-alpha") < v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.1") < v("1.0.0-beta"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11"));
        assert!(v("1.0.0-rc.1") < v("1.0.0"));
        assert!(v("1.0.0-rc.1") > v("0.9.9"));
    }

    #[test]
    fn test_max() {
        let versions = ["1.2.0", "1.10.0", "1.9.3", "1.10.0-rc.1"];
        let max = versions.iter().map(|s| v(s)).max().unwrap();
        assert_eq!(max, v("1.10.0"));
    }
}
