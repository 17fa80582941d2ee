//! Four-part product version (major.minor.build.revision)
//!
//! Power BI Desktop versions itself with Windows file-version semantics, not
//! semver, so this is a dedicated type. Parsing is deliberately lenient:
//! catalogs and version resources carry strings like `"2.91 (x64)"`, and a
//! candidate with an odd version string must still take part in selection. The
//! leading dotted-numeric token is parsed and the rest discarded; a string with
//! no leading number at all yields [`ProductVersion::ZERO`], which simply loses
//! every version-ordering comparison.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Parsed, ordered product version. Missing trailing parts read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProductVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl ProductVersion {
    pub const ZERO: ProductVersion = ProductVersion::new(0, 0, 0, 0);

    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl FromStr for ProductVersion {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Take the leading run of digits and dots, e.g. "2.91 (x64)" -> "2.91"
        let token: &str = s
            .trim()
            .split(|c: char| !c.is_ascii_digit() && c != '.')
            .next()
            .unwrap_or("");

        let mut parts = [0u32; 4];
        for (slot, piece) in parts.iter_mut().zip(token.split('.')) {
            match piece.parse::<u32>() {
                Ok(n) => *slot = n,
                Err(_) => break,
            }
        }

        Ok(ProductVersion::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Parse a version string, falling back to the zero version.
///
/// Infallible by construction; the helper exists so call sites read as intent
/// rather than handling an `Infallible` error everywhere.
pub fn parse_lenient(s: &str) -> ProductVersion {
    s.parse().unwrap_or(ProductVersion::ZERO)
}
