//! Seq server version gate.
//!
//! Seq versions look like `2024.3.12345`; only `major.minor` is compared.

use std::fmt;
use std::str::FromStr;

use crate::client::ConnectionFactory;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeqVersion {
    pub major: u32,
    pub minor: u32,
}

impl SeqVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl FromStr for SeqVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('.');
        let parse = |part: Option<&str>| -> Result<u32> {
            part.ok_or_else(|| Error::config(format!("Invalid Seq version: {}", s)))?
                .parse::<u32>()
                .map_err(|_| Error::config(format!("Invalid Seq version: {}", s)))
        };
        let major = parse(parts.next())?;
        let minor = match parts.next() {
            Some(p) => parse(Some(p))?,
            None => 0,
        };
        Ok(Self { major, minor })
    }
}

impl fmt::Display for SeqVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Inclusive range of supported server versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub min: SeqVersion,
    pub max: SeqVersion,
}

impl Default for VersionRange {
    fn default() -> Self {
        Self {
            min: SeqVersion::new(2024, 1),
            max: SeqVersion::new(2025, 2),
        }
    }
}

impl VersionRange {
    pub fn new(min: SeqVersion, max: SeqVersion) -> Self {
        Self { min, max }
    }

    pub fn from_bounds(min: Option<&str>, max: Option<&str>) -> Result<Self> {
        let defaults = Self::default();
        let range = Self {
            min: min.map(str::parse::<SeqVersion>).transpose()?.unwrap_or(defaults.min),
            max: max.map(str::parse::<SeqVersion>).transpose()?.unwrap_or(defaults.max),
        };
        if range.min > range.max {
            return Err(Error::config(format!(
                "Invalid Seq version range: {} > {}",
                range.min, range.max
            )));
        }
        Ok(range)
    }

    pub fn contains(&self, version: SeqVersion) -> bool {
        self.min <= version && version <= self.max
    }
}

/// Outcome of the startup version gate. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    Supported(SeqVersion),
    OutOfRange {
        version: SeqVersion,
        range: VersionRange,
    },
    /// Server unreachable, key rejected, or version unparseable.
    Unavailable(String),
}

impl VersionCheck {
    pub fn evaluate(reported: &str, range: VersionRange) -> Self {
        match reported.parse::<SeqVersion>() {
            Ok(version) if range.contains(version) => Self::Supported(version),
            Ok(version) => Self::OutOfRange { version, range },
            Err(e) => Self::Unavailable(e.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }
}

/// Query the default workspace's server version and compare it against `range`.
pub async fn check_server_version(factory: &ConnectionFactory, range: VersionRange) -> VersionCheck {
    let reported = match factory.create(None).await {
        Ok(conn) => conn.root().await.map(|root| root.version),
        Err(e) => Err(e),
    };

    let check = match reported {
        Ok(Some(version)) => VersionCheck::evaluate(&version, range),
        Ok(None) => VersionCheck::Unavailable("root document has no Version".into()),
        Err(e) => VersionCheck::Unavailable(e.to_string()),
    };

    match &check {
        VersionCheck::Supported(version) => {
            tracing::info!(%version, "Connected to Seq");
        }
        VersionCheck::OutOfRange { version, range } => {
            tracing::warn!(
                %version,
                min = %range.min,
                max = %range.max,
                "Seq version is outside the supported range"
            );
        }
        VersionCheck::Unavailable(reason) => {
            tracing::error!(reason = %reason, "Failed to determine Seq version");
        }
    }

    check
}
