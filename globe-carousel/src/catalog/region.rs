//! Fixed region to country-code mapping.

use std::fmt;
use std::str::FromStr;

/// Broad geographic grouping used to filter the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Europe,
    Asia,
    Americas,
    Africa,
    Oceania,
    MiddleEast,
}

impl Region {
    /// All regions, in display order.
    pub const ALL: [Region; 6] = [
        Region::Europe,
        Region::Asia,
        Region::Americas,
        Region::Africa,
        Region::Oceania,
        Region::MiddleEast,
    ];

    /// Country codes belonging to this region.
    pub fn codes(&self) -> &'static [&'static str] {
        match self {
            Region::Europe => &["FR", "DE", "IT", "ES", "GB", "GR", "NO"],
            Region::Asia => &["JP", "CN", "IN", "TH", "KR"],
            Region::Americas => &["US", "CA", "BR", "MX", "AR", "PE"],
            Region::Africa => &["EG", "ZA", "KE", "MA"],
            Region::Oceania => &["AU", "NZ"],
            Region::MiddleEast => &["AE", "TR", "JO"],
        }
    }

    /// Returns `true` if `code` belongs to this region.
    pub fn contains(&self, code: &str) -> bool {
        self.codes().iter().any(|c| c.eq_ignore_ascii_case(code))
    }

    /// Stable lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Europe => "europe",
            Region::Asia => "asia",
            Region::Americas => "americas",
            Region::Africa => "africa",
            Region::Oceania => "oceania",
            Region::MiddleEast => "middle-east",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a region name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown region '{0}'")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "europe" => Ok(Region::Europe),
            "asia" => Ok(Region::Asia),
            "americas" => Ok(Region::Americas),
            "africa" => Ok(Region::Africa),
            "oceania" => Ok(Region::Oceania),
            "middle-east" | "middleeast" => Ok(Region::MiddleEast),
            _ => Err(UnknownRegion(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>(), Ok(region));
        }
    }

    #[test]
    fn test_parse_is_lenient_about_case_and_separator() {
        assert_eq!("EUROPE".parse::<Region>(), Ok(Region::Europe));
        assert_eq!("middle_east".parse::<Region>(), Ok(Region::MiddleEast));
    }

    #[test]
    fn test_unknown_region() {
        let err = "atlantis".parse::<Region>().unwrap_err();
        assert_eq!(err.to_string(), "unknown region 'atlantis'");
    }

    #[test]
    fn test_regions_do_not_overlap() {
        let mut seen = std::collections::HashSet::new();
        for region in Region::ALL {
            for code in region.codes() {
                assert!(seen.insert(*code), "{} listed twice", code);
            }
        }
    }

    #[test]
    fn test_contains_ignores_case() {
        assert!(Region::Asia.contains("jp"));
        assert!(!Region::Asia.contains("FR"));
    }
}
