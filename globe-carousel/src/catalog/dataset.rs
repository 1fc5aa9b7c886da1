//! The location catalog: built-in dataset, lookups, and dataset validation.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use rand::Rng;
use thiserror::Error;

use super::location::{validate, Location};
use super::region::Region;

/// Minimum number of entries a catalog should carry for cycling to feel varied.
pub const MIN_RECOMMENDED_ENTRIES: usize = 10;

const BUILTIN_DATASET: &str = include_str!("countries.json");

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The dataset is not a JSON array of locations.
    #[error("Failed to parse location dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A problem found by [`Catalog::validate_dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetIssue {
    /// The dataset has no entries at all.
    Empty,
    /// The entry at `index` fails the location validity predicate.
    InvalidEntry { index: usize, code: String },
    /// `code` appears more than once; `index` is the later occurrence.
    DuplicateCode { index: usize, code: String },
    /// Fewer entries than [`MIN_RECOMMENDED_ENTRIES`]. Not fatal.
    TooSmall { count: usize, minimum: usize },
}

impl DatasetIssue {
    /// Returns `true` if this issue makes the dataset unusable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DatasetIssue::TooSmall { .. })
    }
}

impl fmt::Display for DatasetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetIssue::Empty => write!(f, "dataset is empty"),
            DatasetIssue::InvalidEntry { index, code } => {
                write!(f, "entry {} ('{}') is invalid", index, code)
            }
            DatasetIssue::DuplicateCode { index, code } => {
                write!(f, "entry {} repeats code '{}'", index, code)
            }
            DatasetIssue::TooSmall { count, minimum } => write!(
                f,
                "dataset has {} entries, at least {} recommended",
                count, minimum
            ),
        }
    }
}

/// Result of validating a whole dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetReport {
    /// `true` when no fatal issue was found.
    pub is_valid: bool,
    /// All issues, fatal or not, in discovery order.
    pub errors: Vec<DatasetIssue>,
    /// Entries passing the validity predicate.
    pub valid_count: usize,
    /// Entries in the dataset.
    pub total_count: usize,
}

/// Immutable set of locations available for cycling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    locations: Vec<Location>,
}

impl Catalog {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// Parse a catalog from a JSON array of locations.
    ///
    /// Parsing does not validate entries; call [`validate_dataset`](Self::validate_dataset).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let locations: Vec<Location> = serde_json::from_str(json)?;
        Ok(Self { locations })
    }

    /// The built-in country catalog, parsed once per process.
    pub fn builtin() -> &'static Catalog {
        BUILTIN.get_or_init(|| match Catalog::from_json(BUILTIN_DATASET) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(error = %e, "Built-in location dataset is corrupt");
                Catalog::default()
            }
        })
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Look up a location by code (case-insensitive).
    pub fn by_code(&self, code: &str) -> Option<&Location> {
        self.locations
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(code))
    }

    /// All locations in `region`, in catalog order.
    pub fn by_region(&self, region: Region) -> Vec<&Location> {
        self.locations
            .iter()
            .filter(|l| region.contains(&l.code))
            .collect()
    }

    /// Like [`by_region`](Self::by_region) but takes a region name.
    ///
    /// Unknown names yield an empty list.
    pub fn by_region_name(&self, name: &str) -> Vec<&Location> {
        match name.parse::<Region>() {
            Ok(region) => self.by_region(region),
            Err(_) => Vec::new(),
        }
    }

    /// Uniform pick with no anti-repetition state.
    pub fn random_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Location> {
        if self.locations.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.locations.len());
        self.locations.get(index)
    }

    /// Validate every entry and the dataset as a whole.
    pub fn validate_dataset(&self) -> DatasetReport {
        let mut errors = Vec::new();
        let total_count = self.locations.len();

        if total_count == 0 {
            errors.push(DatasetIssue::Empty);
        }

        let mut seen = HashSet::new();
        let mut valid_count = 0;
        for (index, location) in self.locations.iter().enumerate() {
            if validate(location) {
                valid_count += 1;
            } else {
                errors.push(DatasetIssue::InvalidEntry {
                    index,
                    code: location.code.clone(),
                });
            }
            if !seen.insert(location.code.to_ascii_uppercase()) {
                errors.push(DatasetIssue::DuplicateCode {
                    index,
                    code: location.code.clone(),
                });
            }
        }

        if total_count > 0 && total_count < MIN_RECOMMENDED_ENTRIES {
            errors.push(DatasetIssue::TooSmall {
                count: total_count,
                minimum: MIN_RECOMMENDED_ENTRIES,
            });
        }

        DatasetReport {
            is_valid: !errors.iter().any(DatasetIssue::is_fatal),
            errors,
            valid_count,
            total_count,
        }
    }
}
