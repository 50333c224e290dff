//! Catalog filtering pipeline
//!
//! Pure, order-preserving filtering over fetched pages. Three criteria are
//! applied in sequence: minimum release year drops whole items, then the
//! format filter and the quality filter prune variants, with the quality
//! filter operating on the variant list the format filter already reduced.
//! An item whose variant list empties out is dropped entirely.

use crate::CatalogItem;
use std::str::FromStr;

/// Quality criterion. `All` is a wildcard retaining every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityFilter {
    /// Retain every quality
    All,
    /// Retain only this quality token (e.g. "1080p", "3D")
    Quality(String),
}

impl QualityFilter {
    /// Whether a variant quality token passes this filter.
    pub fn matches(&self, quality: &str) -> bool {
        match self {
            QualityFilter::All => true,
            QualityFilter::Quality(wanted) => quality == wanted,
        }
    }
}

impl FromStr for QualityFilter {
    type Err = String;

    /// The API reports the stereoscopic quality as "3D" while the original
    /// CLI accepted "3d"; lowercase input is normalized up-front so the
    /// comparison stays a plain equality.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(QualityFilter::All),
            "3d" | "3D" => Ok(QualityFilter::Quality("3D".to_string())),
            "720p" | "1080p" | "2160p" => Ok(QualityFilter::Quality(s.to_string())),
            _ => Err(format!(
                "Invalid quality: {s}. Valid options: all, 720p, 1080p, 2160p, 3d"
            )),
        }
    }
}

/// Format criterion. `All` is a wildcard retaining every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatFilter {
    /// Retain every format
    All,
    /// Retain only this format token (e.g. "web", "bluray")
    Format(String),
}

impl FormatFilter {
    /// Whether a variant format token passes this filter. The API reports
    /// lowercase tokens; comparison ignores case so "WEB" and "web" agree.
    pub fn matches(&self, format: &str) -> bool {
        match self {
            FormatFilter::All => true,
            FormatFilter::Format(wanted) => format.eq_ignore_ascii_case(wanted),
        }
    }
}

impl FromStr for FormatFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(FormatFilter::All),
            "web" | "bluray" => Ok(FormatFilter::Format(s.to_lowercase())),
            _ => Err(format!("Invalid format: {s}. Valid options: all, web, bluray")),
        }
    }
}

/// Combined filter criteria for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Minimum release year; items released earlier are dropped
    pub year_limit: u32,
    /// Format criterion
    pub format: FormatFilter,
    /// Quality criterion
    pub quality: QualityFilter,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            year_limit: 0,
            format: FormatFilter::All,
            quality: QualityFilter::All,
        }
    }
}

/// Apply the criteria to one page of items, producing a new sequence.
///
/// Surviving items keep their relative order and their surviving variants
/// keep theirs. Idempotent: applying the same criteria twice equals applying
/// them once.
pub fn apply(items: Vec<CatalogItem>, criteria: &FilterCriteria) -> Vec<CatalogItem> {
    items
        .into_iter()
        .filter(|item| item.year >= criteria.year_limit)
        .filter_map(|mut item| {
            item.torrents
                .retain(|torrent| criteria.format.matches(&torrent.format));
            item.torrents
                .retain(|torrent| criteria.quality.matches(&torrent.quality));
            if item.torrents.is_empty() {
                None
            } else {
                Some(item)
            }
        })
        .collect()
}

/// Total torrent variants across a slice of items.
pub fn torrent_count(items: &[CatalogItem]) -> u64 {
    items.iter().map(|item| item.torrents.len() as u64).sum()
}
