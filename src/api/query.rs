//! Translation of a selected category and page into a fetch descriptor.

use serde::{Deserialize, Serialize};

/// Page size for the paginated "all" view.
pub const ALL_PAGE_SIZE: u32 = 50;
/// Page size for every bounded, non-paginated view.
pub const CATEGORY_PAGE_SIZE: u32 = 75;

const RWA_CATEGORY: &str = "real-world-assets";

/// A tab of the asset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    All,
    Top,
    Trending,
    MostVisited,
    New,
    Gainers,
    Losers,
    Rwa,
}

impl Category {
    /// All categories in tab order.
    pub const ALL: [Category; 8] = [
        Self::All,
        Self::Top,
        Self::Trending,
        Self::MostVisited,
        Self::New,
        Self::Gainers,
        Self::Losers,
        Self::Rwa,
    ];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Top => "top",
            Self::Trending => "trending",
            Self::MostVisited => "most_visited",
            Self::New => "new",
            Self::Gainers => "gainers",
            Self::Losers => "losers",
            Self::Rwa => "rwa",
        }
    }

    /// Human-readable tab label.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Assets",
            Self::Top => "Top",
            Self::Trending => "Trending",
            Self::MostVisited => "Most Visited",
            Self::New => "New",
            Self::Gainers => "Gainers",
            Self::Losers => "Losers",
            Self::Rwa => "Real-World Assets",
        }
    }

    /// Only the "all" view honors page numbers.
    pub fn is_paginated(self) -> bool {
        self == Self::All
    }

    /// Upstream ordering used for this category.
    pub fn ordering(self) -> MarketOrder {
        match self {
            Self::Trending => MarketOrder::GeckoDesc,
            Self::MostVisited => MarketOrder::VolumeDesc,
            Self::New => MarketOrder::IdDesc,
            Self::All | Self::Top | Self::Gainers | Self::Losers | Self::Rwa => {
                MarketOrder::MarketCapDesc
            }
        }
    }

    fn page_size(self) -> u32 {
        if self.is_paginated() {
            ALL_PAGE_SIZE
        } else {
            CATEGORY_PAGE_SIZE
        }
    }

    fn category_filter(self) -> Option<&'static str> {
        match self {
            Self::Rwa => Some(RWA_CATEGORY),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| crate::Error::invalid_input(format!("unknown category '{}'", s)))
    }
}

/// Ordering understood by the upstream markets endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketOrder {
    MarketCapDesc,
    GeckoDesc,
    VolumeDesc,
    IdDesc,
}

impl MarketOrder {
    /// Query parameter value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MarketCapDesc => "market_cap_desc",
            Self::GeckoDesc => "gecko_desc",
            Self::VolumeDesc => "volume_desc",
            Self::IdDesc => "id_desc",
        }
    }
}

/// Everything needed to request one page of one category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub category: Category,
    /// 1-based page.
    pub page: u32,
    pub per_page: u32,
    pub order: MarketOrder,
    /// Upstream category filter, if any.
    pub category_filter: Option<&'static str>,
}

impl FetchRequest {
    /// Query pairs for the markets endpoint, excluding the quote currency.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("order", self.order.as_str().to_string()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
            ("sparkline", "true".to_string()),
            ("price_change_percentage", "1h,24h,7d".to_string()),
        ];
        if let Some(category) = self.category_filter {
            pairs.push(("category", category.to_string()));
        }
        pairs
    }

    /// Position of the first record of this page in the full listing.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.per_page as usize
    }
}

/// Build the fetch descriptor for `category` at `page`.
///
/// Pages are 1-based and clamped; non-paginated categories always request
/// page 1.
pub fn build_request(category: Category, page: u32) -> FetchRequest {
    let page = if category.is_paginated() {
        page.max(1)
    } else {
        1
    };

    FetchRequest {
        category,
        page,
        per_page: category.page_size(),
        order: category.ordering(),
        category_filter: category.category_filter(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_honors_page() {
        let request = build_request(Category::All, 3);
        assert_eq!(request.page, 3);
        assert_eq!(request.per_page, ALL_PAGE_SIZE);
        assert_eq!(request.order, MarketOrder::MarketCapDesc);
        assert_eq!(request.offset(), 100);
    }

    #[test]
    fn test_page_zero_clamped() {
        assert_eq!(build_request(Category::All, 0).page, 1);
    }

    #[test]
    fn test_bounded_categories_ignore_page() {
        for category in Category::ALL.into_iter().filter(|c| !c.is_paginated()) {
            let request = build_request(category, 7);
            assert_eq!(request.page, 1, "{}", category);
            assert_eq!(request.per_page, CATEGORY_PAGE_SIZE, "{}", category);
            assert!(request.per_page > ALL_PAGE_SIZE);
        }
    }

    #[test]
    fn test_category_orderings() {
        assert_eq!(build_request(Category::Trending, 1).order, MarketOrder::GeckoDesc);
        assert_eq!(build_request(Category::MostVisited, 1).order, MarketOrder::VolumeDesc);
        assert_eq!(build_request(Category::New, 1).order, MarketOrder::IdDesc);
        assert_eq!(build_request(Category::Gainers, 1).order, MarketOrder::MarketCapDesc);
    }

    #[test]
    fn test_rwa_query_pairs() {
        let pairs = build_request(Category::Rwa, 1).query_pairs();
        assert!(pairs.contains(&("category", "real-world-assets".to_string())));
        assert!(pairs.contains(&("sparkline", "true".to_string())));
        assert!(pairs.contains(&("per_page", "75".to_string())));
    }

    #[test]
    fn test_category_round_trip_ids() {
        for category in Category::ALL {
            assert_eq!(category.id().parse::<Category>().unwrap(), category);
        }
        assert!("bogus".parse::<Category>().is_err());
    }
}
