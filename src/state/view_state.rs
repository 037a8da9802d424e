//! Transient view state: active category, page, filter and sort.

use crate::api::{Category, FetchRequest, build_request};

/// Column the visible table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Symbol,
    Price,
    MarketCap,
    Change1h,
    Change24h,
    /// Held quantity (derived from holdings).
    Holdings,
    /// Held quantity times current price (derived from holdings).
    HoldingsValue,
}

impl SortKey {
    /// All keys in column order.
    pub const ALL: [SortKey; 8] = [
        Self::Name,
        Self::Symbol,
        Self::Price,
        Self::MarketCap,
        Self::Change1h,
        Self::Change24h,
        Self::Holdings,
        Self::HoldingsValue,
    ];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::Price => "current_price",
            Self::MarketCap => "market_cap",
            Self::Change1h => "price_change_percentage_1h",
            Self::Change24h => "price_change_percentage_24h",
            Self::Holdings => "holdings",
            Self::HoldingsValue => "holdings_value",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for SortKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .or(match s {
                "price" => Some(Self::Price),
                "cap" => Some(Self::MarketCap),
                "1h" => Some(Self::Change1h),
                "24h" => Some(Self::Change24h),
                "value" => Some(Self::HoldingsValue),
                _ => None,
            })
            .ok_or_else(|| crate::Error::invalid_input(format!("unknown sort key '{}'", s)))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Active sort key and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::MarketCap,
            direction: SortDirection::Descending,
        }
    }
}

impl SortConfig {
    /// Select `key`. Re-selecting the active descending key flips it to
    /// ascending; anything else starts descending.
    pub fn toggle(&mut self, key: SortKey) {
        self.direction = if self.key == key && self.direction == SortDirection::Descending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        self.key = key;
    }
}

/// What the user is currently looking at.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub category: Category,
    /// 1-based; only meaningful for [`Category::All`].
    pub page: u32,
    pub filter: String,
    pub sort: SortConfig,
}

impl ViewState {
    /// Initial view: all assets, first page.
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    /// Fetch descriptor for the current category and page.
    pub fn request(&self) -> FetchRequest {
        build_request(self.category, self.page)
    }

    /// Switch category. Returns whether anything changed; a change resets
    /// the page to 1.
    pub fn set_category(&mut self, category: Category) -> bool {
        if self.category == category {
            return false;
        }
        self.category = category;
        self.page = 1;
        true
    }

    /// Change page, clamped to 1. Only paginated categories accept it.
    /// Returns whether anything changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if !self.category.is_paginated() || self.page == page {
            return false;
        }
        self.page = page;
        true
    }
}
