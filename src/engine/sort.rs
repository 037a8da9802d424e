//! Filtering and ordering of a snapshot for display.

use crate::state::{AssetRecord, SortConfig, SortDirection, SortKey};
use crate::storage::Holdings;
use std::cmp::Ordering;

/// A comparable value extracted from a record.
///
/// `Missing` orders below everything else in either direction's base order,
/// so absent values end up last when descending and first when ascending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

impl SortValue<'_> {
    fn number(value: f64) -> Self {
        if value.is_nan() {
            Self::Missing
        } else {
            Self::Number(value)
        }
    }

    fn optional(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::number)
    }

    /// Base (ascending) ordering.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => Ordering::Less,
            (_, Self::Missing) => Ordering::Greater,
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

/// How a sort key obtains its value.
#[derive(Clone, Copy)]
pub enum Comparator {
    /// Read directly off the record.
    ByField(fn(&AssetRecord) -> SortValue<'_>),
    /// Computed from the record and its held quantity.
    ByDerived(fn(&AssetRecord, f64) -> f64),
}

impl Comparator {
    /// Comparator for a sort key.
    pub fn for_key(key: SortKey) -> Self {
        match key {
            SortKey::Name => Self::ByField(name),
            SortKey::Symbol => Self::ByField(symbol),
            SortKey::Price => Self::ByField(price),
            SortKey::MarketCap => Self::ByField(market_cap),
            SortKey::Change1h => Self::ByField(change_1h),
            SortKey::Change24h => Self::ByField(change_24h),
            SortKey::Holdings => Self::ByDerived(|_, quantity| quantity),
            SortKey::HoldingsValue => Self::ByDerived(|r, quantity| r.value_of(quantity)),
        }
    }

    /// Extract the comparable value of `record`.
    pub fn value<'a>(&self, record: &'a AssetRecord, holdings: &impl Holdings) -> SortValue<'a> {
        match self {
            Self::ByField(field) => field(record),
            Self::ByDerived(derive) => {
                SortValue::number(derive(record, holdings.quantity_of(&record.id)))
            }
        }
    }
}

fn name(r: &AssetRecord) -> SortValue<'_> {
    SortValue::Text(&r.name)
}

fn symbol(r: &AssetRecord) -> SortValue<'_> {
    SortValue::Text(&r.symbol)
}

fn price(r: &AssetRecord) -> SortValue<'_> {
    SortValue::number(r.current_price)
}

fn market_cap(r: &AssetRecord) -> SortValue<'_> {
    SortValue::number(r.market_cap)
}

fn change_1h(r: &AssetRecord) -> SortValue<'_> {
    SortValue::optional(r.price_change_percentage_1h)
}

fn change_24h(r: &AssetRecord) -> SortValue<'_> {
    SortValue::optional(r.price_change_percentage_24h)
}

/// Compare two records under `sort`.
pub fn compare_records(
    a: &AssetRecord,
    b: &AssetRecord,
    holdings: &impl Holdings,
    sort: SortConfig,
) -> Ordering {
    let comparator = Comparator::for_key(sort.key);
    let ordering = comparator
        .value(a, holdings)
        .compare(&comparator.value(b, holdings));
    match sort.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Order `records` in place by `sort`, consulting `holdings` for derived keys.
pub fn sort_records(records: &mut [&AssetRecord], holdings: &impl Holdings, sort: SortConfig) {
    records.sort_by(|a, b| compare_records(a, b, holdings, sort));
}

/// Records whose name or symbol contains `filter`, case-insensitively,
/// ordered by `sort`.
pub fn sort_and_filter<'a>(
    records: &'a [AssetRecord],
    holdings: &impl Holdings,
    filter: &str,
    sort: SortConfig,
) -> Vec<&'a AssetRecord> {
    let needle = filter.to_lowercase();
    let mut visible: Vec<&AssetRecord> = records.iter().filter(|r| r.matches(&needle)).collect();
    sort_records(&mut visible, holdings, sort);
    visible
}
