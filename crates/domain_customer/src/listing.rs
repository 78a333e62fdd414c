//! Customer listing and search
//!
//! A [`CustomerListQuery`] is what a caller asks for: one customer type, an
//! optional name search, an age range in whole years and a page. The service
//! resolves it against the business date into [`ListCriteria`], which holds
//! only stored values (dates, folded search text) so every adapter can
//! evaluate it without a clock.
//!
//! # Age window
//!
//! Ages are measured the same way the onboarding rules measure them
//! ([`age_in_years`](crate::age::age_in_years)): a customer is `n` years old
//! from their `n`-th anniversary up to the day before the next one. For ages
//! `min..=max` on `today` the matching reference dates are
//!
//! ```text
//! today - (max + 1) years  <  date  <=  today - min years
//! ```
//!
//! Subtracting years clamps Feb 29 to Feb 28.

use chrono::{Datelike, Months, NaiveDate};
use std::cmp::Ordering;
use std::fmt;

use crate::customer::{Customer, CustomerKind};
use crate::ports::RecordFilter;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Which customers a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerType {
    Individual,
    Corporate,
}

impl CustomerType {
    /// Same string as [`CustomerKind::name`]
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Individual => "individual",
            CustomerType::Corporate => "corporate",
        }
    }

    pub fn matches(&self, kind: &CustomerKind) -> bool {
        match self {
            CustomerType::Individual => kind.is_individual(),
            CustomerType::Corporate => !kind.is_individual(),
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Folds a name for substring search
///
/// Stored search text and search terms both go through this function, so
/// the in-memory store and PostgreSQL agree on every script.
pub fn fold_search_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A listing request as the API receives it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerListQuery {
    pub kind: CustomerType,
    /// Matched against "first last" for individuals, the company name for
    /// corporates
    pub search: Option<String>,
    /// Lower age bound in whole years, inclusive
    pub min_age: Option<i32>,
    /// Upper age bound in whole years, inclusive
    pub max_age: Option<i32>,
    /// Year of the date of birth or foundation date
    pub foundation_year: Option<i32>,
    pub active: Option<bool>,
    /// Zero-based page index
    pub page: u32,
    pub page_size: u32,
}

impl CustomerListQuery {
    pub fn new(kind: CustomerType) -> Self {
        Self {
            kind,
            search: None,
            min_age: None,
            max_age: None,
            foundation_year: None,
            active: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_ages(mut self, min_age: Option<i32>, max_age: Option<i32>) -> Self {
        self.min_age = min_age;
        self.max_age = max_age;
        self
    }

    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

/// Inclusive range of reference dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

impl DateWindow {
    /// Reference dates whose age on `today` lies within `min_age..=max_age`
    pub fn for_ages(min_age: Option<i32>, max_age: Option<i32>, today: NaiveDate) -> Self {
        let latest = min_age.map(|age| years_before(today, age).unwrap_or(NaiveDate::MIN));
        let earliest = max_age
            .and_then(|age| age.checked_add(1))
            .and_then(|age| years_before(today, age))
            .and_then(|date| date.succ_opt());

        Self { earliest, latest }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.earliest.map_or(true, |earliest| date >= earliest)
            && self.latest.map_or(true, |latest| date <= latest)
    }
}

/// `today` moved back by whole years; negative years are treated as zero
fn years_before(today: NaiveDate, years: i32) -> Option<NaiveDate> {
    let months = u32::try_from(years.max(0)).ok()?.checked_mul(12)?;
    today.checked_sub_months(Months::new(months))
}

/// A listing resolved against the business date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCriteria {
    pub kind: CustomerType,
    /// Already folded with [`fold_search_text`]; never empty
    pub search: Option<String>,
    pub reference_dates: DateWindow,
    pub reference_year: Option<i32>,
    pub active: Option<bool>,
    pub filter: RecordFilter,
    pub page: u32,
    pub page_size: u32,
}

impl ListCriteria {
    /// Resolves a query on `today`; soft-deleted customers are never listed
    pub fn resolve(query: &CustomerListQuery, today: NaiveDate) -> Self {
        Self {
            kind: query.kind,
            search: query
                .search
                .as_deref()
                .map(fold_search_text)
                .filter(|term| !term.is_empty()),
            reference_dates: DateWindow::for_ages(query.min_age, query.max_age, today),
            reference_year: query.foundation_year,
            active: query.active,
            filter: RecordFilter::ActiveOnly,
            page: query.page,
            page_size: query.page_size.max(1),
        }
    }

    /// Rows to skip before the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// Evaluates the criteria against a single stored record
    pub fn matches(&self, customer: &Customer) -> bool {
        let reference_date = customer.kind.reference_date();

        self.filter.admits(customer)
            && self.kind.matches(&customer.kind)
            && self.active.map_or(true, |active| customer.is_active == active)
            && self.reference_dates.contains(reference_date)
            && self
                .reference_year
                .map_or(true, |year| reference_date.year() == year)
            && self
                .search
                .as_deref()
                .map_or(true, |term| customer.search_text().contains(term))
    }
}

/// Listing order: first then last name, or company name, then id
///
/// Names compare by code point, as PostgreSQL does under `COLLATE "C"`.
pub fn listing_order(a: &Customer, b: &Customer) -> Ordering {
    sort_names(&a.kind)
        .cmp(&sort_names(&b.kind))
        .then_with(|| a.id.cmp(&b.id))
}

fn sort_names(kind: &CustomerKind) -> (&str, &str) {
    match kind {
        CustomerKind::Individual(details) => (&details.first_name, &details.last_name),
        CustomerKind::Corporate(details) => (&details.company_name, ""),
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(u64::from(self.page_size.max(1)))
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }
}
