use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    FashionPortraits,
    FoodBeverage,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::FashionPortraits, Category::FoodBeverage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FashionPortraits => "fashion-portraits",
            Category::FoodBeverage => "food-beverage",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::FashionPortraits => "Fashion & Portraits",
            Category::FoodBeverage => "Food & Beverage",
        }
    }

    /// Case-insensitive lookup by slug.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gallery filter. Blank or unknown values mean `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(Category::parse)
            .map(CategoryFilter::Only)
            .unwrap_or(CategoryFilter::All)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(category) => category.as_str(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(category) => category.display_name(),
        }
    }

    pub fn matches(&self, item: &MediaItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => item.category == *category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only projection of one portfolio image in the media store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    pub alt: String,
    pub category: Category,
    pub original_url: String,
    /// The `small` crop, shown in the grid.
    pub url: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Orders by sort order, then title.
pub fn sort_media(items: &mut [MediaItem]) {
    items.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Appends `crop={size}` to an image URL, keeping any existing query.
pub fn crop_url(original: &str, size: &str) -> String {
    let separator = if original.contains('?') { '&' } else { '?' };
    format!("{}{}crop={}", original, separator, size)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    pub total_images: u64,
    pub category_counts: BTreeMap<String, u64>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PortfolioStats {
    pub fn from_items(items: &[MediaItem]) -> Self {
        let mut category_counts = BTreeMap::new();
        category_counts.insert(CategoryFilter::All.as_str().to_string(), items.len() as u64);
        for category in Category::ALL {
            let count = items.iter().filter(|item| item.category == category).count();
            category_counts.insert(category.as_str().to_string(), count as u64);
        }

        Self {
            total_images: items.len() as u64,
            category_counts,
            last_updated: items.iter().map(|item| item.updated_at).max(),
        }
    }
}

/// Model behind the gallery landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMainPage {
    pub images: Vec<MediaItem>,
    pub stats: PortfolioStats,
    pub generated_at: DateTime<Utc>,
}
