//! Catalog items and their variant enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use common::ProductId;

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    RoastedCoffee,
    GreenCoffee,
    SpecialtyBlend,
    EnergyDrink,
}

/// Roast level of a coffee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoastLevel {
    Light,
    Medium,
    Dark,
}

/// Grind variant of a coffee product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrindOption {
    WholeBean,
    Coarse,
    Medium,
    Fine,
    Espresso,
}

impl GrindOption {
    pub const ALL: [GrindOption; 5] = [
        GrindOption::WholeBean,
        GrindOption::Coarse,
        GrindOption::Medium,
        GrindOption::Fine,
        GrindOption::Espresso,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GrindOption::WholeBean => "whole-bean",
            GrindOption::Coarse => "coarse",
            GrindOption::Medium => "medium",
            GrindOption::Fine => "fine",
            GrindOption::Espresso => "espresso",
        }
    }
}

impl std::fmt::Display for GrindOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::RoastedCoffee => "roasted-coffee",
            Category::GreenCoffee => "green-coffee",
            Category::SpecialtyBlend => "specialty-blend",
            Category::EnergyDrink => "energy-drink",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "roasted-coffee" => Some(Category::RoastedCoffee),
            "green-coffee" => Some(Category::GreenCoffee),
            "specialty-blend" => Some(Category::SpecialtyBlend),
            "energy-drink" => Some(Category::EnergyDrink),
            _ => None,
        }
    }
}

impl RoastLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoastLevel::Light => "light",
            RoastLevel::Medium => "medium",
            RoastLevel::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(RoastLevel::Light),
            "medium" => Some(RoastLevel::Medium),
            "dark" => Some(RoastLevel::Dark),
            _ => None,
        }
    }
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: Money,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub roast_level: Option<RoastLevel>,
    #[serde(default)]
    pub flavor_profile: Vec<String>,
    /// Units on hand. Never negative.
    pub stock: u32,
    /// Empty when the product has no grind variants.
    #[serde(default)]
    pub grind_options: Vec<GrindOption>,
    #[serde(default)]
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Creates an item with no optional attributes set.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        price: Money,
        stock: u32,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            description: description.into(),
            category,
            price,
            images: Vec::new(),
            origin: None,
            roast_level: None,
            flavor_profile: Vec::new(),
            stock,
            grind_options: Vec::new(),
            featured: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_grind_options(mut self, options: impl IntoIterator<Item = GrindOption>) -> Self {
        self.grind_options = options.into_iter().collect();
        self
    }

    pub fn with_roast_level(mut self, level: RoastLevel) -> Self {
        self.roast_level = Some(level);
        self
    }

    pub fn with_images(mut self, images: &[&str]) -> Self {
        self.images = images.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_flavor_profile(mut self, notes: &[&str]) -> Self {
        self.flavor_profile = notes.iter().map(|s| (*s).to_string()).collect();
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    /// A missing grind is always acceptable; a present one must be declared.
    pub fn offers_grind(&self, grind: Option<GrindOption>) -> bool {
        match grind {
            None => true,
            Some(g) => self.grind_options.contains(&g),
        }
    }

    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }
}
