use domain::{CatalogItem, Category, CustomerId, Money, Order, OrderStatus, RoastLevel};

/// Builder for product listing filters.
///
/// Every filter is optional; an empty query lists the whole catalog,
/// newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<Category>,
    pub roast_level: Option<RoastLevel>,
    pub featured: Option<bool>,
    /// Inclusive lower price bound.
    pub min_price: Option<Money>,
    /// Inclusive upper price bound.
    pub max_price: Option<Money>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Featured products, capped at six.
    pub fn featured_only() -> Self {
        Self {
            featured: Some(true),
            limit: Some(6),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn roast_level(mut self, level: RoastLevel) -> Self {
        self.roast_level = Some(level);
        self
    }

    pub fn featured(mut self, featured: bool) -> Self {
        self.featured = Some(featured);
        self
    }

    pub fn min_price(mut self, price: Money) -> Self {
        self.min_price = Some(price);
        self
    }

    pub fn max_price(mut self, price: Money) -> Self {
        self.max_price = Some(price);
        self
    }

    /// Blank terms are ignored.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() {
            None
        } else {
            Some(term.trim().to_string())
        };
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Applies every filter except `limit`.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(category) = self.category
            && item.category != category
        {
            return false;
        }
        if let Some(level) = self.roast_level
            && item.roast_level != Some(level)
        {
            return false;
        }
        if let Some(featured) = self.featured
            && item.featured != featured
        {
            return false;
        }
        if let Some(min) = self.min_price
            && item.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && item.price > max
        {
            return false;
        }
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            return item.name.to_lowercase().contains(&term)
                || item.description.to_lowercase().contains(&term);
        }
        true
    }
}

/// Filter for order listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub customer_id: Option<CustomerId>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Every order.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            status: None,
        }
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.customer_id.is_none_or(|id| order.customer_id == id)
            && self.status.is_none_or(|s| order.status == s)
    }
}
