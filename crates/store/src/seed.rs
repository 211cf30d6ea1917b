//! Demo catalog and users.

use domain::{Address, CatalogItem, Category, GrindOption, Money, RoastLevel, Role};

use crate::{ProductQuery, Result, store::CatalogStore};

use GrindOption::{Coarse, Espresso, Fine, Medium, WholeBean};

/// A demo user. The password is plain text; hashing is up to the caller.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub role: Role,
    pub address: Option<Address>,
}

fn address(street: &str, city: &str, state: &str, zip_code: &str) -> Address {
    Address {
        street: street.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        zip_code: zip_code.to_string(),
        country: "USA".to_string(),
    }
}

pub fn demo_users() -> Vec<SeedUser> {
    vec![
        SeedUser {
            name: "Admin User",
            email: "admin@caffeinecorner.com",
            password: "admin123",
            role: Role::Admin,
            address: Some(address("123 Coffee St", "Seattle", "WA", "98101")),
        },
        SeedUser {
            name: "John Doe",
            email: "john@example.com",
            password: "password123",
            role: Role::Customer,
            address: Some(address("456 Brew Avenue", "Portland", "OR", "97201")),
        },
        SeedUser {
            name: "Jane Smith",
            email: "jane@example.com",
            password: "password123",
            role: Role::Customer,
            address: None,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn coffee(
    name: &str,
    description: &str,
    category: Category,
    cents: i64,
    origin: &str,
    roast: RoastLevel,
    flavors: &[&str],
    stock: u32,
    grinds: &[GrindOption],
) -> CatalogItem {
    CatalogItem::new(name, description, category, Money::from_cents(cents), stock)
        .with_origin(origin)
        .with_roast_level(roast)
        .with_flavor_profile(flavors)
        .with_grind_options(grinds.iter().copied())
}

/// The demo catalog, in listing order.
pub fn demo_catalog() -> Vec<CatalogItem> {
    use Category::{EnergyDrink, GreenCoffee, RoastedCoffee, SpecialtyBlend};
    use RoastLevel::{Dark, Light};

    let all = [WholeBean, Coarse, Medium, Fine];

    vec![
        coffee(
            "Ethiopian Yirgacheffe",
            "A bright and floral coffee with notes of citrus and jasmine. Single-origin beans from Ethiopia.",
            RoastedCoffee, 1899, "Ethiopia", Light,
            &["citrus", "jasmine", "floral", "bright"], 50,
            &[WholeBean, Coarse, Medium, Fine, Espresso],
        )
        .featured(),
        coffee(
            "Colombian Supremo",
            "Smooth and well-balanced with notes of caramel and nuts. Medium roast perfection.",
            RoastedCoffee, 1699, "Colombia", RoastLevel::Medium,
            &["caramel", "nutty", "smooth", "balanced"], 75,
            &[WholeBean, Medium, Fine],
        )
        .featured(),
        coffee(
            "Dark Roast Espresso Blend",
            "Bold and rich with dark chocolate notes. Perfect for espresso lovers.",
            RoastedCoffee, 1999, "Brazil", Dark,
            &["dark chocolate", "bold", "smoky", "rich"], 60,
            &[WholeBean, Fine, Espresso],
        )
        .featured(),
        CatalogItem::new(
            "Guatemalan Green Beans",
            "Raw, unroasted coffee beans for home roasters. High-quality single-origin beans.",
            GreenCoffee,
            Money::from_cents(1499),
            100,
        )
        .with_origin("Guatemala"),
        coffee(
            "House Blend Premium",
            "Our signature blend combining beans from three continents. Smooth and versatile.",
            SpecialtyBlend, 1799, "Multi-Origin", RoastLevel::Medium,
            &["smooth", "balanced", "chocolate", "caramel"], 80,
            &all,
        )
        .featured(),
        CatalogItem::new(
            "Energy Boost Drink",
            "Natural energy drink with green tea extract and B-vitamins. No artificial sweeteners.",
            EnergyDrink,
            Money::from_cents(399),
            200,
        ),
        coffee(
            "Costa Rican Tarrazu",
            "Clean and bright with honey-like sweetness. Perfect for pour-over brewing.",
            RoastedCoffee, 2099, "Costa Rica", Light,
            &["honey", "bright", "clean", "sweet"], 45,
            &[WholeBean, Coarse, Medium],
        ),
        coffee(
            "Italian Espresso Roast",
            "Traditional Italian-style espresso roast. Intense and full-bodied.",
            RoastedCoffee, 1849, "Italy", Dark,
            &["intense", "full-bodied", "bold", "creamy"], 55,
            &[WholeBean, Fine, Espresso],
        ),
        coffee(
            "Sumatra Mandheling",
            "Full-bodied and earthy with low acidity. Deep, rich flavors with hints of dark chocolate and spice.",
            RoastedCoffee, 1999, "Indonesia", Dark,
            &["earthy", "dark chocolate", "spicy", "full-bodied"], 65,
            &all,
        )
        .featured(),
        coffee(
            "Kenyan AA",
            "Bright and wine-like with complex berry notes. Highly sought after single-origin coffee.",
            RoastedCoffee, 2299, "Kenya", RoastLevel::Medium,
            &["wine-like", "berry", "bright", "complex"], 40,
            &all,
        )
        .featured(),
        coffee(
            "Hawaiian Kona",
            "Smooth and mild with delicate floral notes. One of the world's most prized coffees from the slopes of Mauna Loa.",
            RoastedCoffee, 3499, "Hawaii", RoastLevel::Medium,
            &["smooth", "floral", "mild", "delicate"], 30,
            &all,
        )
        .featured(),
        coffee(
            "French Vanilla Blend",
            "Smooth medium roast with natural vanilla flavoring. Perfect for those who enjoy flavored coffees.",
            SpecialtyBlend, 1699, "Multi-Origin", RoastLevel::Medium,
            &["vanilla", "smooth", "sweet", "creamy"], 90,
            &all,
        ),
        coffee(
            "Hazelnut Crème",
            "Rich medium-dark roast with natural hazelnut flavor. A customer favorite for its nutty sweetness.",
            SpecialtyBlend, 1749, "Multi-Origin", RoastLevel::Medium,
            &["hazelnut", "nutty", "sweet", "rich"], 85,
            &all,
        ),
        coffee(
            "Decaf Colombian",
            "Smooth and balanced decaffeinated coffee. Swiss water processed to preserve flavor without chemicals.",
            RoastedCoffee, 1899, "Colombia", RoastLevel::Medium,
            &["smooth", "balanced", "nutty", "mild"], 70,
            &all,
        ),
        coffee(
            "Jamaican Blue Mountain",
            "Legendary coffee known for its mild flavor and lack of bitterness. Smooth, sweet, and balanced.",
            RoastedCoffee, 4999, "Jamaica", RoastLevel::Medium,
            &["mild", "sweet", "smooth", "balanced"], 25,
            &all,
        )
        .featured(),
        coffee(
            "Peruvian Organic",
            "Certified organic single-origin coffee. Bright acidity with notes of chocolate and nuts.",
            RoastedCoffee, 1949, "Peru", RoastLevel::Medium,
            &["chocolate", "nutty", "bright", "organic"], 60,
            &all,
        ),
        coffee(
            "Espresso Blend Deluxe",
            "Our premium espresso blend combining South American and African beans. Perfect for cappuccinos and lattes.",
            SpecialtyBlend, 2199, "Multi-Origin", Dark,
            &["bold", "creamy", "chocolate", "smooth"], 50,
            &[WholeBean, Fine, Espresso],
        )
        .featured(),
        coffee(
            "Vietnamese Robusta",
            "Strong and bold Vietnamese coffee with traditional dark roast. Perfect for Vietnamese iced coffee.",
            RoastedCoffee, 1599, "Vietnam", Dark,
            &["bold", "strong", "smoky", "intense"], 75,
            &all,
        ),
        coffee(
            "Breakfast Blend",
            "Light and smooth morning blend. Designed to start your day right with balanced flavor.",
            SpecialtyBlend, 1649, "Multi-Origin", Light,
            &["smooth", "balanced", "bright", "light"], 95,
            &all,
        ),
        CatalogItem::new(
            "Ethiopian Green Beans",
            "Premium unroasted Ethiopian beans for home roasters. Experience the joy of roasting your own coffee.",
            GreenCoffee,
            Money::from_cents(1699),
            55,
        )
        .with_origin("Ethiopia"),
    ]
}

/// Inserts the demo catalog unless the store already has products.
/// Returns how many products were inserted.
pub async fn seed_catalog<S: CatalogStore + ?Sized>(store: &S) -> Result<usize> {
    if !store.list_products(&ProductQuery::new().limit(1)).await?.is_empty() {
        tracing::debug!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    let catalog = demo_catalog();
    // One second apart, in insertion order, so newest-first listings are stable.
    let base = chrono::Utc::now();
    let count = catalog.len();
    for (i, mut item) in catalog.into_iter().enumerate() {
        let offset = i64::try_from(count - i).unwrap_or(i64::MAX);
        item.created_at = base - chrono::Duration::seconds(offset);
        store.insert_product(&item).await?;
    }

    tracing::info!(products = count, "Seeded demo catalog");
    Ok(count)
}
