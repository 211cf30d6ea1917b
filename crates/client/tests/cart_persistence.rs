use client::{Cart, CartStorage, FileCartStorage};
use domain::{GrindOption, Money, ProductId};
use tempfile::TempDir;

fn cart_in(dir: &TempDir) -> Cart<FileCartStorage> {
    Cart::load(FileCartStorage::new(dir.path().join("cart.json")))
}

#[test]
fn cart_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let kona = ProductId::new();
    {
        let mut cart = cart_in(&dir);
        cart.add_item(kona, "Hawaiian Kona", Some(Money::from_cents(3499)), Some(GrindOption::Fine))
            .unwrap();
        cart.add_item(kona, "Hawaiian Kona", Some(Money::from_cents(3499)), Some(GrindOption::Fine))
            .unwrap();
    }

    let cart = cart_in(&dir);
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(cart.items()[0].grind_option, Some(GrindOption::Fine));
    assert_eq!(cart.subtotal(), Money::from_cents(6998));
    assert_eq!(cart.shipping_cost(), Money::zero());
}

#[test]
fn missing_file_is_an_empty_cart() {
    let dir = TempDir::new().unwrap();
    let storage = FileCartStorage::new(dir.path().join("nested").join("cart.json"));
    assert!(storage.load().unwrap().is_empty());

    let mut cart = Cart::load(storage.clone());
    cart.add_item(ProductId::new(), "Breakfast Blend", Some(Money::from_cents(1649)), None)
        .unwrap();
    assert!(storage.path().exists());
    assert!(!dir.path().join("nested").join("cart.json.tmp").exists());
}

#[test]
fn corrupt_file_is_discarded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cart.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut cart = Cart::load(FileCartStorage::new(&path));
    assert!(cart.is_empty());

    // The next write replaces the bad file.
    cart.add_item(ProductId::new(), "Kenyan AA", Some(Money::from_cents(2299)), None)
        .unwrap();
    let reloaded = Cart::load(FileCartStorage::new(&path));
    assert_eq!(reloaded.item_count(), 1);
}

#[test]
fn cleared_cart_stays_cleared() {
    let dir = TempDir::new().unwrap();
    let mut cart = cart_in(&dir);
    cart.add_item(ProductId::new(), "Sumatra Mandheling", Some(Money::from_cents(1999)), None)
        .unwrap();
    cart.clear();

    assert!(cart_in(&dir).is_empty());
}
