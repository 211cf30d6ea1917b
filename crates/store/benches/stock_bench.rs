use criterion::{Criterion, criterion_group, criterion_main};
use domain::{CatalogItem, Category, Money};
use store::{CatalogStore, InMemoryStore, ProductQuery, seed};

fn bench_decrement_stock(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let item = CatalogItem::new(
        "Breakfast Blend",
        "Light and smooth",
        Category::SpecialtyBlend,
        Money::from_cents(1649),
        u32::MAX,
    );
    let id = item.id;
    rt.block_on(async { store.insert_product(&item).await.unwrap() });

    c.bench_function("store/decrement_stock", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.decrement_stock(id, 1).await.unwrap();
            });
        });
    });
}

fn bench_list_products(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    rt.block_on(async { seed::seed_catalog(&store).await.unwrap() });

    c.bench_function("store/list_products_search", |b| {
        b.iter(|| {
            rt.block_on(async {
                store
                    .list_products(&ProductQuery::new().search("smooth"))
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_decrement_stock, bench_list_products);
criterion_main!(benches);
