// server/src/db/seed.rs

use sqlx::PgPool;
use storefront::memory::InMemoryStore;
use storefront::Product;
use tracing::info;
use uuid::Uuid;

const DEMO_PRODUCTS: &[(&str, i64, i32)] = &[
  ("Ceramic Mug", 1200, 25),
  ("Desk Lamp", 4500, 10),
  ("Notebook (A5)", 650, 100),
  ("Wireless Mouse", 2999, 15),
];

pub fn demo_products() -> Vec<Product> {
  DEMO_PRODUCTS
    .iter()
    .map(|(name, price_cents, stock_quantity)| Product {
      id: Uuid::new_v4(),
      name: (*name).to_string(),
      price_cents: *price_cents,
      stock_quantity: *stock_quantity,
    })
    .collect()
}

pub fn seed_memory(store: &InMemoryStore) {
  for product in demo_products() {
    store.upsert_product(product);
  }
  info!(count = DEMO_PRODUCTS.len(), "Seeded in-memory product catalog.");
}

/// Inserts the demo catalog only when the products table is empty.
pub async fn seed_postgres(pool: &PgPool) -> Result<(), sqlx::Error> {
  let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(pool).await?;
  if existing > 0 {
    info!(existing, "Products already present; skipping seed.");
    return Ok(());
  }

  let mut tx = pool.begin().await?;
  for product in demo_products() {
    sqlx::query("INSERT INTO products (id, name, price_cents, stock_quantity) VALUES ($1, $2, $3, $4)")
      .bind(product.id)
      .bind(&product.name)
      .bind(product.price_cents)
      .bind(product.stock_quantity)
      .execute(&mut *tx)
      .await?;
  }
  tx.commit().await?;
  info!(count = DEMO_PRODUCTS.len(), "Seeded product catalog.");
  Ok(())
}
