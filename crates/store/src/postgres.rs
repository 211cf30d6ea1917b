use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use domain::{
    Address, CatalogItem, Category, CustomerAccount, CustomerId, GrindOption, Money, Order,
    OrderId, OrderLine, OrderStatus, PaymentMethod, ProductId, RoastLevel, Role, Totals,
    normalize_email,
};

use crate::{
    OrderFilter, ProductQuery, Result, StoreError,
    store::{AccountChanges, AccountStore, CatalogStore, OrderStore, StockUpdate, Store},
};

const EMAIL_UNIQUE_CONSTRAINT: &str = "accounts_email_key";

const PRODUCT_COLUMNS: &str = "id, name, description, category, price, images, origin, roast_level, \
     flavor_profile, stock, grind_options, featured, created_at";

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, addresses, created_at";

const ORDER_COLUMNS: &str = "id, customer_id, items, subtotal, shipping, tax, total, quoted_totals, \
     shipping_address, status, payment_method, card_last4, created_at, updated_at";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

fn parse_enum<T>(value: &str, parse: fn(&str) -> Option<T>, what: &str) -> Result<T> {
    parse(value).ok_or_else(|| StoreError::Corrupt(format!("unknown {what} {value:?}")))
}

fn stock_from_db(stock: i64) -> Result<u32> {
    u32::try_from(stock).map_err(|_| StoreError::Corrupt(format!("stock out of range: {stock}")))
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn map_email_conflict(err: sqlx::Error, email: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
    {
        return StoreError::DuplicateEmail(email.to_string());
    }
    StoreError::from(err)
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<CatalogItem> {
        let category: String = row.try_get("category")?;
        let roast_level: Option<String> = row.try_get("roast_level")?;
        let Json(images): Json<Vec<String>> = row.try_get("images")?;
        let Json(flavor_profile): Json<Vec<String>> = row.try_get("flavor_profile")?;
        let Json(grind_options): Json<Vec<GrindOption>> = row.try_get("grind_options")?;

        Ok(CatalogItem {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: parse_enum(&category, Category::parse, "category")?,
            price: Money::new(row.try_get::<Decimal, _>("price")?),
            images,
            origin: row.try_get("origin")?,
            roast_level: roast_level
                .as_deref()
                .map(|r| parse_enum(r, RoastLevel::parse, "roast level"))
                .transpose()?,
            flavor_profile,
            stock: stock_from_db(row.try_get("stock")?)?,
            grind_options,
            featured: row.try_get("featured")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_account(row: PgRow) -> Result<CustomerAccount> {
        let role: String = row.try_get("role")?;
        let Json(addresses): Json<Vec<Address>> = row.try_get("addresses")?;

        Ok(CustomerAccount {
            id: CustomerId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: parse_enum(&role, Role::parse, "role")?,
            addresses,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let payment_method: String = row.try_get("payment_method")?;
        let Json(items): Json<Vec<OrderLine>> = row.try_get("items")?;
        let Json(shipping_address): Json<Address> = row.try_get("shipping_address")?;
        let quoted_totals: Option<Json<Totals>> = row.try_get("quoted_totals")?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            items,
            subtotal: Money::new(row.try_get("subtotal")?),
            shipping: Money::new(row.try_get("shipping")?),
            tax: Money::new(row.try_get("tax")?),
            total: Money::new(row.try_get("total")?),
            quoted_totals: quoted_totals.map(|Json(t)| t),
            shipping_address,
            status: parse_enum(&status, OrderStatus::parse, "order status")?,
            payment_method: parse_enum(&payment_method, PaymentMethod::parse, "payment method")?,
            card_last4: row.try_get("card_last4")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<CatalogItem>> {
        let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1");
        let mut param_count = 0;

        // Build dynamic query
        if query.category.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND category = ${param_count}"));
        }
        if query.roast_level.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND roast_level = ${param_count}"));
        }
        if query.featured.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND featured = ${param_count}"));
        }
        if query.min_price.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND price >= ${param_count}"));
        }
        if query.max_price.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND price <= ${param_count}"));
        }
        if query.search.is_some() {
            param_count += 1;
            sql.push_str(&format!(
                " AND (name ILIKE ${param_count} OR description ILIKE ${param_count})"
            ));
        }

        sql.push_str(" ORDER BY created_at DESC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(category) = query.category {
            sqlx_query = sqlx_query.bind(category.as_str());
        }
        if let Some(level) = query.roast_level {
            sqlx_query = sqlx_query.bind(level.as_str());
        }
        if let Some(featured) = query.featured {
            sqlx_query = sqlx_query.bind(featured);
        }
        if let Some(min) = query.min_price {
            sqlx_query = sqlx_query.bind(min.amount());
        }
        if let Some(max) = query.max_price {
            sqlx_query = sqlx_query.bind(max.amount());
        }
        if let Some(ref term) = query.search {
            sqlx_query = sqlx_query.bind(format!("%{}%", escape_like(term)));
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<CatalogItem>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn insert_product(&self, item: &CatalogItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, category, price, images, origin, roast_level,
                                  flavor_profile, stock, grind_options, featured, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.category.as_str())
        .bind(item.price.amount())
        .bind(Json(&item.images))
        .bind(&item.origin)
        .bind(item.roast_level.map(|r| r.as_str()))
        .bind(Json(&item.flavor_profile))
        .bind(i64::from(item.stock))
        .bind(Json(&item.grind_options))
        .bind(item.featured)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> Result<StockUpdate> {
        let remaining: Option<i64> = sqlx::query_scalar(
            "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2 RETURNING stock",
        )
        .bind(id.as_uuid())
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(remaining) = remaining {
            return Ok(StockUpdate::Applied {
                remaining: stock_from_db(remaining)?,
            });
        }

        // The update matched nothing: tell a shortfall from a missing product.
        let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match available {
            Some(available) => Ok(StockUpdate::Insufficient {
                available: stock_from_db(available)?,
            }),
            None => Ok(StockUpdate::NotFound),
        }
    }

    async fn restock(&self, id: ProductId, quantity: u32) -> Result<()> {
        let result = sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(i64::from(quantity))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<CustomerAccount>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE lower(email) = $1"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_account).transpose()
    }

    async fn get_account(&self, id: CustomerId) -> Result<Option<CustomerAccount>> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_account).transpose()
    }

    async fn insert_account(&self, account: &CustomerAccount) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, password_hash, role, addresses, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(Json(&account.addresses))
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_email_conflict(e, &account.email))?;

        Ok(())
    }

    async fn update_account(
        &self,
        id: CustomerId,
        changes: &AccountChanges,
    ) -> Result<CustomerAccount> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE accounts
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                addresses = COALESCE($4, addresses)
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.addresses.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_email_conflict(e, changes.email.as_deref().unwrap_or_default()))?;

        match row {
            Some(row) => Self::row_to_account(row),
            None => Err(StoreError::not_found("Account", id)),
        }
    }

    async fn set_password_hash(&self, id: CustomerId, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Account", id));
        }
        Ok(())
    }

    async fn append_address(&self, id: CustomerId, address: &Address) -> Result<bool> {
        let appended: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET addresses = addresses || $2
            WHERE id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM jsonb_array_elements(addresses) AS a
                  WHERE lower(btrim(a->>'street')) = lower(btrim($3))
                    AND lower(btrim(a->>'city')) = lower(btrim($4))
              )
            RETURNING id
            "#,
        )
        .bind(id.as_uuid())
        .bind(Json(vec![address]))
        .bind(&address.street)
        .bind(&address.city)
        .fetch_optional(&self.pool)
        .await?;

        if appended.is_some() {
            return Ok(true);
        }

        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match exists {
            Some(_) => Ok(false),
            None => Err(StoreError::not_found("Account", id)),
        }
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, items, subtotal, shipping, tax, total, quoted_totals,
                                shipping_address, status, payment_method, card_last4, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer_id.as_uuid())
        .bind(Json(&order.items))
        .bind(order.subtotal.amount())
        .bind(order.shipping.amount())
        .bind(order.tax.amount())
        .bind(order.total.amount())
        .bind(order.quoted_totals.as_ref().map(Json))
        .bind(Json(&order.shipping_address))
        .bind(order.status.as_str())
        .bind(order.payment_method.as_str())
        .bind(&order.card_last4)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1=1");
        let mut param_count = 0;

        if filter.customer_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND customer_id = ${param_count}"));
        }
        if filter.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut sqlx_query = sqlx::query(&sql);
        if let Some(customer_id) = filter.customer_id {
            sqlx_query = sqlx_query.bind(customer_id.as_uuid());
        }
        if let Some(status) = filter.status {
            sqlx_query = sqlx_query.bind(status.as_str());
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn update_order(&self, order: &Order, expected: OrderStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, items = $3, updated_at = $4 WHERE id = $1 AND status = $5",
        )
        .bind(order.id.as_uuid())
        .bind(order.status.as_str())
        .bind(Json(&order.items))
        .bind(order.updated_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1")
            .bind(order.id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match exists {
            Some(_) => Err(StoreError::ConcurrencyConflict {
                entity: "Order",
                id: order.id.to_string(),
                expected: expected.to_string(),
            }),
            None => Err(StoreError::not_found("Order", order.id)),
        }
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
