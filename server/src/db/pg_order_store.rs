// atelier_server/src/db/pg_order_store.rs

use async_trait::async_trait;
use atelier::{NewOrder, Order, OrderConfiguration, OrderStore, StoreError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
  id UUID PRIMARY KEY,
  product TEXT NOT NULL,
  color TEXT NOT NULL,
  rate TEXT NOT NULL,
  material TEXT NOT NULL,
  text TEXT NOT NULL DEFAULT '',
  price NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
  image_path TEXT,
  created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const CREATE_CREATED_AT_INDEX: &str = "CREATE INDEX IF NOT EXISTS orders_created_at_idx ON orders (created_at DESC)";

const ORDER_COLUMNS: &str = "id, product, color, rate, material, text, price, image_path, created_at";

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  product: String,
  color: String,
  rate: String,
  material: String,
  text: String,
  price: Decimal,
  image_path: Option<String>,
  created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    Ok(Order {
      id: row.id,
      configuration: OrderConfiguration {
        product: row.product.parse().map_err(StoreError::backend)?,
        color: row.color,
        display_currency: row.rate.parse().map_err(StoreError::backend)?,
        material: row.material.parse().map_err(StoreError::backend)?,
        text: row.text,
      },
      price: row.price,
      image_path: row.image_path,
      created_at: row.created_at,
    })
  }
}

fn db_error(e: sqlx::Error) -> StoreError {
  match e {
    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => StoreError::Unavailable(e.to_string()),
    other => StoreError::backend(other),
  }
}

/// `OrderStore` backed by the `orders` table.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  /// Creates the `orders` table and its index if they do not exist yet.
  pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
    sqlx::query(CREATE_CREATED_AT_INDEX).execute(&self.pool).await?;
    debug!("Orders schema is in place.");
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "pg_orders::insert", skip(self, order), fields(product = %order.configuration.product))]
  async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
    let order = Order::from_new(order);
    let sql = format!(
      "INSERT INTO orders ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {cols}",
      cols = ORDER_COLUMNS
    );
    let row: OrderRow = sqlx::query_as(&sql)
      .bind(order.id)
      .bind(order.configuration.product.as_str())
      .bind(&order.configuration.color)
      .bind(order.configuration.display_currency.code())
      .bind(order.configuration.material.as_str())
      .bind(&order.configuration.text)
      .bind(order.price)
      .bind(&order.image_path)
      .bind(order.created_at)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| {
        error!("Failed to insert order {}: {}", order.id, e);
        db_error(e)
      })?;
    row.try_into()
  }

  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    let row: Option<OrderRow> = sqlx::query_as(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_error)?;
    row.map(Order::try_from).transpose()
  }

  async fn list(&self) -> Result<Vec<Order>, StoreError> {
    let sql = format!("SELECT {} FROM orders ORDER BY created_at DESC, id", ORDER_COLUMNS);
    let rows: Vec<OrderRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await.map_err(db_error)?;
    rows.into_iter().map(Order::try_from).collect()
  }
}
