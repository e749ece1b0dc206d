//! # Customer Repository
//!
//! Customer records. Every sale is committed against one; the phone number
//! doubles as a lookup key at the register and is unique per customer.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use lotus_core::Customer;

/// New customer input.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
}

/// Customer create, search, and lookup.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer and returns the stored record.
    ///
    /// Fails with `UniqueViolation` when the phone number is already
    /// registered.
    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        let now = Utc::now();

        debug!(phone = %input.phone, "Creating customer");

        let result = sqlx::query(
            r#"
            INSERT INTO customers (first_name, last_name, phone, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(Customer {
            id: result.last_insert_rowid(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, phone, address, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(customer)
    }

    /// Searches customers by name or phone.
    pub async fn search(&self, term: &str, limit: i64) -> DbResult<Vec<Customer>> {
        let pattern = format!("%{}%", term.trim());

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, phone, address, created_at, updated_at
            FROM customers
            WHERE first_name LIKE ?1 OR last_name LIKE ?1 OR phone LIKE ?1
            ORDER BY last_name, first_name
            LIMIT ?2
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(customers)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn customer_input(first: &str, last: &str, phone: &str) -> NewCustomer {
        NewCustomer {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: phone.to_string(),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let created = db
            .customers()
            .create(&customer_input("Amina", "Khan", "0300-1234567"))
            .await
            .unwrap();

        let fetched = db.customers().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.full_name(), "Amina Khan");
        assert_eq!(fetched.phone, "0300-1234567");
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.customers()
            .create(&customer_input("Amina", "Khan", "0300-1234567"))
            .await
            .unwrap();

        let err = db
            .customers()
            .create(&customer_input("Bilal", "Ahmed", "0300-1234567"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_by_name_and_phone() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.customers()
            .create(&customer_input("Amina", "Khan", "0300-1111111"))
            .await
            .unwrap();
        db.customers()
            .create(&customer_input("Bilal", "Ahmed", "0321-2222222"))
            .await
            .unwrap();

        let by_name = db.customers().search("khan", 10).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].first_name, "Amina");

        let by_phone = db.customers().search("0321", 10).await.unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].first_name, "Bilal");
    }
}
