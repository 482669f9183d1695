use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use crate::error::{AccountsError, AccountsResult};
use crate::models::{Address, User};
use crate::repository::{AddressStore, UserStore};

// Expected schema:
//   users        unique index users_email_lower_idx ON (LOWER(email))
//   addresses    unique index addresses_dedup_idx ON
//                  (user_id, full_name, phone_number, line1,
//                   COALESCE(line2, ''), city, postal_code, country)
//   addresses    partial unique index addresses_single_default_idx
//                  ON (user_id) WHERE is_default

/// PostgreSQL implementation of UserStore using SeaORM
#[derive(Clone)]
pub struct PostgresUserStore {
    db: sea_orm::DatabaseConnection,
}

impl PostgresUserStore {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: String,
    password_hash: String,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    date_joined: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            date_joined: row.date_joined,
        }
    }
}

fn is_unique_violation(err_str: &str) -> bool {
    err_str.contains("duplicate key") || err_str.contains("unique constraint")
}

fn storage_error(e: sea_orm::DbErr) -> AccountsError {
    AccountsError::Storage(format!("Database error: {}", e))
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create(&self, user: User) -> AccountsResult<User> {
        if user.email.trim().is_empty() {
            return Err(AccountsError::EmptyEmail);
        }

        let sql = r#"
            INSERT INTO users (id, email, full_name, password_hash, is_active, is_staff, is_superuser, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.email.clone().into(),
                user.full_name.clone().into(),
                user.password_hash.clone().into(),
                user.is_active.into(),
                user.is_staff.into(),
                user.is_superuser.into(),
                user.date_joined.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if is_unique_violation(&err_str) {
                    AccountsError::DuplicateEmail(user.email.clone())
                } else {
                    storage_error(e)
                }
            })?
            .ok_or_else(|| AccountsError::Storage("Failed to create user".to_string()))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AccountsResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE id = $1";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email(&self, email: &str) -> AccountsResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE LOWER(email) = LOWER($1)";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self) -> AccountsResult<Vec<User>> {
        let sql = "SELECT * FROM users ORDER BY date_joined ASC";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, []);

        let rows = UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AccountsResult<()> {
        let sql = "UPDATE users SET password_hash = $2 WHERE id = $1";

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [id.into(), password_hash.into()],
        );

        let result = self.db.execute_raw(stmt).await.map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(AccountsError::NotFound);
        }

        Ok(())
    }
}

/// PostgreSQL implementation of AddressStore using SeaORM
#[derive(Clone)]
pub struct PostgresAddressStore {
    db: sea_orm::DatabaseConnection,
}

impl PostgresAddressStore {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct AddressRow {
    id: Uuid,
    user_id: Uuid,
    full_name: String,
    phone_number: String,
    line1: String,
    line2: Option<String>,
    city: String,
    postal_code: String,
    country: String,
    is_default: bool,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            phone_number: row.phone_number,
            line1: row.line1,
            line2: row.line2,
            city: row.city,
            postal_code: row.postal_code,
            country: row.country,
            is_default: row.is_default,
        }
    }
}

/// The two unique indexes on addresses produce the same error class,
/// so the index name decides which domain error to surface.
fn address_constraint_error(e: sea_orm::DbErr) -> AccountsError {
    let err_str = e.to_string();
    if err_str.contains("addresses_single_default_idx") {
        AccountsError::DefaultAddressExists
    } else if is_unique_violation(&err_str) {
        AccountsError::DuplicateAddress
    } else {
        storage_error(e)
    }
}

#[async_trait]
impl AddressStore for PostgresAddressStore {
    async fn create(&self, address: Address) -> AccountsResult<Address> {
        let sql = r#"
            INSERT INTO addresses (id, user_id, full_name, phone_number, line1, line2, city, postal_code, country, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                address.id.into(),
                address.user_id.into(),
                address.full_name.clone().into(),
                address.phone_number.clone().into(),
                address.line1.clone().into(),
                address.line2.clone().into(),
                address.city.clone().into(),
                address.postal_code.clone().into(),
                address.country.clone().into(),
                address.is_default.into(),
            ],
        );

        let row = AddressRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(address_constraint_error)?
            .ok_or_else(|| AccountsError::Storage("Failed to create address".to_string()))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AccountsResult<Option<Address>> {
        let sql = "SELECT * FROM addresses WHERE id = $1 AND user_id = $2";

        let stmt =
            Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into(), user_id.into()]);

        let row = AddressRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AccountsResult<Vec<Address>> {
        let sql = "SELECT * FROM addresses WHERE user_id = $1 ORDER BY id ASC";

        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [user_id.into()]);

        let rows = AddressRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn update(&self, address: Address) -> AccountsResult<Address> {
        let sql = r#"
            UPDATE addresses
            SET full_name = $3, phone_number = $4, line1 = $5, line2 = $6,
                city = $7, postal_code = $8, country = $9, is_default = $10
            WHERE id = $1 AND user_id = $2
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                address.id.into(),
                address.user_id.into(),
                address.full_name.clone().into(),
                address.phone_number.clone().into(),
                address.line1.clone().into(),
                address.line2.clone().into(),
                address.city.clone().into(),
                address.postal_code.clone().into(),
                address.country.clone().into(),
                address.is_default.into(),
            ],
        );

        let row = AddressRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(address_constraint_error)?;

        row.map(|r| r.into()).ok_or(AccountsError::NotFound)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AccountsResult<bool> {
        let sql = "DELETE FROM addresses WHERE id = $1 AND user_id = $2";

        let stmt =
            Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into(), user_id.into()]);

        let result = self.db.execute_raw(stmt).await.map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
