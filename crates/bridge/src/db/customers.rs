//! Database operations for partner-store customers and their code pair.

use pelican_core::CodeKind;
use sqlx::PgPool;

use super::RepositoryError;

/// A provisioned customer with their forwarding code pair.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Customer {
    /// Internal id.
    pub id: i32,
    /// Customer id on the partner store (unique).
    pub partner_customer_id: String,
    /// Display name (first name from the webhook payload).
    pub display_name: String,
    /// Simple-forwarding code (globally unique).
    pub simple_code: String,
    /// Signature-forwarding code (globally unique).
    pub signature_code: String,
    /// Contact email.
    pub email: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zip: String,
}

impl Customer {
    /// Which of this customer's codes the given string matches, if any.
    #[must_use]
    pub fn code_kind(&self, code: &str) -> Option<CodeKind> {
        if code == self.simple_code {
            Some(CodeKind::SimpleCode)
        } else if code == self.signature_code {
            Some(CodeKind::SignatureCode)
        } else {
            None
        }
    }
}

/// Fields for inserting a new customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub partner_customer_id: String,
    pub display_name: String,
    pub simple_code: String,
    pub signature_code: String,
    pub email: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zip: String,
}

/// Fields for updating an existing customer. All optional for partial
/// updates; codes are intentionally not updatable here.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UpdateCustomer {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
}

/// Insert a new customer if none exists for the partner customer id.
///
/// Returns `None` when a customer with this `partner_customer_id` is already
/// provisioned - a normal outcome under webhook redelivery, not a failure.
///
/// # Errors
///
/// Returns error if the database insert fails (including a collision on one
/// of the code columns, which surfaces as `RepositoryError::Database`).
pub async fn insert_customer(
    pool: &PgPool,
    new: NewCustomer,
) -> Result<Option<Customer>, RepositoryError> {
    let customer = sqlx::query_as::<_, Customer>(
        r"
        INSERT INTO customers (
            partner_customer_id, display_name, simple_code, signature_code,
            email, address1, address2, city, province, country, zip
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (partner_customer_id) DO NOTHING
        RETURNING
            id, partner_customer_id, display_name, simple_code, signature_code,
            email, address1, address2, city, province, country, zip
        ",
    )
    .bind(&new.partner_customer_id)
    .bind(&new.display_name)
    .bind(&new.simple_code)
    .bind(&new.signature_code)
    .bind(&new.email)
    .bind(&new.address1)
    .bind(&new.address2)
    .bind(&new.city)
    .bind(&new.province)
    .bind(&new.country)
    .bind(&new.zip)
    .fetch_optional(pool)
    .await?;

    Ok(customer)
}

/// Find the customer owning the given code (either kind).
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn find_customer_by_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<Customer>, RepositoryError> {
    let customer = sqlx::query_as::<_, Customer>(
        r"
        SELECT
            id, partner_customer_id, display_name, simple_code, signature_code,
            email, address1, address2, city, province, country, zip
        FROM customers
        WHERE simple_code = $1 OR signature_code = $1
        ",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(customer)
}

/// Get a customer by internal id.
///
/// # Errors
///
/// Returns error if the database query fails.
pub async fn get_customer(pool: &PgPool, id: i32) -> Result<Option<Customer>, RepositoryError> {
    let customer = sqlx::query_as::<_, Customer>(
        r"
        SELECT
            id, partner_customer_id, display_name, simple_code, signature_code,
            email, address1, address2, city, province, country, zip
        FROM customers
        WHERE id = $1
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(customer)
}

/// Apply a partial update to a customer, returning the updated row.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if no customer has this id.
pub async fn update_customer(
    pool: &PgPool,
    id: i32,
    update: UpdateCustomer,
) -> Result<Customer, RepositoryError> {
    let customer = sqlx::query_as::<_, Customer>(
        r"
        UPDATE customers SET
            display_name = COALESCE($2, display_name),
            email = COALESCE($3, email),
            address1 = COALESCE($4, address1),
            address2 = COALESCE($5, address2),
            city = COALESCE($6, city),
            province = COALESCE($7, province),
            country = COALESCE($8, country),
            zip = COALESCE($9, zip)
        WHERE id = $1
        RETURNING
            id, partner_customer_id, display_name, simple_code, signature_code,
            email, address1, address2, city, province, country, zip
        ",
    )
    .bind(id)
    .bind(update.display_name)
    .bind(update.email)
    .bind(update.address1)
    .bind(update.address2)
    .bind(update.city)
    .bind(update.province)
    .bind(update.country)
    .bind(update.zip)
    .fetch_optional(pool)
    .await?;

    customer.ok_or(RepositoryError::NotFound)
}

/// Delete a customer by internal id. Returns whether a row was removed.
///
/// # Errors
///
/// Returns error if the database delete fails.
pub async fn delete_customer(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        DELETE FROM customers
        WHERE id = $1
        ",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            id: 1,
            partner_customer_id: "501".to_string(),
            display_name: "Ana".to_string(),
            simple_code: "pelicanabc123def456".to_string(),
            signature_code: "pelicansigabc123def4".to_string(),
            email: "ana@example.com".to_string(),
            address1: "1 Main".to_string(),
            address2: None,
            city: "X".to_string(),
            province: "Y".to_string(),
            country: "Z".to_string(),
            zip: "0".to_string(),
        }
    }

    #[test]
    fn test_code_kind_matches_simple() {
        let c = customer();
        assert_eq!(c.code_kind("pelicanabc123def456"), Some(CodeKind::SimpleCode));
    }

    #[test]
    fn test_code_kind_matches_signature() {
        let c = customer();
        assert_eq!(
            c.code_kind("pelicansigabc123def4"),
            Some(CodeKind::SignatureCode)
        );
    }

    #[test]
    fn test_code_kind_rejects_unknown_and_empty() {
        let c = customer();
        assert_eq!(c.code_kind("pelicannope"), None);
        assert_eq!(c.code_kind(""), None);
    }
}
