//! # Validation Module
//!
//! Form input validation, run by the views before a remote call is made.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command line (clap)                                          │
//! │  ├── Type checks (numbers, enums)                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, signs, phone characters                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote store                                                 │
//! │  ├── Column constraints and procedures (stock, balances)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cashbook_core::validation::{validate_name, validate_quantity};
//!
//! assert!(validate_name("name", "Maize Flour 2kg").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewCustomer, NewProduct, PaymentType, RecordId};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product or customer name.
pub const MAX_NAME_LEN: usize = 200;

/// Longest accepted phone number.
pub const MAX_PHONE_LEN: usize = 20;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a display name: non-blank and at most [`MAX_NAME_LEN`] chars.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a price: zero is allowed (free items), negative is not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock level on a product form.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock_quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a line item quantity: 1 to [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a phone number: digits, spaces, dashes and a leading `+`.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LEN,
        });
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    if body.is_empty()
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, dashes and a leading +".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product form.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    validate_price(product.price)?;
    validate_stock(product.stock_quantity)?;
    Ok(())
}

/// Validates a customer form.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_name("name", &customer.name)?;
    if let Some(phone) = &customer.phone {
        validate_phone(phone)?;
    }
    Ok(())
}

/// Validates the header of a sale form.
///
/// A credit sale must name the customer who owes the money.
pub fn validate_sale_header(
    payment_type: PaymentType,
    customer_id: Option<&RecordId>,
    item_count: usize,
) -> ValidationResult<()> {
    if item_count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    if payment_type == PaymentType::Credit && customer_id.is_none() {
        return Err(ValidationError::Required {
            field: "customer".to_string(),
        });
    }
    Ok(())
}

/// Parses a `product_id:quantity` line item argument.
pub fn parse_line_item(item: &str) -> ValidationResult<(RecordId, i64)> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "item".to_string(),
        reason: reason.to_string(),
    };

    let (id, quantity) = item
        .rsplit_once(':')
        .ok_or_else(|| invalid("expected PRODUCT_ID:QUANTITY"))?;
    let id: RecordId = id.parse()?;
    let quantity: i64 = quantity
        .trim()
        .parse()
        .map_err(|_| invalid("quantity must be a whole number"))?;
    validate_quantity(quantity)?;

    Ok((id, quantity))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Unga wa Dola").is_ok());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-3).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0712 345 678").is_ok());
        assert!(validate_phone("+254-712-345678").is_ok());
        assert!(validate_phone("+").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_credit_sale_needs_customer() {
        let customer = RecordId::Int(4);
        assert!(validate_sale_header(PaymentType::Cash, None, 1).is_ok());
        assert!(validate_sale_header(PaymentType::Credit, Some(&customer), 2).is_ok());

        let err = validate_sale_header(PaymentType::Credit, None, 1).unwrap_err();
        assert_eq!(err.to_string(), "customer is required");

        assert!(validate_sale_header(PaymentType::Cash, None, 0).is_err());
    }

    #[test]
    fn test_parse_line_item() {
        assert_eq!(parse_line_item("12:3").unwrap(), (RecordId::Int(12), 3));
        assert_eq!(
            parse_line_item("ab-cd:1").unwrap(),
            (RecordId::Text("ab-cd".to_string()), 1)
        );
        assert!(parse_line_item("12").is_err());
        assert!(parse_line_item("12:0").is_err());
        assert!(parse_line_item("12:two").is_err());
    }

    #[test]
    fn test_quantity_upper_bound() {
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_line_item("1:9223372036854775807"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
