use bookshop_db::Document;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_TEXT_LEN: usize = 256;
const MAX_PRICE_SCALE: u32 = 2;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Server-assigned identifier, immutable once set
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: Decimal,
    /// Filename of the book's image in the image bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
}

impl Document for Book {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Request body for creating or replacing a book.
///
/// Every field is optional at the wire level so that missing values are reported
/// alongside other violations instead of as a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image_name: Option<String>,
}

/// A payload that passed validation; the only shape the store accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub image_name: Option<String>,
}

impl BookDraft {
    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            price: self.price,
            image_name: self.image_name,
        }
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: String,
}

impl FieldError {
    fn new(field: &'static str, error: impl Into<String>) -> Self {
        Self {
            field,
            error: error.into(),
        }
    }
}

/// Every violation found in a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl BookPayload {
    /// Check every field and produce a draft, or all violations at once.
    pub fn validate(self) -> Result<BookDraft, ValidationErrors> {
        let mut errors = Vec::new();

        let title = self.title.trim().to_string();
        check_text("title", &title, &mut errors);

        let author = self.author.trim().to_string();
        check_text("author", &author, &mut errors);

        let price = match self.price {
            Some(price) => {
                errors.extend(price_violation(price));
                price
            }
            None => {
                errors.push(FieldError::new("price", "is required"));
                Decimal::ZERO
            }
        };

        if let Some(name) = &self.image_name {
            errors.extend(image_name_violation(name));
        }

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        Ok(BookDraft {
            title,
            author,
            price,
            image_name: self.image_name,
        })
    }
}

/// Validate a standalone price change.
pub fn validate_price(price: Decimal) -> Result<Decimal, ValidationErrors> {
    match price_violation(price) {
        Some(error) => Err(ValidationErrors(vec![error])),
        None => Ok(price),
    }
}

fn max_price() -> Decimal {
    Decimal::from(1_000_000)
}

fn check_text(field: &'static str, value: &str, errors: &mut Vec<FieldError>) {
    if value.is_empty() {
        errors.push(FieldError::new(field, "must not be blank"));
    } else if value.chars().count() > MAX_TEXT_LEN {
        errors.push(FieldError::new(
            field,
            format!("must be at most {MAX_TEXT_LEN} characters"),
        ));
    }
}

fn price_violation(price: Decimal) -> Option<FieldError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Some(FieldError::new("price", "must not be negative"));
    }
    if price.normalize().scale() > MAX_PRICE_SCALE {
        return Some(FieldError::new(
            "price",
            format!("must have at most {MAX_PRICE_SCALE} decimal places"),
        ));
    }
    if price > max_price() {
        return Some(FieldError::new(
            "price",
            format!("must not exceed {}", max_price()),
        ));
    }
    None
}

fn image_name_violation(name: &str) -> Option<FieldError> {
    if name.trim().is_empty() {
        return Some(FieldError::new("imageName", "must not be blank"));
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        return Some(FieldError::new("imageName", "must be a plain file name"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn dune() -> BookPayload {
        BookPayload {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            price: Some(dec("12.50")),
            image_name: Some("dune.jpg".to_string()),
        }
    }

    #[test]
    fn valid_payload_becomes_draft() {
        let draft = dune().validate().unwrap();
        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.price, dec("12.50"));

        let book = draft.into_book("b-1".to_string());
        assert_eq!(book.id, "b-1");
        assert_eq!(book.image_name.as_deref(), Some("dune.jpg"));
    }

    #[test]
    fn text_fields_are_trimmed() {
        let payload = BookPayload {
            title: "  Dune  ".to_string(),
            ..dune()
        };
        assert_eq!(payload.validate().unwrap().title, "Dune");
    }

    #[test]
    fn all_violations_are_reported_together() {
        let payload = BookPayload {
            title: "   ".to_string(),
            author: String::new(),
            price: None,
            image_name: Some("../etc/passwd".to_string()),
        };

        let ValidationErrors(errors) = payload.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["title", "author", "price", "imageName"]);
    }

    #[test]
    fn price_rules() {
        assert!(validate_price(dec("0")).is_ok());
        assert!(validate_price(dec("9.99")).is_ok());
        assert!(validate_price(dec("12.500")).is_ok());
        assert!(validate_price(dec("1000000")).is_ok());

        assert!(validate_price(dec("-0.01")).is_err());
        assert!(validate_price(dec("1.999")).is_err());
        assert!(validate_price(dec("1000000.01")).is_err());
    }

    #[test]
    fn overlong_title_is_rejected() {
        let payload = BookPayload {
            title: "x".repeat(MAX_TEXT_LEN + 1),
            ..dune()
        };
        let ValidationErrors(errors) = payload.validate().unwrap_err();
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn wire_format_is_camel_case() {
        let book = dune().validate().unwrap().into_book("b-1".to_string());
        let json = serde_json::to_value(&book).unwrap();

        assert_eq!(json["imageName"], "dune.jpg");
        assert_eq!(json["price"], "12.50");

        let parsed: BookPayload =
            serde_json::from_str(r#"{"title":"Dune","author":"F","price":12.5}"#).unwrap();
        assert_eq!(parsed.price, Some(dec("12.5")));
        assert!(parsed.image_name.is_none());
    }
}
