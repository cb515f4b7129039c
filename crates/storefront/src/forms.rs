//! Form schemas and validation.
//!
//! Every form is checked here before anything goes over the network. A failed
//! check yields [`FieldErrors`], one message per offending field, keyed by the
//! Rust field name (`confirm_password`, not `confirmPassword`).

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use medistore_core::{OrderId, Role};

use crate::api::{LoginRequest, ProfileUpdate, RegisterRequest, ReviewRequest};

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty set of errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field`. The first message per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// The message attached to `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether `field` has an error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The message of the first field in name order.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    /// Fields that have errors, in name order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = Self::new();
        for (field, errs) in errors.field_errors() {
            if let Some(err) = errs.first() {
                fields.add(field.to_string(), message_of(err));
            }
        }
        fields
    }
}

fn message_of(err: &ValidationError) -> String {
    err.message
        .as_ref()
        .map_or_else(|| format!("Invalid value ({})", err.code), ToString::to_string)
}

fn schema_errors<T: Validate>(form: &T) -> FieldErrors {
    form.validate()
        .err()
        .map(|e| FieldErrors::from(&e))
        .unwrap_or_default()
}

// =============================================================================
// Login
// =============================================================================

/// Login form data.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Per-render nonce for duplicate-submission detection.
    #[serde(default)]
    pub form_id: Option<String>,
}

impl LoginForm {
    /// Validate and build the API request.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when the form does not validate.
    pub fn check(&self) -> Result<LoginRequest, FieldErrors> {
        let form = Self {
            email: self.email.trim().to_string(),
            ..self.clone()
        };
        schema_errors(&form).into_result()?;
        Ok(LoginRequest {
            email: form.email,
            password: form.password,
        })
    }
}

// =============================================================================
// Signup
// =============================================================================

/// Signup form data.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default, rename = "confirmPassword")]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    /// Raw role from the select; empty when nothing was picked.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub form_id: Option<String>,
}

impl SignupForm {
    /// Validate and build the API request.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when the form does not validate.
    pub fn check(&self) -> Result<RegisterRequest, FieldErrors> {
        let form = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self.clone()
        };
        let mut errors = schema_errors(&form);
        let Some(role) = form.selected_role() else {
            errors.add("role", "Please select a role");
            return Err(errors);
        };
        errors.into_result()?;

        Ok(RegisterRequest {
            name: form.name,
            email: form.email,
            password: form.password,
            role,
        })
    }

    /// The picked role, if it is one visitors may choose.
    #[must_use]
    pub fn selected_role(&self) -> Option<Role> {
        self.role
            .parse::<Role>()
            .ok()
            .filter(Role::is_self_service)
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Profile edit form data.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    /// Image URL; blank means no avatar.
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub form_id: Option<String>,
}

impl ProfileForm {
    /// Validate and build the API request.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when the form does not validate.
    pub fn check(&self) -> Result<ProfileUpdate, FieldErrors> {
        let form = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            avatar: self.avatar.trim().to_string(),
            form_id: None,
        };
        schema_errors(&form).into_result()?;

        Ok(ProfileUpdate {
            name: form.name,
            email: form.email,
            avatar: (!form.avatar.is_empty()).then_some(form.avatar),
        })
    }
}

// =============================================================================
// Review
// =============================================================================

/// Review form data for one delivered order.
///
/// `rating` is kept as typed so that a non-numeric or huge value is reported
/// by the range check rather than rejected while decoding.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewForm {
    pub order_id: i64,
    #[serde(default)]
    #[validate(custom(function = "validate_rating"))]
    pub rating: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: String,
    #[serde(default)]
    pub form_id: Option<String>,
}

impl ReviewForm {
    /// Validate and build the API request.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when the form does not validate.
    pub fn check(&self) -> Result<ReviewRequest, FieldErrors> {
        schema_errors(self).into_result()?;
        let rating = parse_rating(&self.rating).ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.add("rating", RATING_RANGE);
            errors
        })?;

        Ok(ReviewRequest {
            order_id: OrderId::new(self.order_id),
            rating,
            comment: self.comment.trim().to_string(),
        })
    }
}

const RATING_RANGE: &str = "Rating must be between 1 and 5";

fn parse_rating(raw: &str) -> Option<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|rating| (1..=5).contains(rating))
}

fn validate_rating(raw: &str) -> Result<(), ValidationError> {
    if parse_rating(raw).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("range").with_message(RATING_RANGE.into()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
            form_id: None,
        }
    }

    fn signup(password: &str, confirm: &str, role: &str) -> SignupForm {
        SignupForm {
            name: "Rahim".to_string(),
            email: "rahim@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            role: role.to_string(),
            form_id: None,
        }
    }

    #[test]
    fn test_valid_login_builds_request() {
        let request = login(" rahim@example.com ", "secret1").check().unwrap();
        assert_eq!(request.email, "rahim@example.com");
        assert_eq!(request.password, "secret1");
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored_before_validation() {
        let mut form = signup("secret1", "secret1", "CUSTOMER");
        form.name = "  Rahim ".to_string();
        form.email = "\trahim@example.com ".to_string();
        let request = form.check().unwrap();
        assert_eq!(request.name, "Rahim");
        assert_eq!(request.email, "rahim@example.com");

        // Whitespace does not count towards the minimum length.
        form.name = " R ".to_string();
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));

        let profile = ProfileForm {
            name: "Rahim".to_string(),
            email: " rahim@example.com".to_string(),
            avatar: String::new(),
            form_id: None,
        };
        assert_eq!(profile.check().unwrap().email, "rahim@example.com");
    }

    #[test]
    fn test_short_password_is_attached_to_password() {
        let errors = login("rahim@example.com", "12345").check().unwrap_err();
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
        assert!(!errors.has("email"));
    }

    #[test]
    fn test_malformed_email_is_attached_to_email() {
        for email in ["", "rahim", "rahim@", "@example.com"] {
            let errors = login(email, "secret1").check().unwrap_err();
            assert_eq!(errors.get("email"), Some("Invalid email"), "{email:?}");
            assert_eq!(errors.len(), 1);
        }
    }

    #[test]
    fn test_password_mismatch_only_flags_confirmation() {
        let errors = signup("secret1", "secret2", "CUSTOMER").check().unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["confirm_password"]);
    }

    #[test]
    fn test_signup_role_must_be_customer_or_seller() {
        for role in ["", "ADMIN", "customer", "OWNER"] {
            let errors = signup("secret1", "secret1", role).check().unwrap_err();
            assert_eq!(errors.get("role"), Some("Please select a role"), "{role:?}");
        }
        assert_eq!(
            signup("secret1", "secret1", "SELLER").check().unwrap().role,
            Role::Seller
        );
    }

    #[test]
    fn test_signup_short_name() {
        let mut form = signup("secret1", "secret1", "CUSTOMER");
        form.name = "R".to_string();
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
    }

    #[test]
    fn test_signup_collects_every_field_error() {
        let form = SignupForm::default();
        let errors = form.check().unwrap_err();
        for field in ["name", "email", "password", "role"] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_profile_blank_avatar_is_none() {
        let form = ProfileForm {
            name: "Rahim".to_string(),
            email: "rahim@example.com".to_string(),
            avatar: "   ".to_string(),
            form_id: None,
        };
        assert_eq!(form.check().unwrap().avatar, None);
    }

    #[test]
    fn test_review_rating_range() {
        let review = |rating: &str| ReviewForm {
            order_id: 7,
            rating: rating.to_string(),
            comment: "Great product!".to_string(),
            form_id: None,
        };
        for rating in ["0", "6", "300", "-1", "abc", ""] {
            let errors = review(rating).check().unwrap_err();
            assert_eq!(
                errors.get("rating"),
                Some("Rating must be between 1 and 5"),
                "{rating:?}"
            );
        }
        let request = review("5").check().unwrap();
        assert_eq!(request.order_id, OrderId::new(7));
        assert_eq!(request.rating, 5);
    }

    #[test]
    fn test_review_decodes_unparseable_rating() {
        let form: ReviewForm = serde_json::from_value(serde_json::json!({
            "order_id": 7,
            "rating": "abc",
            "comment": "Great product!"
        }))
        .unwrap();
        assert!(form.check().is_err());
    }

    #[test]
    fn test_form_decodes_camel_case_confirmation() {
        let form: SignupForm = serde_json::from_value(serde_json::json!({
            "name": "Rahim",
            "email": "rahim@example.com",
            "password": "secret1",
            "confirmPassword": "secret1",
            "role": "CUSTOMER"
        }))
        .unwrap();
        assert!(form.check().is_ok());
    }
}
