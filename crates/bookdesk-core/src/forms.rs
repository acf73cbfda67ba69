//! Client-side form state and validation.
//!
//! Validation runs before any request is sent; a form that fails never
//! reaches the network.

use thiserror::Error;

use crate::models::{Credentials, NameUpdate, NewCategory};

// ============================================================================
// Input limits
// ============================================================================

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_NAME_LENGTH: usize = 100;
const MAX_KEYWORDS_LENGTH: usize = 500;
const MAX_SEARCH_LENGTH: usize = 100;

/// Message shown when the server rejects a login.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid credentials. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email is required")]
    EmailRequired,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Category name cannot be empty.")]
    EmptyCategoryName,
    #[error("First name is required")]
    FirstNameRequired,
    #[error("Last name is required")]
    LastNameRequired,
}

/// Loose syntactic email check: one `@`, a non-empty local part, and a
/// dotted domain with no empty labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && is_valid_input_char(c)
}

pub fn can_add_keywords_char(current_len: usize, c: char) -> bool {
    current_len < MAX_KEYWORDS_LENGTH && is_valid_input_char(c)
}

pub fn can_add_search_char(current_len: usize, c: char) -> bool {
    current_len < MAX_SEARCH_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Login / register
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Email,
    Password,
    RememberMe,
}

impl LoginField {
    pub fn next(&self) -> Self {
        match self {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::RememberMe,
            LoginField::RememberMe => LoginField::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginField::Email => LoginField::RememberMe,
            LoginField::Password => LoginField::Email,
            LoginField::RememberMe => LoginField::Password,
        }
    }
}

/// Email + password form. Also used to register a new admin.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
    pub focus: LoginField,
    /// Validation or server error shown under the form
    pub error: Option<String>,
}

impl LoginForm {
    pub fn with_email(email: impl Into<String>) -> Self {
        let email = email.into();
        let focus = if email.is_empty() {
            LoginField::Email
        } else {
            LoginField::Password
        };
        Self {
            email,
            focus,
            ..Self::default()
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            LoginField::Email => {
                if can_add_email_char(self.email.chars().count(), c) {
                    self.email.push(c);
                }
            }
            LoginField::Password => {
                if can_add_password_char(self.password.chars().count(), c) {
                    self.password.push(c);
                }
            }
            LoginField::RememberMe => {
                if c == ' ' {
                    self.remember_me = !self.remember_me;
                }
            }
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            LoginField::Email => {
                self.email.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
            LoginField::RememberMe => {}
        }
    }

    /// Check the fields and produce the request body.
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmailRequired);
        }
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(ValidationError::PasswordRequired);
        }
        Ok(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    /// Forget the password after a submit, keep the email.
    pub fn reset_password(&mut self) {
        self.password.clear();
        self.focus = LoginField::Password;
    }
}

// ============================================================================
// Category creation
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryField {
    #[default]
    Name,
    Keywords,
}

impl CategoryField {
    pub fn toggle(&self) -> Self {
        match self {
            CategoryField::Name => CategoryField::Keywords,
            CategoryField::Keywords => CategoryField::Name,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
    /// Comma-separated, sent as typed
    pub keywords: String,
    pub focus: CategoryField,
}

impl CategoryForm {
    pub fn push_char(&mut self, c: char) {
        match self.focus {
            CategoryField::Name => {
                if can_add_name_char(self.name.chars().count(), c) {
                    self.name.push(c);
                }
            }
            CategoryField::Keywords => {
                if can_add_keywords_char(self.keywords.chars().count(), c) {
                    self.keywords.push(c);
                }
            }
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            CategoryField::Name => self.name.pop(),
            CategoryField::Keywords => self.keywords.pop(),
        };
    }

    pub fn validate(&self) -> Result<NewCategory, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCategoryName);
        }
        Ok(NewCategory {
            name: name.to_string(),
            keywords: self.keywords.trim().to_string(),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Inline name edit (users and authors)
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameField {
    #[default]
    First,
    Last,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameEditForm {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub focus: NameField,
}

impl NameEditForm {
    /// Start editing a row, prefilled with its current names.
    pub fn new(id: impl Into<String>, first_name: Option<&str>, last_name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.unwrap_or_default().to_string(),
            last_name: last_name.unwrap_or_default().to_string(),
            focus: NameField::First,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            NameField::First => NameField::Last,
            NameField::Last => NameField::First,
        };
    }

    pub fn push_char(&mut self, c: char) {
        let field = match self.focus {
            NameField::First => &mut self.first_name,
            NameField::Last => &mut self.last_name,
        };
        if can_add_name_char(field.chars().count(), c) {
            field.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            NameField::First => self.first_name.pop(),
            NameField::Last => self.last_name.pop(),
        };
    }

    pub fn validate(&self) -> Result<NameUpdate, ValidationError> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        if first_name.is_empty() {
            return Err(ValidationError::FirstNameRequired);
        }
        if last_name.is_empty() {
            return Err(ValidationError::LastNameRequired);
        }
        Ok(NameUpdate {
            id: self.id.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("admin@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));

        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("admin@example"));
        assert!(!is_valid_email("admin@example."));
        assert!(!is_valid_email("admin@@example.com"));
        assert!(!is_valid_email("ad min@example.com"));
    }

    #[test]
    fn test_login_validation_order() {
        let mut form = LoginForm::default();
        assert_eq!(form.validate(), Err(ValidationError::EmailRequired));

        form.email = "nope".to_string();
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));

        form.email = "admin@example.com".to_string();
        assert_eq!(form.validate(), Err(ValidationError::PasswordRequired));

        form.password = "secret".to_string();
        let creds = form.validate().unwrap();
        assert_eq!(creds.email, "admin@example.com");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::EmailRequired.to_string(), "Email is required");
        assert_eq!(ValidationError::InvalidEmail.to_string(), "Invalid email");
        assert_eq!(
            ValidationError::EmptyCategoryName.to_string(),
            "Category name cannot be empty."
        );
    }

    #[test]
    fn test_login_form_typing() {
        let mut form = LoginForm::with_email("admin@example.com");
        assert_eq!(form.focus, LoginField::Password);
        form.push_char('p');
        form.push_char('w');
        form.pop_char();
        assert_eq!(form.password, "p");

        form.focus = form.focus.next();
        form.push_char(' ');
        assert!(form.remember_me);

        form.focus = LoginField::Email;
        form.push_char(' ');
        assert_eq!(form.email, "admin@example.com");
    }

    #[test]
    fn test_category_name_must_not_be_blank() {
        let mut form = CategoryForm::default();
        form.name = "   ".to_string();
        form.keywords = "a, b".to_string();
        assert_eq!(form.validate(), Err(ValidationError::EmptyCategoryName));

        form.name = " Mystery ".to_string();
        let category = form.validate().unwrap();
        assert_eq!(category.name, "Mystery");
        assert_eq!(category.keywords, "a, b");
    }

    #[test]
    fn test_name_edit_form() {
        let mut form = NameEditForm::new("u1", Some("Ada"), None);
        assert_eq!(form.validate(), Err(ValidationError::LastNameRequired));
        form.toggle_focus();
        for c in "Byron".chars() {
            form.push_char(c);
        }
        let update = form.validate().unwrap();
        assert_eq!(update.id, "u1");
        assert_eq!(update.last_name, "Byron");

        form.focus = NameField::First;
        form.first_name.clear();
        assert_eq!(form.validate(), Err(ValidationError::FirstNameRequired));
    }

    #[test]
    fn test_can_add_chars() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\n'));

        assert!(!can_add_email_char(0, ' '));
        assert!(can_add_name_char(0, ' '));
        assert!(!can_add_search_char(100, 'a'));
        assert!(!can_add_keywords_char(0, '\t'));
    }
}
