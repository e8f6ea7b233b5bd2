use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Message key for an empty required field.
pub const ERR_FIELD_REQUIRED: &str = "ERR_FIELD_REQUIRED";

/// Fields the credential form knows how to display errors for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Login,
    Password,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Login, Field::Password];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Login => "login",
            Field::Password => "password",
        }
    }
}

/// A translatable error: message key plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub code: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl FieldError {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

/// Field name -> error. Produced locally by [`validate`] or sent by the
/// server in a rejected submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrorMap(BTreeMap<String, FieldError>);

impl ValidationErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, error: FieldError) {
        self.0.insert(field.into(), error);
    }

    pub fn with(mut self, field: impl Into<String>, error: FieldError) -> Self {
        self.insert(field, error);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldError)> {
        self.0.iter()
    }
}

/// Login/password pair read from the form and sent to the server.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Outcome of local validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub errors: ValidationErrorMap,
    pub has_error: bool,
}

/// A field is invalid when its trimmed value is empty.
pub fn validate(credentials: &Credentials) -> Validation {
    let mut errors = ValidationErrorMap::new();

    for (field, value) in [
        (Field::Login, &credentials.login),
        (Field::Password, &credentials.password),
    ] {
        if value.trim().is_empty() {
            errors.insert(field.as_str(), FieldError::new(ERR_FIELD_REQUIRED));
        }
    }

    let has_error = !errors.is_empty();
    Validation { errors, has_error }
}
