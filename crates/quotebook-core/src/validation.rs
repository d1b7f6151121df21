//! Field-level validation of submitted JSON objects.
//!
//! Each entity has a shape: required fields, non-blank rules, length limits
//! and, for quotes, a nested author reference. Validation never stops at the
//! first problem; every offending field is collected into a
//! [`ValidationErrors`] map keyed by field path (`name`, `author.name`,
//! `quotes.1.content`, `_schema`).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{QuotebookError, Result};

pub const MISSING: &str = "Missing data for required field.";
pub const BLANK: &str = "Data not provided.";
pub const NULL: &str = "Field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_AN_INTEGER: &str = "Not a valid integer.";
pub const NOT_A_DATE: &str = "Not a valid date.";
pub const INVALID_TYPE: &str = "Invalid input type.";

/// Maximum length of an author's name.
pub const AUTHOR_NAME_MAX_LEN: usize = 80;
/// Maximum length of a quote's context.
pub const QUOTE_CONTEXT_MAX_LEN: usize = 500;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-field validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Reasons recorded for one field path.
    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn merge(&mut self, other: ValidationErrors) {
        for (path, reasons) in other.0 {
            self.0.entry(path).or_default().extend(reasons);
        }
    }

    fn finish<T>(self, value: T) -> Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(QuotebookError::Validation(self))
        }
    }
}

/// How strictly required fields are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every required field must be present (create and full replace).
    Full,
    /// Only the fields present in the submission are checked.
    Partial,
}

/// Reference to an author embedded in a quote submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef {
    pub id: Option<i64>,
    pub name: String,
}

/// A quote submitted inside an author creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedQuote {
    pub content: String,
    pub context: Option<String>,
}

/// Validated data for a new author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub quotes: Vec<NestedQuote>,
}

/// Validated changes to an existing author.
///
/// `None` means the field was not submitted. For nullable fields,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorChanges {
    pub name: Option<String>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub date_of_death: Option<Option<NaiveDate>>,
    /// Nested quotes, which an author update is not allowed to touch.
    pub quotes: Option<Vec<NestedQuote>>,
}

/// Validated data for a new quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuote {
    pub content: String,
    pub author: AuthorRef,
    pub context: Option<String>,
}

/// Validated changes to an existing quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteChanges {
    pub content: Option<String>,
    pub author: Option<AuthorRef>,
    pub context: Option<Option<String>>,
}

/// Turn a parsed request body into a submission object.
///
/// `null`, `{}` and `[]` count as no data at all. Any other non-object value
/// is a schema-level validation failure.
pub fn as_submission(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Null => Err(QuotebookError::NoData),
        Value::Object(map) if map.is_empty() => Err(QuotebookError::NoData),
        Value::Array(items) if items.is_empty() => Err(QuotebookError::NoData),
        Value::Object(map) => Ok(map),
        _ => {
            let mut errors = ValidationErrors::default();
            errors.add("_schema", INVALID_TYPE);
            Err(QuotebookError::Validation(errors))
        }
    }
}

/// Validate an author creation request, including any nested quotes.
pub fn new_author(data: &Map<String, Value>) -> Result<NewAuthor> {
    let mut check = Checker::root();
    let fields = check.author_fields(data, Mode::Full);
    let new = NewAuthor {
        name: fields.name.unwrap_or_default(),
        date_of_birth: fields.date_of_birth.flatten(),
        date_of_death: fields.date_of_death.flatten(),
        quotes: fields.quotes.unwrap_or_default(),
    };
    check.errors.finish(new)
}

/// Validate an author update; `Mode::Partial` checks only submitted fields.
pub fn author_changes(data: &Map<String, Value>, mode: Mode) -> Result<AuthorChanges> {
    let mut check = Checker::root();
    let fields = check.author_fields(data, mode);
    check.errors.finish(fields)
}

/// Validate a quote creation request.
pub fn new_quote(data: &Map<String, Value>) -> Result<NewQuote> {
    let mut check = Checker::root();
    let fields = check.quote_fields(data, Mode::Full);
    if !check.errors.is_empty() {
        return Err(QuotebookError::Validation(check.errors));
    }
    match (fields.content, fields.author) {
        (Some(content), Some(author)) => Ok(NewQuote {
            content,
            author,
            context: fields.context.flatten(),
        }),
        // Full mode records an error for every missing required field.
        _ => Err(QuotebookError::Validation(check.errors)),
    }
}

/// Validate a quote update; `Mode::Partial` checks only submitted fields.
pub fn quote_changes(data: &Map<String, Value>, mode: Mode) -> Result<QuoteChanges> {
    let mut check = Checker::root();
    let fields = check.quote_fields(data, mode);
    check.errors.finish(fields)
}

struct Checker {
    prefix: String,
    errors: ValidationErrors,
}

impl Checker {
    fn root() -> Self {
        Self::nested(String::new())
    }

    fn nested(prefix: String) -> Self {
        Self {
            prefix,
            errors: ValidationErrors::default(),
        }
    }

    fn path(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn fail(&mut self, key: &str, reason: &str) {
        let path = self.path(key);
        self.errors.add(path, reason);
    }

    fn author_fields(&mut self, data: &Map<String, Value>, mode: Mode) -> AuthorChanges {
        AuthorChanges {
            name: self.text(data, "name", mode == Mode::Full, Some(AUTHOR_NAME_MAX_LEN)),
            date_of_birth: self.nullable_date(data, "date_of_birth"),
            date_of_death: self.nullable_date(data, "date_of_death"),
            quotes: self.nested_quotes(data, "quotes"),
        }
    }

    fn quote_fields(&mut self, data: &Map<String, Value>, mode: Mode) -> QuoteChanges {
        QuoteChanges {
            content: self.text(data, "content", mode == Mode::Full, None),
            author: self.author_ref(data, "author", mode == Mode::Full),
            context: self.nullable_text(data, "context", Some(QUOTE_CONTEXT_MAX_LEN)),
        }
    }

    /// A non-null, non-blank string.
    fn text(
        &mut self,
        data: &Map<String, Value>,
        key: &str,
        required: bool,
        max_len: Option<usize>,
    ) -> Option<String> {
        match data.get(key) {
            None => {
                if required {
                    self.fail(key, MISSING);
                }
                None
            }
            Some(Value::Null) => {
                self.fail(key, NULL);
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.fail(key, BLANK);
                None
            }
            Some(Value::String(s)) => self.within_length(key, s, max_len),
            Some(_) => {
                self.fail(key, NOT_A_STRING);
                None
            }
        }
    }

    fn nullable_text(
        &mut self,
        data: &Map<String, Value>,
        key: &str,
        max_len: Option<usize>,
    ) -> Option<Option<String>> {
        match data.get(key) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(s)) => self.within_length(key, s, max_len).map(Some),
            Some(_) => {
                self.fail(key, NOT_A_STRING);
                None
            }
        }
    }

    fn within_length(&mut self, key: &str, s: &str, max_len: Option<usize>) -> Option<String> {
        match max_len {
            Some(max) if s.chars().count() > max => {
                self.fail(key, &format!("Longer than maximum length {}.", max));
                None
            }
            _ => Some(s.to_string()),
        }
    }

    fn nullable_date(&mut self, data: &Map<String, Value>, key: &str) -> Option<Option<NaiveDate>> {
        match data.get(key) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(s)) => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
                Ok(date) => Some(Some(date)),
                Err(_) => {
                    self.fail(key, NOT_A_DATE);
                    None
                }
            },
            Some(_) => {
                self.fail(key, NOT_A_DATE);
                None
            }
        }
    }

    fn optional_id(&mut self, data: &Map<String, Value>, key: &str) -> Option<i64> {
        match data.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => match value.as_i64() {
                Some(id) => Some(id),
                None => {
                    self.fail(key, NOT_AN_INTEGER);
                    None
                }
            },
        }
    }

    /// The reduced author shape embedded in quotes: name required, id optional.
    fn author_ref(&mut self, data: &Map<String, Value>, key: &str, required: bool) -> Option<AuthorRef> {
        let inner = match data.get(key) {
            None => {
                if required {
                    self.fail(key, MISSING);
                }
                return None;
            }
            Some(Value::Null) => {
                self.fail(key, NULL);
                return None;
            }
            Some(Value::Object(inner)) if inner.is_empty() => {
                self.fail(key, BLANK);
                return None;
            }
            Some(Value::Object(inner)) => inner,
            Some(_) => {
                self.fail(key, INVALID_TYPE);
                return None;
            }
        };

        let mut nested = Checker::nested(format!("{}.", self.path(key)));
        let id = nested.optional_id(inner, "id");
        let name = nested.text(inner, "name", true, Some(AUTHOR_NAME_MAX_LEN));
        self.errors.merge(nested.errors);
        name.map(|name| AuthorRef { id, name })
    }

    fn nested_quotes(&mut self, data: &Map<String, Value>, key: &str) -> Option<Vec<NestedQuote>> {
        let items = match data.get(key)? {
            Value::Null => {
                self.fail(key, NULL);
                return None;
            }
            Value::Array(items) => items,
            _ => {
                self.fail(key, INVALID_TYPE);
                return None;
            }
        };

        let mut quotes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(inner) = item.as_object() else {
                self.fail(&format!("{}.{}", key, index), INVALID_TYPE);
                continue;
            };
            let mut nested = Checker::nested(format!("{}.{}.", self.path(key), index));
            let content = nested.text(inner, "content", true, None);
            let context = nested.nullable_text(inner, "context", Some(QUOTE_CONTEXT_MAX_LEN));
            self.errors.merge(nested.errors);
            if let Some(content) = content {
                quotes.push(NestedQuote {
                    content,
                    context: context.flatten(),
                });
            }
        }
        Some(quotes)
    }
}
