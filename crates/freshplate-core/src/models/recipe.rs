//! Recipe model

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Server-assigned recipe identifier, taken from the navigation context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeId(String);

impl RecipeId {
    /// Parse an identifier, returning `None` when it is missing or blank.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecipeId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(Some(s))
            .ok_or_else(|| crate::Error::InvalidInput("Recipe ID cannot be empty".to_string()))
    }
}

/// Editable scalar attributes of a recipe, named as they travel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeField {
    Title,
    Ingredients,
    Instructions,
    Preptime,
    Cooktime,
    Servings,
}

impl RecipeField {
    /// All fields in form order.
    pub const ALL: [Self; 6] = [
        Self::Title,
        Self::Ingredients,
        Self::Instructions,
        Self::Preptime,
        Self::Cooktime,
        Self::Servings,
    ];

    /// Multipart/JSON field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Ingredients => "ingredients",
            Self::Instructions => "instructions",
            Self::Preptime => "preptime",
            Self::Cooktime => "cooktime",
            Self::Servings => "servings",
        }
    }

    /// Human-readable label used in validation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Ingredients => "Ingredients",
            Self::Instructions => "Instructions",
            Self::Preptime => "Prep time",
            Self::Cooktime => "Cook time",
            Self::Servings => "Servings",
        }
    }

    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Title | Self::Ingredients | Self::Instructions)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Preptime | Self::Cooktime | Self::Servings)
    }
}

impl fmt::Display for RecipeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown recipe field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for RecipeField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownField(name.to_string()))
    }
}

/// A recipe as returned by the API.
///
/// Numeric attributes are kept as text; the server may send them either as
/// JSON numbers or strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub title: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub ingredients: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub instructions: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub preptime: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub cooktime: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub servings: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<StoredImage>,
}

impl Recipe {
    /// Scalar fields of this recipe as editable form state.
    #[must_use]
    pub fn form(&self) -> RecipeForm {
        RecipeForm {
            title: self.title.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            preptime: self.preptime.clone(),
            cooktime: self.cooktime.clone(),
            servings: self.servings.clone(),
        }
    }
}

/// Local copy of the editable scalar fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeForm {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub preptime: String,
    pub cooktime: String,
    pub servings: String,
}

/// A form field that failed submission checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{} is required", .0.label())]
    Required(RecipeField),
    #[error("{} must be a number", .0.label())]
    NotNumeric(RecipeField),
}

impl RecipeForm {
    #[must_use]
    pub fn get(&self, field: RecipeField) -> &str {
        match field {
            RecipeField::Title => &self.title,
            RecipeField::Ingredients => &self.ingredients,
            RecipeField::Instructions => &self.instructions,
            RecipeField::Preptime => &self.preptime,
            RecipeField::Cooktime => &self.cooktime,
            RecipeField::Servings => &self.servings,
        }
    }

    pub fn set(&mut self, field: RecipeField, value: impl Into<String>) {
        let slot = match field {
            RecipeField::Title => &mut self.title,
            RecipeField::Ingredients => &mut self.ingredients,
            RecipeField::Instructions => &mut self.instructions,
            RecipeField::Preptime => &mut self.preptime,
            RecipeField::Cooktime => &mut self.cooktime,
            RecipeField::Servings => &mut self.servings,
        };
        *slot = value.into();
    }

    /// Field name/value pairs in form order.
    pub fn fields(&self) -> impl Iterator<Item = (RecipeField, &str)> + '_ {
        RecipeField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }

    /// Check required and numeric fields, reporting the first offending one.
    ///
    /// Empty numeric fields are accepted; only non-empty non-numbers fail.
    pub fn validate(&self) -> Result<(), FieldError> {
        for (field, value) in self.fields() {
            let value = value.trim();
            if field.is_required() && value.is_empty() {
                return Err(FieldError::Required(field));
            }
            if field.is_numeric() && !value.is_empty() && !is_finite_number(value) {
                return Err(FieldError::NotNumeric(field));
            }
        }
        Ok(())
    }
}

/// `NaN`, `inf` and overflowing literals parse as `f64` but are not numbers a
/// number input would accept.
fn is_finite_number(value: &str) -> bool {
    value.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Image attached to a stored recipe, in its wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub data: Option<ImageData>,
}

/// Image payload as delivered by the server: base64 text or a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageData {
    Base64(String),
    /// Node-style `{"type":"Buffer","data":[...]}`
    Buffer { data: Vec<u8> },
    Bytes(Vec<u8>),
}

impl ImageData {
    /// Raw image bytes. Base64 text may carry a `data:` URI prefix.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        match self {
            Self::Base64(encoded) => {
                let encoded = encoded
                    .split_once(";base64,")
                    .map_or(encoded.as_str(), |(_, payload)| payload);
                let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
                BASE64_STANDARD.decode(compact)
            }
            Self::Buffer { data } | Self::Bytes(data) => Ok(data.clone()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Base64(encoded) => encoded.trim().is_empty(),
            Self::Buffer { data } | Self::Bytes(data) => data.is_empty(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn recipe_id_rejects_blank() {
        assert!(RecipeId::parse(None).is_none());
        assert!(RecipeId::parse(Some("   ")).is_none());
        assert_eq!(RecipeId::parse(Some(" r1 ")).unwrap().as_str(), "r1");
        assert!("".parse::<RecipeId>().is_err());
    }

    #[test]
    fn recipe_field_parses_wire_names() {
        assert_eq!("title".parse::<RecipeField>(), Ok(RecipeField::Title));
        assert_eq!("Servings".parse::<RecipeField>(), Ok(RecipeField::Servings));
        assert_eq!(
            "image".parse::<RecipeField>(),
            Err(UnknownField("image".to_string()))
        );
    }

    #[test]
    fn recipe_accepts_numbers_and_strings() {
        let recipe: Recipe = serde_json::from_str(
            r#"{
                "_id": "r1",
                "title": "Soup",
                "ingredients": "Water",
                "instructions": "Boil",
                "preptime": 5,
                "cooktime": "10",
                "servings": null,
                "postedBy": "u1",
                "image": null
            }"#,
        )
        .unwrap();
        assert_eq!(recipe.id.as_deref(), Some("r1"));
        assert_eq!(recipe.preptime, "5");
        assert_eq!(recipe.cooktime, "10");
        assert_eq!(recipe.servings, "");
        assert!(recipe.image.is_none());
    }

    #[test]
    fn stored_image_accepts_buffer_and_base64() {
        let buffer: StoredImage = serde_json::from_str(
            r#"{"contentType":"image/png","data":{"type":"Buffer","data":[1,2,3]}}"#,
        )
        .unwrap();
        assert_eq!(buffer.data.unwrap().decode().unwrap(), vec![1, 2, 3]);

        let text: StoredImage =
            serde_json::from_str(r#"{"contentType":"image/png","data":"AQID"}"#).unwrap();
        assert_eq!(text.data.unwrap().decode().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn image_data_strips_data_uri_prefix() {
        let data = ImageData::Base64("data:image/png;base64,AQID".to_string());
        assert_eq!(data.decode().unwrap(), vec![1, 2, 3]);
        assert!(ImageData::Base64("not base64!".to_string()).decode().is_err());
    }

    #[test]
    fn form_set_replaces_single_field() {
        let mut form = RecipeForm::default();
        form.set(RecipeField::Title, "Soup");
        form.set(RecipeField::Servings, "2");
        form.set(RecipeField::Title, "Stew");
        assert_eq!(form.get(RecipeField::Title), "Stew");
        assert_eq!(form.get(RecipeField::Servings), "2");
        assert_eq!(form.get(RecipeField::Ingredients), "");
    }

    #[test]
    fn validate_reports_missing_required_field() {
        let form = RecipeForm {
            title: "Soup".to_string(),
            ingredients: "  ".to_string(),
            instructions: "Boil".to_string(),
            ..RecipeForm::default()
        };
        let error = form.validate().unwrap_err();
        assert_eq!(error, FieldError::Required(RecipeField::Ingredients));
        assert_eq!(error.to_string(), "Ingredients is required");
    }

    #[test]
    fn validate_rejects_non_numeric_times() {
        let form = RecipeForm {
            title: "Soup".to_string(),
            ingredients: "Water".to_string(),
            instructions: "Boil".to_string(),
            preptime: "five".to_string(),
            ..RecipeForm::default()
        };
        assert_eq!(
            form.validate(),
            Err(FieldError::NotNumeric(RecipeField::Preptime))
        );

        for value in ["NaN", "inf", "-infinity", "1e400"] {
            let form = RecipeForm {
                preptime: String::new(),
                servings: value.to_string(),
                ..form.clone()
            };
            assert_eq!(
                form.validate(),
                Err(FieldError::NotNumeric(RecipeField::Servings)),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn validate_allows_empty_numeric_fields() {
        let form = RecipeForm {
            title: "Soup".to_string(),
            ingredients: "Water".to_string(),
            instructions: "Boil".to_string(),
            cooktime: "12.5".to_string(),
            ..RecipeForm::default()
        };
        assert!(form.validate().is_ok());
    }
}
