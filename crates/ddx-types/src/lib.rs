//! Validated primitive types shared across the DDX crates.
//!
//! These wrappers move the most common dataset checks (blank identifiers, weights outside
//! `0.0..=1.0`) to the type level, so a value that made it through deserialisation can be
//! used without re-checking it.

/// Errors that can occur when creating validated primitive types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when creating a [`Fraction`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FractionError {
    /// The value was NaN or infinite
    #[error("value must be a finite number")]
    NotFinite,
    /// The value fell outside `0.0..=1.0`
    #[error("value {0} is outside the range 0.0..=1.0")]
    OutOfRange(f64),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Normalises free text into a case-insensitive lookup key.
///
/// Lowercases and collapses runs of whitespace, `_` and `-` into a single space, so
/// `"Sore_Throat"`, `"sore throat"` and `"SORE  THROAT"` share a key.
pub fn lookup_key(input: &str) -> String {
    input
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A finite `f64` in the closed interval `0.0..=1.0`.
///
/// Used for per-(disease, symptom) importance weights and presentation frequencies.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Fraction(f64);

impl Fraction {
    pub const ZERO: Fraction = Fraction(0.0);
    pub const ONE: Fraction = Fraction(1.0);

    /// Creates a new `Fraction`.
    ///
    /// # Errors
    ///
    /// Returns [`FractionError`] if `value` is not finite or lies outside `0.0..=1.0`.
    pub fn new(value: f64) -> Result<Self, FractionError> {
        if !value.is_finite() {
            return Err(FractionError::NotFinite);
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(FractionError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Creates a `Fraction`, clamping finite values into range and mapping NaN to zero.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Fraction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Fraction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fraction::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        let text = NonEmptyText::new("  Fever ").expect("should accept");
        assert_eq!(text.as_str(), "Fever");
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn lookup_key_collapses_separators_and_case() {
        assert_eq!(lookup_key("Sore_Throat"), "sore throat");
        assert_eq!(lookup_key("  SORE   throat "), "sore throat");
        assert_eq!(lookup_key("ear-pain"), "ear pain");
        assert_eq!(lookup_key("Shortness of Breath"), "shortness of breath");
    }

    #[test]
    fn fraction_enforces_unit_interval() {
        assert_eq!(Fraction::new(0.25).unwrap().get(), 0.25);
        assert_eq!(Fraction::new(1.5), Err(FractionError::OutOfRange(1.5)));
        assert_eq!(Fraction::new(-0.1), Err(FractionError::OutOfRange(-0.1)));
        assert_eq!(Fraction::new(f64::NAN), Err(FractionError::NotFinite));
    }

    #[test]
    fn fraction_saturating_clamps() {
        assert_eq!(Fraction::saturating(3.0), Fraction::ONE);
        assert_eq!(Fraction::saturating(-2.0), Fraction::ZERO);
        assert_eq!(Fraction::saturating(f64::NAN), Fraction::ZERO);
    }

    #[test]
    fn deserialize_rejects_invalid_values() {
        let ok: Fraction = serde_json::from_str("0.7").expect("valid fraction");
        assert_eq!(ok.get(), 0.7);

        let err = serde_json::from_str::<Fraction>("1.2").expect_err("out of range");
        assert!(err.to_string().contains("outside the range"));

        let err = serde_json::from_str::<NonEmptyText>("\"  \"").expect_err("blank text");
        assert!(err.to_string().contains("cannot be empty"));
    }
}
