use serde::{Serialize, Deserialize, Serializer};
use std::fmt;

/// Wraps contact details (emails, phone numbers) so they never show up in
/// `Debug`/`Display` output, while still serializing the real value for API
/// responses and storage.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl From<String> for Masked<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_value_in_logs() {
        let phone = Masked::new("123-456-7890".to_string());
        assert_eq!(format!("{:?}", phone), "********");
        assert_eq!(format!("{}", phone), "********");
    }

    #[test]
    fn test_masked_serializes_real_value() {
        let email = Masked::new("ops@example.com".to_string());
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(json, serde_json::json!("ops@example.com"));

        let back: Masked<String> = serde_json::from_value(json).unwrap();
        assert_eq!(back.expose(), "ops@example.com");
    }
}
