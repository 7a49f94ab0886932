//! Typed conversion of argument tokens.

/// A value that can be parsed out of a single argument token.
pub trait FromToken: Sized {
    /// Human-readable kind used in error messages ("integer", "boolean", ...).
    const KIND: &'static str;

    fn from_token(token: &str) -> Option<Self>;
}

macro_rules! impl_from_token {
    ($kind:literal => $($ty:ty),+) => {
        $(
            impl FromToken for $ty {
                const KIND: &'static str = $kind;

                fn from_token(token: &str) -> Option<Self> {
                    token.parse().ok()
                }
            }
        )+
    };
}

impl_from_token!("integer" => i8, i16, i32, i64, isize);
impl_from_token!("unsigned integer" => u8, u16, u32, u64, usize);
impl_from_token!("number" => f32, f64);

impl FromToken for bool {
    const KIND: &'static str = "boolean";

    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}

impl FromToken for String {
    const KIND: &'static str = "text";

    fn from_token(token: &str) -> Option<Self> {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(i32::from_token("-12"), Some(-12));
        assert_eq!(i32::from_token("1.5"), None);
        assert_eq!(u32::from_token("-1"), None);
        assert_eq!(u8::from_token("256"), None);
    }

    #[test]
    fn floats() {
        assert_eq!(f64::from_token("2.5"), Some(2.5));
        assert_eq!(f64::from_token("7"), Some(7.0));
        assert_eq!(f32::from_token("seven"), None);
    }

    #[test]
    fn booleans() {
        assert_eq!(bool::from_token("TRUE"), Some(true));
        assert_eq!(bool::from_token("off"), Some(false));
        assert_eq!(bool::from_token("0"), Some(false));
        assert_eq!(bool::from_token("maybe"), None);
    }

    #[test]
    fn kinds() {
        assert_eq!(i64::KIND, "integer");
        assert_eq!(usize::KIND, "unsigned integer");
        assert_eq!(f32::KIND, "number");
        assert_eq!(String::KIND, "text");
    }
}
