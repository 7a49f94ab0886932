//! Command name comparison.
//!
//! Names are compared character by character after optional ASCII case
//! folding. When one name is a prefix of the other the shorter one sorts
//! first, so `a` < `ab` < `b`.

use std::cmp::Ordering;

/// Case policy for command names. One policy applies to a whole tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CaseSensitivity {
    /// `Round`, `ROUND` and `round` name the same command.
    #[default]
    Insensitive,
    /// Names must match exactly.
    Sensitive,
}

impl CaseSensitivity {
    pub fn from_flag(case_sensitive: bool) -> Self {
        if case_sensitive {
            CaseSensitivity::Sensitive
        } else {
            CaseSensitivity::Insensitive
        }
    }

    fn fold(self, c: char) -> char {
        match self {
            CaseSensitivity::Insensitive => c.to_ascii_lowercase(),
            CaseSensitivity::Sensitive => c,
        }
    }

    /// Total order used for child maps.
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        let mut left = a.chars();
        let mut right = b.chars();
        loop {
            match (left.next(), right.next()) {
                (Some(x), Some(y)) => match self.fold(x).cmp(&self.fold(y)) {
                    Ordering::Equal => continue,
                    other => return other,
                },
                // One is a prefix of the other: shorter first.
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    }

    pub fn equals(self, a: &str, b: &str) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// Whether `name` begins with `prefix` under this policy.
    pub fn starts_with(self, name: &str, prefix: &str) -> bool {
        let mut chars = name.chars();
        prefix
            .chars()
            .all(|p| chars.next().is_some_and(|n| self.fold(n) == self.fold(p)))
    }
}

/// Key of a child map: the name as registered plus the policy it is
/// ordered under.
#[derive(Debug, Clone)]
pub(crate) struct NameKey {
    pub(crate) name: String,
    case: CaseSensitivity,
}

impl NameKey {
    pub(crate) fn new(name: impl Into<String>, case: CaseSensitivity) -> Self {
        Self {
            name: name.into(),
            case,
        }
    }
}

impl PartialEq for NameKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NameKey {}

impl PartialOrd for NameKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NameKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.case.compare(&self.name, &other.name)
    }
}
