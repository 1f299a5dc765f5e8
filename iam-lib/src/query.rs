use serde::Deserialize;
use serde_repr::{Serialize_repr, Deserialize_repr};

pub type Offset = u8;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize_repr, Deserialize_repr
)]
#[repr(u8)]
pub enum Limit {
    Small = 25,
    Medium = 50,
    Large = 100
}

impl Limit {
    pub fn as_usize(&self) -> usize {
        *self as usize
    }

    /// number of leading records the page skips
    pub fn skip(&self, offset: Offset) -> usize {
        self.as_usize() * (offset as usize)
    }
}

impl Default for Limit {
    fn default() -> Limit {
        Limit::Small
    }
}

/// query string shape shared by the list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    offset: Option<Offset>,
    limit: Option<Limit>,
}

impl Pagination {
    pub fn offset(&self) -> Offset {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> Option<Limit> {
        self.limit
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn limit_skip() {
        assert_eq!(Limit::Small.skip(0), 0);
        assert_eq!(Limit::Small.skip(2), 50);
        assert_eq!(Limit::Large.skip(3), 300);
    }
}
