use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Wrapper<T> {
    kind: Option<String>,
    message: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    payload: T
}

impl<T> Wrapper<T> {
    pub fn new(payload: T) -> Self {
        Self {
            kind: None,
            message: None,
            timestamp: None,
            payload
        }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn with_timestamp_now(mut self) -> Self {
        self.timestamp = Some(Utc::now());
        self
    }

    pub fn with_message<M>(mut self, msg: M) -> Self
    where
        M: Into<String>
    {
        self.message = Some(msg.into());
        self
    }

    pub fn with_kind<K>(mut self, kind: K) -> Self
    where
        K: Into<String>
    {
        self.kind = Some(kind.into());
        self
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListWrapper<T> {
    kind: Option<String>,
    message: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    total: usize,
    payload: T,
}

impl<T> ListWrapper<T> {
    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> ListWrapper<Vec<T>> {
    pub fn with_vec(vec: Vec<T>) -> Self {
        Self {
            kind: None,
            message: None,
            timestamp: None,
            total: vec.len(),
            payload: vec
        }
    }
}
