#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }

    /// RFC 7505 null MX: a single record whose exchange is the root.
    pub fn is_null(&self) -> bool {
        self.exchange.is_empty() || self.exchange == "."
    }
}

/// Outcome of a DNS query, keeping "nothing there" apart from "could not ask".
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(tag = "status", content = "data", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(Vec<T>),
    NotFound,
    Failed(String),
}

impl<T> Lookup<T> {
    pub fn records(&self) -> &[T] {
        match self {
            Self::Found(records) => records.as_slice(),
            Self::NotFound | Self::Failed(_) => &[],
        }
    }

    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Found(records) => records,
            Self::NotFound | Self::Failed(_) => Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Whether the domain of an address answered for mail.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(tag = "status", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainStatus {
    /// An MX RRset exists (possibly only a null MX).
    Exists,
    /// NXDOMAIN or no MX records.
    NotFound,
    /// The resolver failed; the domain may or may not exist.
    LookupFailed { message: String },
    /// The address never reached DNS (bad format).
    NotChecked,
}

impl DomainStatus {
    pub fn exists(&self) -> bool {
        matches!(self, Self::Exists)
    }
}

impl<T> From<&Lookup<T>> for DomainStatus {
    fn from(lookup: &Lookup<T>) -> Self {
        match lookup {
            Lookup::Found(_) => Self::Exists,
            Lookup::NotFound => Self::NotFound,
            Lookup::Failed(message) => Self::LookupFailed {
                message: message.clone(),
            },
        }
    }
}
