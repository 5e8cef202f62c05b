/// Local part and domain of an address, with the domain in ASCII form.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub local: String,
    pub domain: String,
    pub ascii_domain: String,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressReport {
    pub original: String,
    pub ok: bool,
    pub reasons: Vec<String>,
    pub parsed: Option<ParsedAddress>,
}

impl AddressReport {
    pub(crate) fn invalid(original: &str, reasons: Vec<String>) -> Self {
        Self {
            original: original.to_string(),
            ok: false,
            reasons,
            parsed: None,
        }
    }
}
