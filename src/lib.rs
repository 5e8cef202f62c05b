#![forbid(unsafe_code)]
//! mailprobe_lib: deliverability checks (format, MX, SPF, DMARC) and test
//! sends through SMTP or Amazon SES.

pub mod address;
pub mod auth;
pub mod batch;
pub mod config;
pub mod delivery;
pub mod dns;
pub mod sender;
pub mod tester;

pub use address::{AddressReport, ParsedAddress, check_address, is_valid_format, split_address};
pub use auth::{AuthRecords, DmarcStatus, SpfStatus, check_auth_records};
pub use batch::{BatchItem, BatchResult, ValidationBatch};
pub use config::{ConfigError, MailerConfig, SesSettings, SmtpOverrides, SmtpSettings};
pub use delivery::{
    Attachment, BackendKind, DeliveryBackend, DeliveryError, OutgoingEmail, SKIPPED_MESSAGE_ID,
    SendResult,
};
pub use dns::{DnsError, DnsLookup, DomainStatus, Lookup, MxRecord, SystemResolver};
pub use sender::{
    BackendConnection, BackendPreference, ConfigStatus, ConnectionReport, EmailSender, SenderError,
};
pub use tester::{BackendSelection, DeliverabilityTester, TestOptions, TestResult};
