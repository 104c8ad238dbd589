//! Canonical field names.

pub const BUSINESS_NAME: &str = "business_name";
pub const PHONE: &str = "phone";
pub const EMAIL: &str = "email";
pub const LOCATION: &str = "location";
pub const WEBSITE: &str = "website";
pub const INDUSTRY: &str = "industry";
pub const DESCRIPTION: &str = "description";
pub const ADDRESS: &str = "address";
pub const SOURCE: &str = "source";

// Derived columns added by validation and the pipeline.
pub const EMAIL_VALID: &str = "email_valid";
pub const PHONE_VALID: &str = "phone_valid";
pub const EMAIL_FORMATTED: &str = "email_formatted";
pub const PHONE_FORMATTED: &str = "phone_formatted";
pub const VALIDATION_SCORE: &str = "validation_score";
pub const VALIDATION_FLAGS: &str = "validation_flags";
pub const IS_VALID: &str = "is_valid";
pub const SUSPICIOUS: &str = "suspicious";
pub const PROCESSED_AT: &str = "processed_at";
