//! Service layer for the hemolink backend.
//!
//! Each module wraps the raw database operations for one feature area:
//! accounts (donors/hospitals), campaigns, blood donations, reward vouchers,
//! fund donations, analytics aggregation, and the campaign-announcement
//! email fan-out.

pub mod accounts;
pub mod analytics;
pub mod announcements;
pub mod campaigns;
pub mod cooldown;
pub mod donations;
pub mod funds;
pub mod rewards;
