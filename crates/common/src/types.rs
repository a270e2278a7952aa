use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account roles in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Hospital,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Donor => write!(f, "donor"),
            Role::Hospital => write!(f, "hospital"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// ABO/Rh blood groups. Stored as snake_case text (`a_pos`, `o_neg`, ...);
/// `label()` gives the clinical form ("A+", "O-").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BloodGroup {
    APos,
    ANeg,
    BPos,
    BNeg,
    AbPos,
    AbNeg,
    OPos,
    ONeg,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APos,
        BloodGroup::ANeg,
        BloodGroup::BPos,
        BloodGroup::BNeg,
        BloodGroup::AbPos,
        BloodGroup::AbNeg,
        BloodGroup::OPos,
        BloodGroup::ONeg,
    ];

    /// Clinical label, e.g. "A+" or "O-".
    pub fn label(&self) -> &'static str {
        match self {
            BloodGroup::APos => "A+",
            BloodGroup::ANeg => "A-",
            BloodGroup::BPos => "B+",
            BloodGroup::BNeg => "B-",
            BloodGroup::AbPos => "AB+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::OPos => "O+",
            BloodGroup::ONeg => "O-",
        }
    }

    /// Parse from either the storage form ("a_pos") or the clinical label ("A+").
    pub fn parse_str(s: &str) -> Option<BloodGroup> {
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.to_string() == s || g.label() == s)
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BloodGroup::APos => write!(f, "a_pos"),
            BloodGroup::ANeg => write!(f, "a_neg"),
            BloodGroup::BPos => write!(f, "b_pos"),
            BloodGroup::BNeg => write!(f, "b_neg"),
            BloodGroup::AbPos => write!(f, "ab_pos"),
            BloodGroup::AbNeg => write!(f, "ab_neg"),
            BloodGroup::OPos => write!(f, "o_pos"),
            BloodGroup::ONeg => write!(f, "o_neg"),
        }
    }
}

/// Campaign lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Pending,
    Approved,
    Completed,
    Cancelled,
}

/// Blood-donation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Approved,
    Completed,
    Rejected,
}

/// Reward voucher status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    Active,
    Redeemed,
    Expired,
}

/// Email delivery status for announcement recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
}

/// A registered account: donor, hospital, or admin.
///
/// Donors carry a blood group and a points balance; hospitals carry a street
/// address. The other fields are shared.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: String,
    pub blood_group: Option<BloodGroup>,
    pub points: i32,
    pub address: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub last_donation_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A hospital-organized blood-drive campaign.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub title: String,
    pub description: String,
    pub city: String,
    pub venue: String,
    /// JSON list of targeted blood groups; empty means "all groups".
    pub target_blood_groups: serde_json::Value,
    pub status: CampaignStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled or completed blood donation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub hospital_id: Uuid,
    pub units: i32,
    pub status: DonationStatus,
    pub points_awarded: i32,
    pub donated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A reward voucher purchased with donation points.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Voucher {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub code: String,
    pub points_cost: i32,
    pub status: VoucherStatus,
    pub issued_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

/// A financial donation. `donor_id` is set when the giver was signed in.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FundDonation {
    pub id: Uuid,
    pub donor_id: Option<Uuid>,
    pub donor_name: String,
    pub amount_cents: i64,
    pub currency: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A campaign announcement fan-out record with its outcome counters.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Announcement {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub message: String,
    pub total: i32,
    pub sent: i32,
    pub failed: i32,
    pub created_at: DateTime<Utc>,
}

/// One recipient's delivery record within an announcement fan-out.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmailDelivery {
    pub id: Uuid,
    pub announcement_id: Uuid,
    pub recipient: String,
    pub status: DeliveryStatus,
    pub error_detail: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Outcome summary of an announcement fan-out: attempt counts only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnnouncementSummary {
    pub total: u32,
    pub success: u32,
    pub failed: u32,
}

/// Typed representation of a campaign's `target_blood_groups` JSON.
///
/// An empty (or absent) list means "no blood-group filter" — the campaign
/// broadcasts to every group in its city.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetGroups(pub Vec<BloodGroup>);

impl TargetGroups {
    /// Parse from the stored JSON value. Entries that are not known blood
    /// groups are ignored; campaign creation validates them up front.
    pub fn from_value(value: &serde_json::Value) -> TargetGroups {
        let groups = value
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(BloodGroup::parse_str)
                    .collect()
            })
            .unwrap_or_default();
        TargetGroups(groups)
    }

    /// True when no blood-group filter applies.
    pub fn is_broadcast(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a donor with this blood group is targeted.
    pub fn matches(&self, group: BloodGroup) -> bool {
        self.is_broadcast() || self.0.contains(&group)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignStatus::Pending => write!(f, "pending"),
            CampaignStatus::Approved => write!(f, "approved"),
            CampaignStatus::Completed => write!(f, "completed"),
            CampaignStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DonationStatus::Pending => write!(f, "pending"),
            DonationStatus::Approved => write!(f, "approved"),
            DonationStatus::Completed => write!(f, "completed"),
            DonationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoucherStatus::Active => write!(f, "active"),
            VoucherStatus::Redeemed => write!(f, "redeemed"),
            VoucherStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "pending"),
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blood_group_parse_storage_form() {
        assert_eq!(BloodGroup::parse_str("a_pos"), Some(BloodGroup::APos));
        assert_eq!(BloodGroup::parse_str("o_neg"), Some(BloodGroup::ONeg));
        assert_eq!(BloodGroup::parse_str("ab_pos"), Some(BloodGroup::AbPos));
    }

    #[test]
    fn test_blood_group_parse_clinical_label() {
        assert_eq!(BloodGroup::parse_str("A+"), Some(BloodGroup::APos));
        assert_eq!(BloodGroup::parse_str("AB-"), Some(BloodGroup::AbNeg));
        assert_eq!(BloodGroup::parse_str("O+"), Some(BloodGroup::OPos));
    }

    #[test]
    fn test_blood_group_parse_unknown() {
        assert_eq!(BloodGroup::parse_str("c_pos"), None);
        assert_eq!(BloodGroup::parse_str(""), None);
    }

    #[test]
    fn test_blood_group_display_label_round_trip() {
        for group in BloodGroup::ALL {
            assert_eq!(BloodGroup::parse_str(&group.to_string()), Some(group));
            assert_eq!(BloodGroup::parse_str(group.label()), Some(group));
        }
    }

    #[test]
    fn test_target_groups_empty_is_broadcast() {
        let targets = TargetGroups::from_value(&serde_json::json!([]));
        assert!(targets.is_broadcast());
        assert!(targets.matches(BloodGroup::APos));
        assert!(targets.matches(BloodGroup::ONeg));
    }

    #[test]
    fn test_target_groups_non_array_is_broadcast() {
        let targets = TargetGroups::from_value(&serde_json::Value::Null);
        assert!(targets.is_broadcast());
    }

    #[test]
    fn test_target_groups_filters() {
        let targets = TargetGroups::from_value(&serde_json::json!(["o_pos", "o_neg"]));
        assert!(!targets.is_broadcast());
        assert!(targets.matches(BloodGroup::OPos));
        assert!(!targets.matches(BloodGroup::APos));
    }

    #[test]
    fn test_target_groups_ignores_unknown_entries() {
        let targets = TargetGroups::from_value(&serde_json::json!(["o_pos", "bogus"]));
        assert_eq!(targets.0.len(), 1);
        assert!(targets.matches(BloodGroup::OPos));
    }
}
