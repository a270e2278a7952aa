//! Analytics — funnel and distribution aggregation over fetched rows.
//!
//! The SQL side only fetches; the aggregation itself is a fold over the row
//! slices, which keeps it independently testable. The funnel tracks donors
//! from registration through repeat donation.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use hemolink_common::error::AppError;
use hemolink_common::types::{Account, Donation, DonationStatus, FundDonation};

/// Donor progression counts: each stage is a subset of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DonorFunnel {
    /// Registered donor accounts.
    pub registered: u32,
    /// Donors with at least one scheduled donation (any status).
    pub scheduled: u32,
    /// Donors with at least one completed donation.
    pub completed: u32,
    /// Donors with two or more completed donations.
    pub repeat_donors: u32,
}

/// Per-currency fund totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyTotal {
    pub currency: String,
    pub total_cents: i64,
    pub count: u32,
}

/// Full analytics payload returned by the overview endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsOverview {
    pub funnel: DonorFunnel,
    /// Completed units keyed by clinical blood-group label ("A+", ...).
    pub units_by_blood_group: BTreeMap<String, i64>,
    /// Completed donation counts keyed by month ("2026-08").
    pub monthly_completed: BTreeMap<String, u32>,
    pub fund_totals: Vec<CurrencyTotal>,
}

/// Analytics service: fetch rows, then aggregate in code.
pub struct AnalyticsService;

impl AnalyticsService {
    /// Build the full overview from current data.
    pub async fn overview(pool: &PgPool) -> Result<AnalyticsOverview, AppError> {
        let donors: Vec<Account> =
            sqlx::query_as("SELECT * FROM accounts WHERE role = 'donor'")
                .fetch_all(pool)
                .await?;

        let donations: Vec<Donation> = sqlx::query_as("SELECT * FROM donations")
            .fetch_all(pool)
            .await?;

        let funds: Vec<FundDonation> = sqlx::query_as("SELECT * FROM fund_donations")
            .fetch_all(pool)
            .await?;

        Ok(AnalyticsOverview {
            funnel: build_funnel(&donors, &donations),
            units_by_blood_group: units_by_blood_group(&donors, &donations),
            monthly_completed: monthly_completed(&donations),
            fund_totals: fund_totals(&funds),
        })
    }
}

/// Fold donors and donations into the registration → repeat-donor funnel.
pub fn build_funnel(donors: &[Account], donations: &[Donation]) -> DonorFunnel {
    let donor_ids: HashSet<Uuid> = donors.iter().map(|d| d.id).collect();

    let mut scheduled: HashSet<Uuid> = HashSet::new();
    let mut completed_counts: HashMap<Uuid, u32> = HashMap::new();

    for donation in donations {
        if !donor_ids.contains(&donation.donor_id) {
            continue;
        }
        scheduled.insert(donation.donor_id);
        if donation.status == DonationStatus::Completed {
            *completed_counts.entry(donation.donor_id).or_insert(0) += 1;
        }
    }

    DonorFunnel {
        registered: donor_ids.len() as u32,
        scheduled: scheduled.len() as u32,
        completed: completed_counts.len() as u32,
        repeat_donors: completed_counts.values().filter(|&&n| n >= 2).count() as u32,
    }
}

/// Sum completed units per blood group, keyed by clinical label.
pub fn units_by_blood_group(
    donors: &[Account],
    donations: &[Donation],
) -> BTreeMap<String, i64> {
    let groups: HashMap<Uuid, _> = donors
        .iter()
        .filter_map(|d| d.blood_group.map(|g| (d.id, g)))
        .collect();

    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for donation in donations {
        if donation.status != DonationStatus::Completed {
            continue;
        }
        if let Some(group) = groups.get(&donation.donor_id) {
            *totals.entry(group.label().to_string()).or_insert(0) += donation.units as i64;
        }
    }

    totals
}

/// Count completed donations per month ("YYYY-MM"), by donation date.
pub fn monthly_completed(donations: &[Donation]) -> BTreeMap<String, u32> {
    let mut months: BTreeMap<String, u32> = BTreeMap::new();
    for donation in donations {
        if donation.status != DonationStatus::Completed {
            continue;
        }
        if let Some(donated_at) = donation.donated_at {
            *months.entry(donated_at.format("%Y-%m").to_string()).or_insert(0) += 1;
        }
    }

    months
}

/// Sum fund donations per currency.
pub fn fund_totals(funds: &[FundDonation]) -> Vec<CurrencyTotal> {
    let mut totals: BTreeMap<String, (i64, u32)> = BTreeMap::new();
    for fund in funds {
        let entry = totals.entry(fund.currency.clone()).or_insert((0, 0));
        entry.0 += fund.amount_cents;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(currency, (total_cents, count))| CurrencyTotal {
            currency,
            total_cents,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hemolink_common::types::{BloodGroup, Role};

    fn make_donor(group: BloodGroup) -> Account {
        Account {
            id: Uuid::new_v4(),
            role: Role::Donor,
            name: "Test Donor".to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            phone: None,
            city: "Pune".to_string(),
            blood_group: Some(group),
            points: 0,
            address: None,
            api_key: None,
            last_donation_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_donation(donor_id: Uuid, status: DonationStatus, units: i32) -> Donation {
        Donation {
            id: Uuid::new_v4(),
            donor_id,
            campaign_id: None,
            hospital_id: Uuid::new_v4(),
            units,
            status,
            points_awarded: 0,
            donated_at: Some(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_funnel_counts_stages() {
        let donors = vec![
            make_donor(BloodGroup::APos),
            make_donor(BloodGroup::OPos),
            make_donor(BloodGroup::BNeg),
        ];
        let repeat = donors[0].id;
        let once = donors[1].id;

        let donations = vec![
            make_donation(repeat, DonationStatus::Completed, 1),
            make_donation(repeat, DonationStatus::Completed, 1),
            make_donation(once, DonationStatus::Pending, 1),
        ];

        let funnel = build_funnel(&donors, &donations);
        assert_eq!(funnel.registered, 3);
        assert_eq!(funnel.scheduled, 2);
        assert_eq!(funnel.completed, 1);
        assert_eq!(funnel.repeat_donors, 1);
    }

    #[test]
    fn test_funnel_empty() {
        let funnel = build_funnel(&[], &[]);
        assert_eq!(
            funnel,
            DonorFunnel {
                registered: 0,
                scheduled: 0,
                completed: 0,
                repeat_donors: 0
            }
        );
    }

    #[test]
    fn test_funnel_ignores_unknown_donor_ids() {
        let donors = vec![make_donor(BloodGroup::APos)];
        let donations = vec![make_donation(
            Uuid::new_v4(),
            DonationStatus::Completed,
            1,
        )];
        let funnel = build_funnel(&donors, &donations);
        assert_eq!(funnel.scheduled, 0);
        assert_eq!(funnel.completed, 0);
    }

    #[test]
    fn test_units_by_blood_group_sums_completed_only() {
        let donors = vec![make_donor(BloodGroup::OPos), make_donor(BloodGroup::APos)];
        let donations = vec![
            make_donation(donors[0].id, DonationStatus::Completed, 2),
            make_donation(donors[0].id, DonationStatus::Completed, 1),
            make_donation(donors[1].id, DonationStatus::Pending, 5),
        ];

        let totals = units_by_blood_group(&donors, &donations);
        assert_eq!(totals.get("O+"), Some(&3));
        assert_eq!(totals.get("A+"), None);
    }

    #[test]
    fn test_monthly_completed_buckets() {
        let donor = Uuid::new_v4();
        let mut early = make_donation(donor, DonationStatus::Completed, 1);
        early.donated_at = Some(Utc.with_ymd_and_hms(2026, 7, 15, 9, 0, 0).unwrap());
        let late = make_donation(donor, DonationStatus::Completed, 1);

        let months = monthly_completed(&[early, late]);
        assert_eq!(months.get("2026-07"), Some(&1));
        assert_eq!(months.get("2026-08"), Some(&1));
    }

    #[test]
    fn test_fund_totals_by_currency() {
        let mk = |currency: &str, cents: i64| FundDonation {
            id: Uuid::new_v4(),
            donor_id: None,
            donor_name: "Anon".to_string(),
            amount_cents: cents,
            currency: currency.to_string(),
            message: None,
            created_at: Utc::now(),
        };

        let totals = fund_totals(&[mk("usd", 500), mk("usd", 1500), mk("inr", 20000)]);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].currency, "inr");
        assert_eq!(totals[0].total_cents, 20000);
        assert_eq!(totals[1].currency, "usd");
        assert_eq!(totals[1].total_cents, 2000);
        assert_eq!(totals[1].count, 2);
    }
}
