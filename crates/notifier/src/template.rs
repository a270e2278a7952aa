//! Announcement email rendering.

use hemolink_common::types::{Campaign, TargetGroups};

/// Render the announcement email for a campaign.
///
/// Returns `(subject, html)`. All interpolated values are HTML-escaped.
pub fn render_announcement(campaign: &Campaign, message: &str) -> (String, String) {
    let subject = format!("Blood drive: {}", campaign.title);

    let targets = TargetGroups::from_value(&campaign.target_blood_groups);
    let groups_line = if targets.is_broadcast() {
        "all blood groups".to_string()
    } else {
        targets
            .0
            .iter()
            .map(|g| g.label())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let html = format!(
        "<h2>{title}</h2>\
         <p>{message}</p>\
         <p><strong>Where:</strong> {venue}, {city}<br>\
         <strong>When:</strong> {starts} &ndash; {ends}<br>\
         <strong>Needed:</strong> {groups}</p>\
         <p>{description}</p>",
        title = escape(&campaign.title),
        message = escape(message),
        venue = escape(&campaign.venue),
        city = escape(&campaign.city),
        starts = campaign.starts_at.format("%Y-%m-%d %H:%M UTC"),
        ends = campaign.ends_at.format("%Y-%m-%d %H:%M UTC"),
        groups = groups_line,
        description = escape(&campaign.description),
    );

    (subject, html)
}

/// Minimal HTML escaping for text interpolated into the template.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hemolink_common::types::CampaignStatus;
    use uuid::Uuid;

    fn make_campaign(targets: serde_json::Value) -> Campaign {
        Campaign {
            id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            title: "City Blood Drive".to_string(),
            description: "Quarterly drive".to_string(),
            city: "Pune".to_string(),
            venue: "Community Hall".to_string(),
            target_blood_groups: targets,
            status: CampaignStatus::Approved,
            starts_at: Utc::now(),
            ends_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_contains_campaign_fields() {
        let campaign = make_campaign(serde_json::json!(["o_pos"]));
        let (subject, html) = render_announcement(&campaign, "Please come donate");
        assert_eq!(subject, "Blood drive: City Blood Drive");
        assert!(html.contains("Please come donate"));
        assert!(html.contains("Community Hall"));
        assert!(html.contains("Pune"));
        assert!(html.contains("O+"));
    }

    #[test]
    fn test_render_broadcast_targets() {
        let campaign = make_campaign(serde_json::json!([]));
        let (_, html) = render_announcement(&campaign, "msg");
        assert!(html.contains("all blood groups"));
    }

    #[test]
    fn test_render_escapes_html() {
        let campaign = make_campaign(serde_json::json!([]));
        let (_, html) = render_announcement(&campaign, "<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
