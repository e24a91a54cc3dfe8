//! Illustrative hazard alert feed
//!
//! Produces demonstration alerts keyed on words in the location name. The
//! content is not derived from any sensor or warning service and is only meant
//! to populate the alerts panel.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Kind of hazard an alert describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Earthquake,
    Tsunami,
    Landslide,
    Flood,
    Cyclone,
    Wildfire,
    Tornado,
}

impl AlertType {
    pub fn label(&self) -> &'static str {
        match self {
            AlertType::Earthquake => "EARTHQUAKE",
            AlertType::Tsunami => "TSUNAMI",
            AlertType::Landslide => "LANDSLIDE",
            AlertType::Flood => "FLOOD",
            AlertType::Cyclone => "CYCLONE",
            AlertType::Wildfire => "WILDFIRE",
            AlertType::Tornado => "TORNADO",
        }
    }
}

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// A single hazard notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterAlert {
    pub id: String,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub is_active: bool,
}

/// One keyword-triggered rule of the feed
struct Rule {
    keywords: &'static [&'static str],
    /// The rule fires when a uniform draw in [0, 1) exceeds this
    threshold: f64,
    id_prefix: &'static str,
    alert_type: AlertType,
    /// Chance-based escalation: (draw must exceed, escalated severity)
    escalation: Option<(f64, Severity)>,
    severity: Severity,
    title: &'static str,
    description: fn(&str) -> String,
    /// Alerts are backdated by up to this many minutes
    max_age_minutes: i64,
}

const RULES: [Rule; 5] = [
    Rule {
        keywords: &["japan", "california", "turkey", "nepal"],
        threshold: 0.7,
        id_prefix: "eq",
        alert_type: AlertType::Earthquake,
        escalation: Some((0.8, Severity::High)),
        severity: Severity::Medium,
        title: "Seismic Activity Detected",
        description: earthquake_description,
        max_age_minutes: 60,
    },
    Rule {
        keywords: &["coast", "beach", "mumbai", "chennai", "tokyo", "miami"],
        threshold: 0.85,
        id_prefix: "ts",
        alert_type: AlertType::Tsunami,
        escalation: None,
        severity: Severity::Critical,
        title: "Tsunami Watch Issued",
        description: tsunami_description,
        max_age_minutes: 30,
    },
    Rule {
        keywords: &["bengaluru", "mumbai", "kerala", "bangladesh"],
        threshold: 0.6,
        id_prefix: "fl",
        alert_type: AlertType::Flood,
        escalation: Some((0.7, Severity::High)),
        severity: Severity::Medium,
        title: "Flash Flood Warning",
        description: flood_description,
        max_age_minutes: 120,
    },
    Rule {
        keywords: &["bengal", "odisha", "florida", "philippines"],
        threshold: 0.8,
        id_prefix: "cy",
        alert_type: AlertType::Cyclone,
        escalation: None,
        severity: Severity::High,
        title: "Cyclonic Storm Approaching",
        description: cyclone_description,
        max_age_minutes: 180,
    },
    Rule {
        keywords: &["hill", "mountain", "himachal", "uttarakhand"],
        threshold: 0.75,
        id_prefix: "ls",
        alert_type: AlertType::Landslide,
        escalation: None,
        severity: Severity::Medium,
        title: "Landslide Risk Elevated",
        description: landslide_description,
        max_age_minutes: 90,
    },
];

fn earthquake_description(loc: &str) -> String {
    format!("Magnitude 4.2 earthquake detected 45km from {}. Aftershocks possible.", loc)
}

fn tsunami_description(loc: &str) -> String {
    format!(
        "Tsunami warning for coastal areas near {}. Evacuate to higher ground immediately.",
        loc
    )
}

fn flood_description(loc: &str) -> String {
    format!(
        "Heavy rainfall expected. Risk of urban flooding in low-lying areas of {}.",
        loc
    )
}

fn cyclone_description(loc: &str) -> String {
    format!(
        "Severe cyclonic storm moving towards {}. Wind speeds up to 120 km/h expected.",
        loc
    )
}

fn landslide_description(loc: &str) -> String {
    format!(
        "Heavy rainfall has increased landslide risk in hilly areas near {}.",
        loc
    )
}

/// Low-severity notices that may appear anywhere
const BACKGROUND_NOTICES: [(AlertType, &str, &str); 2] = [
    (
        AlertType::Wildfire,
        "Fire Weather Watch",
        "Dry conditions and strong winds increase fire risk.",
    ),
    (
        AlertType::Tornado,
        "Severe Thunderstorm Warning",
        "Conditions favorable for tornado development.",
    ),
];

/// Chance threshold for a background notice
const BACKGROUND_THRESHOLD: f64 = 0.5;

/// Backdating window for background notices, in minutes
const BACKGROUND_MAX_AGE_MINUTES: i64 = 240;

/// Generates the illustrative alerts for `location`, most severe first
pub fn generate_alerts<R: Rng + ?Sized>(
    location: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<DisasterAlert> {
    let needle = location.to_lowercase();
    let stamp = now.timestamp_millis();
    let mut alerts = Vec::new();

    for rule in RULES.iter() {
        if !rule.keywords.iter().any(|k| needle.contains(k)) {
            continue;
        }
        if rng.gen::<f64>() <= rule.threshold {
            continue;
        }

        let severity = match rule.escalation {
            Some((chance, escalated)) if rng.gen::<f64>() > chance => escalated,
            _ => rule.severity,
        };

        alerts.push(DisasterAlert {
            id: format!("{}-{}", rule.id_prefix, stamp),
            alert_type: rule.alert_type,
            severity,
            title: rule.title.to_string(),
            description: (rule.description)(location),
            location: location.to_string(),
            timestamp: backdate(now, rule.max_age_minutes, rng),
            is_active: true,
        });
    }

    if rng.gen::<f64>() > BACKGROUND_THRESHOLD {
        let pick = (rng.gen::<f64>() * BACKGROUND_NOTICES.len() as f64) as usize;
        let (alert_type, title, description) =
            BACKGROUND_NOTICES[pick.min(BACKGROUND_NOTICES.len() - 1)];
        alerts.push(DisasterAlert {
            id: format!("rnd-{}", stamp),
            alert_type,
            severity: Severity::Low,
            title: title.to_string(),
            description: format!("{} Monitoring {} area.", description, location),
            location: location.to_string(),
            timestamp: backdate(now, BACKGROUND_MAX_AGE_MINUTES, rng),
            is_active: true,
        });
    }

    // Stable, so equal severities keep rule order
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
    alerts
}

fn backdate<R: Rng + ?Sized>(now: DateTime<Utc>, max_minutes: i64, rng: &mut R) -> DateTime<Utc> {
    let max_ms = (max_minutes * 60_000) as f64;
    now - Duration::milliseconds((rng.gen::<f64>() * max_ms) as i64)
}
