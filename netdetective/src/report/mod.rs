// netdetective/src/report/mod.rs
//
// Report output: plain-text tables, a self-contained HTML page, or JSON for
// downstream consumption. Renderers are pure: AnalysisReport in, String out.

pub mod html;
pub mod text;

use serde_json::{json, Value};

use crate::engine::AnalysisReport;
use crate::events::{EntityProfile, Outcome};

fn outcome_json(o: &Outcome) -> Value {
    json!({
        "succeeded":       o.succeeded,
        "failed":          o.failed,
        "min_time_of_day": o.min_time_of_day,
        "max_time_of_day": o.max_time_of_day,
        "weight":          o.weight,
    })
}

fn profile_json(p: &EntityProfile) -> Value {
    let endpoints: Vec<Value> = p.endpoints_sorted().into_iter()
        .map(|(ep, o)| {
            let mut v = outcome_json(o);
            v["method"] = json!(ep.method);
            v["path"]   = json!(ep.path);
            v
        })
        .collect();
    let weekdays: Vec<Value> = p.weekdays_sorted().into_iter()
        .map(|(day, o)| {
            let mut v = outcome_json(o);
            v["weekday"] = json!(day);
            v
        })
        .collect();
    json!({
        "total_weight": p.total_weight(),
        "endpoints":    endpoints,
        "weekdays":     weekdays,
    })
}

/// Serialize the full report.
pub fn to_json(report: &AnalysisReport) -> String {
    let profiles: serde_json::Map<String, Value> = report.profiles.iter()
        .map(|(addr, p)| (addr.clone(), profile_json(p)))
        .collect();

    json!({
        "span": report.span.map(|(start, end)| json!({ "start": start, "end": end })),
        "bucket_width_secs":   report.bucket_width_secs,
        "ordering":            report.ordering.map(|o| json!({
            "reference": o.reference,
            "wraps":     o.wraps,
        })),
        "total_requests":      report.total_requests,
        "total_failed_logins": report.total_failed_logins,
        "sources":             report.sources,
        "spikes":              report.spikes,
        "cyclic_gaps":         report.cyclic_gaps,
        "absolute_gaps":       report.absolute_gaps,
        "profiles":            profiles,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::engine::analyze;
    use crate::ingest;

    #[test]
    fn test_json_contains_every_section() {
        let store = ingest::parse_str("\
2024-01-01T08:00:00,10.0.0.1,POST /login,401
2024-01-01T09:00:00,10.0.0.2,POST /login,200
").unwrap();
        let report = analyze(&store, &AnalysisConfig::default());
        let v: Value = serde_json::from_str(&to_json(&report)).unwrap();

        assert_eq!(v["total_requests"], 2);
        assert_eq!(v["total_failed_logins"], 1);
        assert_eq!(v["sources"][0]["address"], "10.0.0.1");
        assert_eq!(v["spikes"].as_array().unwrap().len(), 3);
        assert_eq!(v["absolute_gaps"][0]["elapsed_ms"], 3_600_000);
        assert_eq!(v["ordering"]["reference"], "Mon");
        assert_eq!(v["ordering"]["wraps"], false);

        let login = &v["profiles"]["10.0.0.1"]["endpoints"][0];
        assert_eq!(login["path"], "/login");
        assert_eq!(login["weight"], -1);
        assert_eq!(v["profiles"]["10.0.0.1"]["weekdays"][0]["weekday"], "Mon");
    }

    #[test]
    fn test_json_empty_report() {
        let v: Value = serde_json::from_str(&to_json(&AnalysisReport::default())).unwrap();
        assert!(v["span"].is_null());
        assert_eq!(v["total_requests"], 0);
        assert!(v["spikes"].as_array().unwrap().is_empty());
    }
}
