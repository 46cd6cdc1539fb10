// netdetective/src/report/text.rs
//
// Fixed-width terminal report.

use std::fmt::{self, Display, Formatter};

use crate::engine::AnalysisReport;
use crate::events::{clock, format_span, format_span_ms};

const RULE_TS: &str = "-------------------------";

fn heading(f: &mut Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "=".repeat(title.chars().count()))
}

/// Footnote describing the bucket width, e.g. "5 minute" or "90 second".
pub fn rounding_label(width_secs: u32) -> String {
    if width_secs % 60 == 0 {
        format!("{} minute", width_secs / 60)
    } else {
        format!("{} second", width_secs)
    }
}

pub struct TextReport<'a>(pub &'a AnalysisReport);

impl Display for TextReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let r = self.0;

        writeln!(f, "========================")?;
        writeln!(f, "Network Traffic Analysis")?;
        writeln!(f, "========================")?;
        writeln!(f)?;

        let Some((start, end)) = r.span else {
            return writeln!(f, "No traffic to analyze.");
        };
        writeln!(f, "Data spans {} to {}", start, end)?;
        writeln!(f, "Total Requests: {}", r.total_requests)?;
        writeln!(f, "Total Failed Logins: {}", r.total_failed_logins)?;

        heading(f, "Activity By Source")?;
        writeln!(f, "{:<39}  {:>9}  {:>7}  {:>14}", "Source", "#Requests", "#Failed", "#Failed Logins")?;
        writeln!(f, "{:-<39}  {:->9}  {:->7}  {:->14}", "", "", "", "")?;
        for s in &r.sources {
            writeln!(f, "{:<39}  {:>9}  {:>7}  {:>14}", s.address, s.requests, s.failed, s.failed_logins)?;
        }

        heading(f, "Top Activity Spikes**")?;
        writeln!(f, "{:<12}  {:<12}  {:>10}  {:>8}  {:>4}  {:>12}", "Start", "End", "Spans", "#Rqs", "Days", "Rq/S/Day")?;
        writeln!(f, "{:-<12}  {:-<12}  {:->10}  {:->8}  {:->4}  {:->12}", "", "", "", "", "", "")?;
        for s in &r.spikes {
            writeln!(
                f, "{:<12}  {:<12}  {:>10}  {:>8}  {:>4}  {:>12.6}",
                s.start.to_string(), s.end.to_string(), format_span(s.span_secs),
                s.total_requests, s.observed_days, s.avg_rps_per_day
            )?;
        }
        writeln!(f, "** data timestamps rounded to {} intervals", rounding_label(r.bucket_width_secs))?;

        heading(f, "Recurring Quiet Windows")?;
        writeln!(f, "{:<12}  {:<12}  {:>10}", "Start", "End", "Spans")?;
        writeln!(f, "{:-<12}  {:-<12}  {:->10}", "", "", "")?;
        for g in &r.cyclic_gaps {
            writeln!(f, "{:<12}  {:<12}  {:>10}", g.start.to_string(), g.end.to_string(), format_span(g.span_secs))?;
        }

        heading(f, "Top Activity Gaps")?;
        writeln!(f, "{:<25}  {:<25}  {:>10}", "Start", "End", "Duration")?;
        writeln!(f, "{}  {}  {:->10}", RULE_TS, RULE_TS, "")?;
        for g in &r.absolute_gaps {
            writeln!(f, "{:<25}  {:<25}  {:>10}", g.start.to_string(), g.end.to_string(), format_span_ms(g.elapsed_ms))?;
        }

        heading(f, "Endpoint Weights")?;
        for (addr, profile) in &r.profiles {
            writeln!(f, "{}  (total weight {})", addr, profile.total_weight())?;
            for (ep, o) in profile.endpoints_sorted() {
                writeln!(
                    f, "    {:<40}  ok={:<5} fail={:<5} {}-{}  weight={}",
                    ep.to_string(), o.succeeded, o.failed,
                    clock(o.min_time_of_day), clock(o.max_time_of_day), o.weight
                )?;
            }
        }
        Ok(())
    }
}

pub fn render_text(report: &AnalysisReport) -> String {
    TextReport(report).to_string()
}
