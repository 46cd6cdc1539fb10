// netdetective/src/report/html.rs
//
// Single self-contained HTML page. Each section is a collapsible table;
// all log-derived text is escaped.

use std::fmt::{self, Display, Formatter};

use crate::engine::AnalysisReport;
use crate::events::{clock, format_span, format_span_ms};

use super::text::rounding_label;

const SCRIPT: &str = "\
<script>
function toggleSection(id) {
  var x = document.getElementById(id);
  x.style.display = (x.style.display === 'none') ? 'block' : 'none';
}
</script>";

const STYLE: &str = "\
<style>
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; }
th, td { border: 1px solid #999; padding: 2px 8px; text-align: left; }
h2 a { cursor: pointer; text-decoration: underline; }
</style>";

/// Escape text for element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _    => out.push(c),
        }
    }
    out
}

fn open_section(f: &mut Formatter<'_>, id: &str, title: &str, headers: &[&str]) -> fmt::Result {
    writeln!(
        f,
        "<h2><a onclick=\"toggleSection('{id}')\">{}</a></h2>\n<div id=\"{id}\">\n<table>",
        escape(title)
    )?;
    write!(f, "<tr>")?;
    for h in headers {
        write!(f, "<th>{}</th>", escape(h))?;
    }
    writeln!(f, "</tr>")
}

fn close_section(f: &mut Formatter<'_>) -> fmt::Result {
    writeln!(f, "</table>\n</div>")
}

fn row(f: &mut Formatter<'_>, cells: &[String]) -> fmt::Result {
    write!(f, "<tr>")?;
    for c in cells {
        write!(f, "<td>{}</td>", escape(c))?;
    }
    writeln!(f, "</tr>")
}

pub struct HtmlReport<'a>(pub &'a AnalysisReport);

impl Display for HtmlReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let r = self.0;

        writeln!(f, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">")?;
        writeln!(f, "<title>Network Log Analysis Report</title>\n{}\n</head>\n<body>", STYLE)?;
        writeln!(f, "<h1>Network Traffic Analysis</h1>")?;

        let Some((start, end)) = r.span else {
            writeln!(f, "<p>No traffic to analyze.</p>")?;
            return writeln!(f, "</body>\n</html>");
        };
        writeln!(f, "<p>Data spans {} to {}</p>", escape(&start.to_string()), escape(&end.to_string()))?;
        writeln!(f, "<p>Total Requests: {}<br>Total Failed Logins: {}</p>", r.total_requests, r.total_failed_logins)?;

        open_section(f, "sources", "Activity By Source", &["Source", "Requests", "Failed", "Failed Logins"])?;
        for s in &r.sources {
            row(f, &[s.address.clone(), s.requests.to_string(), s.failed.to_string(), s.failed_logins.to_string()])?;
        }
        close_section(f)?;

        open_section(f, "unusual", "Unusual Activity", &["Source", "Requests", "Failed Logins", "Status Code Counts"])?;
        for s in r.sources.iter().filter(|s| s.unusual) {
            let counts = s.status_counts.iter()
                .map(|(code, n)| format!("{}: {}", code, n))
                .collect::<Vec<_>>()
                .join(", ");
            row(f, &[s.address.clone(), s.requests.to_string(), s.failed_logins.to_string(), counts])?;
        }
        close_section(f)?;

        open_section(f, "spikes", "Top Activity Spikes", &["Start", "End", "Spans", "Requests", "Days", "Rq/S/Day"])?;
        for s in &r.spikes {
            row(f, &[
                s.start.to_string(),
                s.end.to_string(),
                format_span(s.span_secs),
                s.total_requests.to_string(),
                s.observed_days.to_string(),
                format!("{:.6}", s.avg_rps_per_day),
            ])?;
        }
        close_section(f)?;
        writeln!(f, "<p><small>Data timestamps rounded to {} intervals.</small></p>", rounding_label(r.bucket_width_secs))?;

        open_section(f, "quiet", "Recurring Quiet Windows", &["Start", "End", "Spans"])?;
        for g in &r.cyclic_gaps {
            row(f, &[g.start.to_string(), g.end.to_string(), format_span(g.span_secs)])?;
        }
        close_section(f)?;

        open_section(f, "gaps", "Top Activity Gaps", &["Start", "End", "Duration"])?;
        for g in &r.absolute_gaps {
            row(f, &[g.start.to_string(), g.end.to_string(), format_span_ms(g.elapsed_ms)])?;
        }
        close_section(f)?;

        open_section(f, "weights", "Endpoint Weights", &["Source", "Endpoint", "Succeeded", "Failed", "Seen", "Weight"])?;
        for (addr, profile) in &r.profiles {
            for (ep, o) in profile.endpoints_sorted() {
                row(f, &[
                    addr.clone(),
                    ep.to_string(),
                    o.succeeded.to_string(),
                    o.failed.to_string(),
                    format!("{}-{}", clock(o.min_time_of_day), clock(o.max_time_of_day)),
                    o.weight.to_string(),
                ])?;
            }
        }
        close_section(f)?;

        writeln!(f, "{}\n</body>\n</html>", SCRIPT)
    }
}

pub fn render_html(report: &AnalysisReport) -> String {
    HtmlReport(report).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::engine::analyze;
    use crate::ingest;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape("/plain/path"), "/plain/path");
    }

    #[test]
    fn test_log_text_is_escaped() {
        let store = ingest::parse_str(
            "2024-01-01T08:00:00,<script>alert(1)</script>,GET /<b>,500\n"
        ).unwrap();
        let html = render_html(&analyze(&store, &AnalysisConfig::default()));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("GET /&lt;b&gt;"));
    }

    #[test]
    fn test_unusual_table_lists_flagged_sources_only() {
        let store = ingest::parse_str("\
2024-01-01T08:00:00,10.0.0.1,POST /login,401
2024-01-01T08:00:01,10.0.0.1,POST /login,200
2024-01-01T08:10:00,10.0.0.2,GET /,200
").unwrap();
        let html = render_html(&analyze(&store, &AnalysisConfig::default()));

        let unusual = &html[html.find("id=\"unusual\"").unwrap()..];
        let unusual = &unusual[..unusual.find("</table>").unwrap()];
        assert!(unusual.contains("10.0.0.1"));
        assert!(unusual.contains("200: 1, 401: 1"));
        assert!(!unusual.contains("10.0.0.2"));

        for id in ["sources", "spikes", "quiet", "gaps", "weights"] {
            assert!(html.contains(&format!("toggleSection('{}')", id)));
        }
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_empty_report() {
        let html = render_html(&AnalysisReport::default());
        assert!(html.contains("No traffic to analyze."));
        assert!(!html.contains("<table>"));
    }
}
