//! Dues preview table and its standalone print document.

use std::fmt::Write as _;

use crate::models::{Chapter, DuesStatus, Member};
use crate::utils::html_escape;

use super::dues::StatusStyle;
use super::ordering::sort_for_report;
use super::window::month_name;
use super::ReportFilter;

const PRINT_HEADING: &str = "Brothers of the Highway - Dues Report";

const PRINT_STYLESHEET: &str = "\
body { font-family: Arial, sans-serif; padding: 20px; }
h1 { font-size: 18px; margin-bottom: 5px; }
h2 { font-size: 14px; color: #666; margin-bottom: 20px; }
table { width: 100%; border-collapse: collapse; font-size: 11px; }
th, td { border: 1px solid #333; padding: 4px 6px; text-align: center; }
th { background-color: #1e293b; color: white; }
.member-info { text-align: left; }
@media print {
  body { padding: 10px; }
  table { font-size: 9px; }
}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub member_id: String,
    pub label: String,
    pub chapter: Chapter,
    /// One status per month column.
    pub cells: Vec<DuesStatus>,
}

/// Dues table for one report filter, rows in report order.
#[derive(Debug, Clone)]
pub struct DuesPreview {
    pub filter: ReportFilter,
    pub months: Vec<usize>,
    pub rows: Vec<PreviewRow>,
}

impl DuesPreview {
    pub fn build(members: &[Member], filter: &ReportFilter) -> Self {
        let months = filter.months();
        let year = filter.year_key();
        let rows = sort_for_report(members, &filter.chapter)
            .into_iter()
            .map(|m| PreviewRow {
                cells: months.iter().map(|&i| m.dues_status(&year, i)).collect(),
                label: m.report_label().to_string(),
                member_id: m.id,
                chapter: m.chapter,
            })
            .collect();
        Self { filter: filter.clone(), months, rows }
    }

    pub fn month_headers(&self) -> Vec<&'static str> {
        self.months.iter().map(|&i| month_name(i)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// "Dues Report - Q2 (Apr-Jun) 2024 - HA"
    pub fn title(&self) -> String {
        match self.filter.chapter.chapter() {
            Some(chapter) => format!("Dues Report - {} - {}", self.filter.period_label(), chapter),
            None => format!("Dues Report - {}", self.filter.period_label()),
        }
    }

    /// Print sub-heading, e.g. "Q2 (Apr-Jun) 2024 - HA Chapter".
    pub fn print_subtitle(&self) -> String {
        match self.filter.chapter.chapter() {
            Some(chapter) => format!("{} - {} Chapter", self.filter.period_label(), chapter),
            None => format!("{} - All Chapters", self.filter.period_label()),
        }
    }

    /// "12 members"
    pub fn footer(&self) -> String {
        format!("{} members", self.rows.len())
    }

    /// Count of cells in each status, in `DuesStatus::ALL` order.
    pub fn status_totals(&self) -> [(DuesStatus, usize); 3] {
        DuesStatus::ALL.map(|status| {
            let n = self
                .rows
                .iter()
                .flat_map(|r| r.cells.iter())
                .filter(|c| **c == status)
                .count();
            (status, n)
        })
    }

    /// `dues_report_Q2_2024_HA.html`
    pub fn print_filename(&self) -> String {
        let mut name = String::from("dues_report");
        if let Some(q) = self.filter.quarter.filename_part() {
            name.push('_');
            name.push_str(&q);
        }
        name.push('_');
        name.push_str(&self.filter.year_key());
        if let Some(chapter) = self.filter.chapter.chapter() {
            name.push('_');
            name.push_str(chapter.as_str());
        }
        name.push_str(".html");
        name
    }

    /// Standalone HTML document with embedded styles, ready for a print spooler.
    pub fn to_print_html(&self) -> String {
        let mut html = String::new();
        let _ = writeln!(html, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">");
        let _ = writeln!(html, "<title>Dues Report - {}</title>", html_escape(&self.filter.period_label()));
        let _ = writeln!(html, "<style>\n{}", PRINT_STYLESHEET);
        for status in DuesStatus::ALL {
            let _ = writeln!(html, "{}", StatusStyle::of(status).css_rule());
        }
        let _ = writeln!(html, "</style>\n</head>\n<body>");
        let _ = writeln!(html, "<h1>{}</h1>", PRINT_HEADING);
        let _ = writeln!(html, "<h2>{}</h2>", html_escape(&self.print_subtitle()));

        html.push_str("<table>\n<thead>\n<tr><th>Member</th><th>Chapter</th>");
        for header in self.month_headers() {
            let _ = write!(html, "<th>{}</th>", header);
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");

        for row in &self.rows {
            let _ = write!(
                html,
                "<tr><td class=\"member-info\">{}</td><td>{}</td>",
                html_escape(&row.label),
                html_escape(row.chapter.as_str())
            );
            for status in &row.cells {
                let style = StatusStyle::of(*status);
                let _ = write!(html, "<td class=\"{}\">{}</td>", style.css_class, style.glyph);
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChapterFilter;
    use crate::reports::QuarterSelector;

    fn members() -> Vec<Member> {
        serde_json::from_str(
            r#"[
            {"id":"1","handle":"Wrench","name":"W","chapter":"HS","dues":{"2024":[true,true,true,{"status":"late"},false,true]}},
            {"id":"2","handle":"","name":"Ghost Rider","chapter":"National","dues":{"2024":[true,true,true,true]}},
            {"id":"3","handle":"Axle","name":"A","chapter":"AD","dues":{}}
        ]"#,
        )
        .expect("Failed to parse preview test JSON")
    }

    fn q2_2024(chapter: ChapterFilter) -> ReportFilter {
        ReportFilter { year: 2024, quarter: QuarterSelector::Q2, chapter }
    }

    #[test]
    fn test_preview_columns_and_cells() {
        let preview = DuesPreview::build(&members(), &q2_2024(ChapterFilter::All));
        assert_eq!(preview.month_headers(), vec!["Apr", "May", "Jun"]);

        let labels: Vec<&str> = preview.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Ghost Rider", "Axle", "Wrench"]);

        let wrench = &preview.rows[2];
        assert_eq!(wrench.cells, vec![DuesStatus::Late, DuesStatus::Unpaid, DuesStatus::Paid]);
        assert_eq!(StatusStyle::of(wrench.cells[0]).glyph, "L");

        // Short month list: May and June are unpaid
        assert_eq!(preview.rows[0].cells, vec![DuesStatus::Paid, DuesStatus::Unpaid, DuesStatus::Unpaid]);
        assert_eq!(preview.footer(), "3 members");
    }

    #[test]
    fn test_titles() {
        let all = DuesPreview::build(&members(), &q2_2024(ChapterFilter::All));
        assert_eq!(all.title(), "Dues Report - Q2 (Apr-Jun) 2024");
        assert_eq!(all.print_subtitle(), "Q2 (Apr-Jun) 2024 - All Chapters");

        let hs = DuesPreview::build(&members(), &q2_2024(ChapterFilter::Only(Chapter::Hs)));
        assert_eq!(hs.title(), "Dues Report - Q2 (Apr-Jun) 2024 - HS");
        assert_eq!(hs.print_subtitle(), "Q2 (Apr-Jun) 2024 - HS Chapter");
        assert_eq!(hs.rows.len(), 1);
        assert_eq!(hs.print_filename(), "dues_report_Q2_2024_HS.html");

        let year = ReportFilter { year: 2023, quarter: QuarterSelector::All, chapter: ChapterFilter::All };
        let full = DuesPreview::build(&members(), &year);
        assert_eq!(full.print_subtitle(), "Full Year 2023 - All Chapters");
        assert_eq!(full.months.len(), 12);
        assert_eq!(full.print_filename(), "dues_report_2023.html");
    }

    #[test]
    fn test_print_document() {
        let preview = DuesPreview::build(&members(), &q2_2024(ChapterFilter::All));
        let html = preview.to_print_html();
        assert!(html.contains("<h1>Brothers of the Highway - Dues Report</h1>"));
        assert!(html.contains("<h2>Q2 (Apr-Jun) 2024 - All Chapters</h2>"));
        assert!(html.contains(".paid { background-color: #dcfce7; color: #166534; }"));
        assert!(html.contains("<td class=\"late\">L</td>"));
        assert!(html.contains("<th>Apr</th><th>May</th><th>Jun</th>"));
        assert_eq!(html.matches("<tr><td class=\"member-info\">").count(), 3);
    }

    #[test]
    fn test_empty_preview() {
        let preview = DuesPreview::build(&[], &q2_2024(ChapterFilter::All));
        assert!(preview.is_empty());
        assert_eq!(preview.footer(), "0 members");
        assert_eq!(preview.status_totals()[0], (DuesStatus::Paid, 0));
    }
}
