use super::document::{Block, Cell, Document, Span, Table, TableStyle, Tone};

/// Delay before the page opens the print dialog.
pub const PRINT_DELAY_MS: u64 = 800;
/// Delay after printing before the window closes itself.
pub const CLOSE_DELAY_MS: u64 = 500;

/// Render a report document as a self-contained A4 page that prints
/// itself once loaded.
pub fn render_printable(doc: &Document) -> String {
    let meta: String = doc
        .meta
        .iter()
        .map(|m| format!(r#"<div class="report-meta">{}</div>"#, html_escape(m)))
        .collect();
    let metrics: String = doc
        .metrics
        .iter()
        .map(|m| {
            format!(
                r#"<div class="metric-item"><div class="metric-value">{}</div><div class="metric-label">{}</div></div>"#,
                html_escape(&m.value),
                html_escape(m.label),
            )
        })
        .collect();
    let sections: String = doc
        .sections
        .iter()
        .map(|s| {
            let body: String = s.blocks.iter().map(render_block).collect();
            format!(
                r#"<div class="section"><div class="section-title">{}</div>{body}</div>"#,
                html_escape(s.title)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{ font-family: 'Times New Roman', serif; font-size: 10px; line-height: 1.3; color: #000; background: white; }}
.page-container {{ min-width: 210mm; max-width: 210mm; margin: 0 auto; }}
@page {{ size: A4; }}
@media print {{
  body {{ -webkit-print-color-adjust: exact; color-adjust: exact; }}
  .no-print {{ display: none; }}
}}
.report-header {{ text-align: center; border-bottom: 2px solid #000; padding: 8px 0; margin-bottom: 12px; }}
.report-title {{ font-size: 16px; font-weight: bold; margin-bottom: 4px; text-transform: uppercase; letter-spacing: 1px; }}
.report-subtitle {{ font-size: 11px; margin-bottom: 2px; }}
.report-meta {{ font-size: 8px; font-style: italic; }}
.metrics-row {{ display: flex; justify-content: space-between; margin: 10px 0; border: 1px solid #000; padding: 8px; }}
.metric-item {{ text-align: center; flex: 1; border-right: 1px solid #000; padding: 0 8px; }}
.metric-item:last-child {{ border-right: none; }}
.metric-value {{ font-size: 14px; font-weight: bold; margin-bottom: 2px; }}
.metric-label {{ font-size: 8px; text-transform: uppercase; font-weight: bold; }}
.section {{ margin-bottom: 12px; padding: 0 5px; }}
.section-title {{ font-size: 11px; font-weight: bold; text-transform: uppercase; margin-bottom: 6px; border-bottom: 1px solid #000; padding-bottom: 2px; }}
.summary-text {{ border: 1px solid #000; padding: 10px; font-size: 9px; line-height: 1.4; text-align: justify; }}
table {{ width: 100%; border-collapse: collapse; margin: 6px 0; font-size: 9px; }}
.data-table th, .data-table td {{ border: 1px solid #000; padding: 6px 8px; text-align: left; }}
.data-table th {{ background: #f5f5f5; font-size: 8px; text-transform: uppercase; }}
.coverage-table th, .coverage-table td {{ border: 1px solid #000; padding: 8px; text-align: center; }}
.coverage-table th {{ background: #e5e5e5; text-transform: uppercase; }}
.coverage-table .land-type {{ text-align: left; font-weight: bold; }}
.impact-table th, .impact-table td {{ border: 1px solid #ccc; padding: 6px 8px; text-align: left; }}
.impact-table th {{ background: #f0f0f0; font-size: 8px; text-transform: uppercase; }}
.impact-table tr:nth-child(even) {{ background: #f9f9f9; }}
.change-negative {{ font-weight: bold; color: #b91c1c; }}
.change-positive {{ font-weight: bold; color: #15803d; }}
.forest-color {{ color: #10b981; font-weight: bold; }}
.barren-color {{ color: #f97316; font-weight: bold; }}
.urban-color {{ color: #ef4444; font-weight: bold; }}
</style>
</head>
<body>
<div class="page-container">
  <div class="report-header">
    <div class="report-title">{title}</div>
    <div class="report-subtitle">{subtitle}</div>
    {meta}
  </div>
  <div class="metrics-row">{metrics}</div>
  {sections}
</div>
<script>
window.onload = function() {{
  setTimeout(function() {{
    window.print();
    setTimeout(function() {{ window.close(); }}, {close_delay});
  }}, {print_delay});
}};
</script>
</body>
</html>"#,
        title = html_escape(&doc.title),
        subtitle = html_escape(&doc.subtitle),
        meta = meta,
        metrics = metrics,
        sections = sections,
        print_delay = PRINT_DELAY_MS,
        close_delay = CLOSE_DELAY_MS,
    )
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Paragraph(spans) => {
            let inner: String = spans
                .iter()
                .map(|span| match span {
                    Span::Text(t) => html_escape(t),
                    Span::Strong(t) => format!("<strong>{}</strong>", html_escape(t)),
                })
                .collect();
            format!(r#"<div class="summary-text">{inner}</div>"#)
        }
        Block::Table(table) => render_table(table),
    }
}

fn render_table(table: &Table) -> String {
    let class = match table.style {
        TableStyle::Data => "data-table",
        TableStyle::Coverage => "coverage-table",
        TableStyle::Impact => "impact-table",
    };
    let mut html = format!(r#"<table class="{class}"><thead><tr>"#);
    for h in &table.headers {
        html.push_str(&format!("<th>{}</th>", html_escape(h)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in &row.cells {
            html.push_str(&render_cell(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn render_cell(cell: &Cell) -> String {
    let class = match cell.tone {
        Some(Tone::Negative) => Some("change-negative"),
        Some(Tone::Positive) => Some("change-positive"),
        Some(Tone::Forest) => Some("land-type forest-color"),
        Some(Tone::Barren) => Some("land-type barren-color"),
        Some(Tone::Urban) => Some("land-type urban-color"),
        None => None,
    };
    let mut attrs = String::new();
    if let Some(class) = class {
        attrs.push_str(&format!(r#" class="{class}""#));
    }
    if cell.colspan > 1 {
        attrs.push_str(&format!(r#" colspan="{}""#, cell.colspan));
    }
    let text = html_escape(&cell.text);
    if cell.strong {
        format!("<td{attrs}><strong>{text}</strong></td>")
    } else {
        format!("<td{attrs}>{text}</td>")
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::super::build_document;
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(html_escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn test_render_cell_classes() {
        let cell = Cell::new("Forest Coverage").tone(Tone::Forest);
        assert_eq!(
            render_cell(&cell),
            r#"<td class="land-type forest-color">Forest Coverage</td>"#
        );
        let cell = Cell::new("No data").span(4);
        assert_eq!(render_cell(&cell), r#"<td colspan="4">No data</td>"#);
        let cell = Cell::new("HIGH").strong();
        assert_eq!(render_cell(&cell), "<td><strong>HIGH</strong></td>");
    }

    #[test]
    fn test_full_report() {
        let (ds, dates) = dataset_2020_2025();
        let html = render_printable(&build_document(&input(&ds, &dates)));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<div class="report-title">Deforestation Analysis Report</div>"#));
        assert!(html.contains("Analysis Period: 01/01/2020 to 08/01/2025"));
        assert!(html.contains(r#"<div class="metric-value">-31.4%</div>"#));
        assert!(html.contains(r#"<table class="coverage-table">"#));
        assert!(html.contains(r#"<table class="impact-table">"#));
        assert!(html.contains("Methodology &amp; Data Quality"));
        assert!(html.contains("cloud coverage &lt;10%."));
        assert!(html.contains("<strong>Data Sources:</strong>"));
        assert!(html.contains("}, 800);"));
        assert!(html.contains("window.close(); }, 500);"));
    }

    #[test]
    fn test_section_order_in_markup() {
        let (ds, dates) = dataset_2020_2025();
        let html = render_printable(&build_document(&input(&ds, &dates)));
        let titles = [
            "Executive Summary",
            "Change Detection Summary",
            "Land Coverage Analysis",
            "Annual Trend Analysis",
            "Environmental Impact Assessment",
            "Methodology &amp; Data Quality",
            "Strategic Recommendations",
        ];
        let positions: Vec<usize> = titles
            .iter()
            .map(|t| html.find(&format!(r#"<div class="section-title">{t}</div>"#)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
