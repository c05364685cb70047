use std::fmt::Write;

use super::document::{Element, ExportDocument, Page, PageSize, TextAnchor};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn points(points: &[(f32, f32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn element(out: &mut String, element: &Element) {
    // Writing into a String cannot fail.
    let _ = match element {
        Element::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => writeln!(
            out,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="0.2"/>"#,
            x,
            y,
            width,
            height,
            fill.map(|c| c.to_hex()).unwrap_or_else(|| "none".into()),
            stroke.map(|c| c.to_hex()).unwrap_or_else(|| "none".into()),
        ),
        Element::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => writeln!(
            out,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
            x1, y1, x2, y2, color.to_hex(), width
        ),
        Element::Polyline { points: p, color, width } => writeln!(
            out,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{:.2}"/>"#,
            points(p),
            color.to_hex(),
            width
        ),
        Element::Polygon { points: p, fill } => {
            writeln!(out, r#"<polygon points="{}" fill="{}"/>"#, points(p), fill.to_hex())
        }
        Element::Text {
            x,
            y,
            text,
            size,
            color,
            bold,
            anchor,
        } => {
            let anchor = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let weight = if *bold { "bold" } else { "normal" };
            writeln!(
                out,
                r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}" fill="{}" font-weight="{}" text-anchor="{}">{}</text>"#,
                x,
                y,
                size,
                color.to_hex(),
                weight,
                anchor,
                escape(text)
            )
        }
    };
}

/// One page as a standalone SVG sized in millimetres.
pub fn page_to_svg(page: &Page, size: PageSize) -> String {
    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}mm" height="{h}mm" viewBox="0 0 {w} {h}" font-family="Helvetica, Arial, sans-serif">"#,
        w = size.width,
        h = size.height
    );
    out.push('\n');
    out.push_str(&format!(
        r##"<rect x="0" y="0" width="{}" height="{}" fill="#FFFFFF"/>"##,
        size.width, size.height
    ));
    out.push('\n');
    for e in &page.elements {
        element(&mut out, e);
    }
    out.push_str("</svg>\n");
    out
}

/// The whole document as one printable HTML file, one SVG per page.
pub fn document_to_html(document: &ExportDocument) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
@page {{ size: {w}mm {h}mm; margin: 0; }}
body {{ margin: 0; background: #9E9E9E; }}
.page {{ width: {w}mm; height: {h}mm; margin: 8mm auto; background: #FFFFFF; page-break-after: always; }}
.page:last-child {{ page-break-after: auto; }}
@media print {{ body {{ background: none; }} .page {{ margin: 0; }} }}
</style>
</head>
<body>
"#,
        title = escape(&document.title),
        w = document.size.width,
        h = document.size.height,
    );
    for page in &document.pages {
        out.push_str("<div class=\"page\">\n");
        out.push_str(&page_to_svg(page, document.size));
        out.push_str("</div>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}
