use crate::model::*;

/// Bubble fills, cycled by placement index.
pub const PALETTE: [&str; 3] = ["#087579", "#009EA8", "#25B9C1"];
const PALETTE_RGB: [(u8, u8, u8); 3] = [(0x08, 0x75, 0x79), (0x00, 0x9E, 0xA8), (0x25, 0xB9, 0xC1)];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

pub fn palette_rgb(index: usize) -> (u8, u8, u8) {
    PALETTE_RGB[index % PALETTE_RGB.len()]
}

pub fn to_csv(layout: &Layout, mut w: impl std::io::Write) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record(["label", "radius", "center_x", "center_y"])?;
    for c in &layout.circles {
        writer.write_record([
            c.label.clone(),
            c.radius.to_string(),
            c.center_x.to_string(),
            c.center_y.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_json(layout: &Layout) -> serde_json::Value {
    serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "container": { "width": layout.container.width, "height": layout.container.height },
        "circles": layout.circles.iter().enumerate().map(|(i, c)| serde_json::json!({
            "label": c.label,
            "radius": c.radius,
            "center_x": c.center_x,
            "center_y": c.center_y,
            "color": palette_color(i),
        })).collect::<Vec<_>>(),
        "dropped": layout.dropped.iter().map(|d| serde_json::json!({
            "label": d.label,
            "radius": d.radius,
        })).collect::<Vec<_>>()
    })
}

/// Renders the layout as SVG. Layout Y grows upward, so it is flipped here.
pub fn to_svg(layout: &Layout) -> String {
    let width = layout.container.width;
    let height = layout.container.height;
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    for (i, c) in layout.circles.iter().enumerate() {
        let cy = height - c.center_y;
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
            c.center_x,
            cy,
            c.radius,
            palette_color(i)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"sans-serif\" font-size=\"14\" fill=\"#ffffff\">{}</text>",
            c.center_x,
            cy,
            escape_xml(&c.label)
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// One page the size of the container (1 px = 0.75 pt), a filled disc and label per bubble.
pub fn to_pdf(layout: &Layout, out: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    use printpdf::*;
    const PT_PER_PX: f32 = 0.75;
    const FONT_PT: f32 = 10.0;
    let px = |v: f64| Pt(v as f32 * PT_PER_PX);

    let page_w: Mm = px(layout.container.width.max(1.0)).into();
    let page_h: Mm = px(layout.container.height.max(1.0)).into();
    let (doc, page1, layer1) = PdfDocument::new("Topic Bubbles", page_w, page_h, "Bubbles");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    for (i, c) in layout.circles.iter().enumerate() {
        let (r, g, b) = palette_rgb(i);
        layer.set_fill_color(Color::Rgb(Rgb::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            None,
        )));
        let ring = utils::calculate_points_for_circle(px(c.radius), px(c.center_x), px(c.center_y));
        layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: path::PaintMode::Fill,
            winding_order: path::WindingOrder::NonZero,
        });

        layer.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
        // Helvetica averages about half an em per glyph
        let half_text = c.label.chars().count() as f32 * FONT_PT * 0.25;
        let x: Mm = Pt(px(c.center_x).0 - half_text).into();
        let y: Mm = Pt(px(c.center_y).0 - FONT_PT / 3.0).into();
        layer.use_text(c.label.as_str(), FONT_PT, x, y, &font);
    }

    let file = std::fs::File::create(out)?;
    let mut buf = std::io::BufWriter::new(file);
    doc.save(&mut buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Layout {
        Layout {
            container: ContainerSize::new(400.0, 300.0),
            circles: vec![
                PlacedCircle { label: "Contract".into(), radius: 100.0, center_x: 100.0, center_y: 100.0 },
                PlacedCircle { label: "Q&A".into(), radius: 56.0, center_x: 256.0, center_y: 56.0 },
            ],
            dropped: vec![DroppedItem { label: "Injury".into(), radius: 56.0 }],
        }
    }

    #[test]
    fn csv_has_one_row_per_circle() {
        let mut out = Vec::new();
        to_csv(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "label,radius,center_x,center_y");
        assert_eq!(lines[1], "Contract,100,100,100");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn json_reports_colors_and_dropped() {
        let v = to_json(&sample());
        assert_eq!(v["circles"][0]["color"], "#087579");
        assert_eq!(v["circles"][1]["color"], "#009EA8");
        assert_eq!(v["dropped"][0]["label"], "Injury");
        assert_eq!(v["container"]["width"], 400.0);
        assert!(v["generated_at"].is_string());
    }

    #[test]
    fn svg_flips_y_and_escapes_labels() {
        let svg = to_svg(&sample());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<circle cx=\"100.00\" cy=\"200.00\" r=\"100.00\""));
        assert!(svg.contains("Q&amp;A"));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn pdf_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bubbles.pdf");
        to_pdf(&sample(), &out).unwrap();
        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(palette_color(3), palette_color(0));
        assert_eq!(palette_rgb(1), (0x00, 0x9E, 0xA8));
    }
}
