use crate::error::RenderError;

/// Convert an SVG document to a single-page PDF.
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, RenderError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Pdf(e.to_string()))?;

    svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), svg2pdf::PageOptions::default())
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

#[test]
fn converts_minimal_svg() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="red"/></svg>"#;
    let pdf = svg_to_pdf(svg).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}
