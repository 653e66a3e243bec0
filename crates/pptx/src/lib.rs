//! PPTX (Office Open XML) backend for template-guided slide generation.
//!
//! [`analyze`] reads a template into the core model, and [`PptxWriter`]
//! writes the assembled slides back into a copy of that template.

pub mod package;
pub mod template;
pub mod writer;

#[cfg(test)]
mod fixtures;

pub use package::{Package, Relationship};
pub use template::{analyze, discover_parts, AnalyzedTemplate, TemplateParts, TemplateReport};
pub use writer::PptxWriter;

use deck_core::{Assembler, Error, GenerationOptions, Result, SlidePlan};

/// Build a presentation from template bytes and a slide plan.
///
/// The returned bytes are a complete `.pptx` package holding one slide per
/// plan entry.
pub fn generate(template: &[u8], plan: &SlidePlan, options: &GenerationOptions) -> Result<Vec<u8>> {
    let package =
        Package::from_bytes(template).map_err(|e| Error::TemplateUnreadable(e.to_string()))?;
    let analyzed = template::analyze_package(&package).map_err(|e| match e {
        Error::TemplateUnreadable(_) => e,
        other => Error::TemplateUnreadable(other.to_string()),
    })?;

    let mut writer = PptxWriter::from_package(package)?;
    let written = Assembler::new(&analyzed.structure, &analyzed.pool)
        .with_options(options.clone())
        .with_theme_font(analyzed.theme_font.clone())
        .assemble(plan, &mut writer)?;
    log::debug!("generated {} slides", written);

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TemplateBuilder;
    use deck_core::SlideContentRequest;

    #[test]
    fn test_generate_full_deck() {
        let plan = SlidePlan::new(vec![
            SlideContentRequest::new("Quarterly Review")
                .with_subtitle("Q3 results")
                .with_hint("title"),
            SlideContentRequest::new("Highlights").with_bullets(["Revenue up", "Costs flat"]),
            SlideContentRequest::new("Team").with_hint("image"),
        ]);
        let bytes = generate(
            &TemplateBuilder::standard().build(),
            &plan,
            &GenerationOptions::default(),
        )
        .unwrap();

        let package = Package::from_bytes(&bytes).unwrap();
        for n in 1..=3 {
            assert!(package.contains(&format!("ppt/slides/slide{}.xml", n)));
        }
        let cover = package.part_text("ppt/slides/slide1.xml").unwrap();
        assert!(cover.contains(r#"<p:ph type="ctrTitle"/>"#));
        assert!(cover.contains("<a:t>Q3 results</a:t>"));
        assert!(cover.contains(r#"typeface="Georgia""#));

        let reread = analyze(&bytes).unwrap();
        assert_eq!(reread.pool.len(), 1);
        assert_eq!(reread.theme_font.as_deref(), Some("Georgia"));
    }

    #[test]
    fn test_generate_empty_plan() {
        let bytes = generate(
            &TemplateBuilder::standard().build(),
            &SlidePlan::default(),
            &GenerationOptions::default(),
        )
        .unwrap();
        let package = Package::from_bytes(&bytes).unwrap();
        assert!(!package.part_names().any(|n| n.starts_with("ppt/slides/")));
        assert!(!package
            .part_text("ppt/presentation.xml")
            .unwrap()
            .contains("sldIdLst"));
    }
}
