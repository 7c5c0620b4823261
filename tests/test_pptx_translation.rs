//! End-to-end PPTX translation.

mod common;

use common::{pptx, pptx_picture, pptx_shape, pptx_slide, zip_entries, zip_entry, zip_names, FakeTranslator};
use doc_oxide::{translate_bytes, DocumentCodec, Error, PptxDocument, TargetLanguage, TranslateConfig};

fn translate(input: &[u8], translator: &FakeTranslator) -> doc_oxide::TranslatedDocument {
    translate_bytes("deck.pptx", input, &TargetLanguage::Japanese, translator, &TranslateConfig::default()).unwrap()
}

#[test]
fn test_slides_and_shapes_are_translated_in_order() {
    let slides = vec![
        pptx_slide(&format!("{}{}", pptx_shape(2, &["Title"]), pptx_shape(3, &["Body text"]))),
        pptx_slide(&pptx_picture(4)),
    ];
    let input = pptx(&slides, &[1, 2]);
    let translator = FakeTranslator::new(&[("Title", "タイトル"), ("Body text", "本文")]);

    let output = translate(&input, &translator);
    assert_eq!(translator.received(), vec!["Title", "Body text"]);
    assert_eq!(output.file_name, "translated_deck.pptx");
    assert_eq!(
        output.media_type,
        "application/vnd.openxmlformats-officedocument.presentationml.presentation"
    );
    assert_eq!(output.stats.units_translated, 2);
    assert_eq!(output.stats.containers, 2);

    let deck = PptxDocument::open(&output.bytes).unwrap();
    assert_eq!(deck.shape_texts(), vec![vec!["タイトル".to_string(), "本文".to_string()], vec![]]);

    // The picture-only slide is never rewritten.
    assert_eq!(
        zip_entry(&output.bytes, "ppt/slides/slide2.xml"),
        zip_entry(&input, "ppt/slides/slide2.xml")
    );
    assert_eq!(zip_names(&output.bytes), zip_names(&input));
}

#[test]
fn test_presentation_order_follows_slide_list() {
    let slides = vec![pptx_slide(&pptx_shape(2, &["File one"])), pptx_slide(&pptx_shape(2, &["File two"]))];
    let input = pptx(&slides, &[2, 1]);
    let translator = FakeTranslator::default();

    let deck = PptxDocument::open(&input).unwrap();
    assert_eq!(deck.slide_parts(), vec!["ppt/slides/slide2.xml", "ppt/slides/slide1.xml"]);

    translate(&input, &translator);
    assert_eq!(translator.received(), vec!["File two", "File one"]);
}

#[test]
fn test_slide_list_fallback_uses_numeric_order() {
    let slide = |text: &str| pptx_slide(&pptx_shape(2, &[text]));
    let presentation = r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#;
    let input = zip_entries(&[
        ("ppt/presentation.xml", presentation.to_string()),
        ("ppt/slides/slide10.xml", slide("Ten")),
        ("ppt/slides/slide2.xml", slide("Two")),
        ("ppt/slides/slide1.xml", slide("One")),
    ]);

    let deck = PptxDocument::open(&input).unwrap();
    assert_eq!(
        deck.slide_parts(),
        vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml", "ppt/slides/slide10.xml"]
    );
}

#[test]
fn test_grouped_shapes_are_translated() {
    let group = format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="5" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}{}</p:grpSp>"#,
        pptx_shape(6, &["Inside"]),
        pptx_picture(7)
    );
    let input = pptx(&[pptx_slide(&format!("{}{}", pptx_shape(2, &["Outside"]), group))], &[1]);
    let translator = FakeTranslator::default();

    let output = translate(&input, &translator);
    assert_eq!(translator.received(), vec!["Outside", "Inside"]);

    let deck = PptxDocument::open(&output.bytes).unwrap();
    assert_eq!(deck.shape_texts(), vec![vec!["[ja] Outside".to_string(), "[ja] Inside".to_string()]]);
}

#[test]
fn test_multi_paragraph_shape_is_one_call() {
    let input = pptx(&[pptx_slide(&pptx_shape(2, &["First point", "Second point"]))], &[1]);
    let translator = FakeTranslator::new(&[("First point\nSecond point", "第一点\n第二点")]);

    let output = translate(&input, &translator);
    assert_eq!(translator.call_count(), 1);

    let xml = String::from_utf8(zip_entry(&output.bytes, "ppt/slides/slide1.xml").unwrap()).unwrap();
    assert_eq!(xml.matches("<a:p>").count(), 2, "{}", xml);
    assert_eq!(xml.matches(r#"<a:rPr lang="en-US" sz="2400"/>"#).count(), 2, "{}", xml);
    assert!(xml.contains("<a:t>第一点</a:t>"), "{}", xml);
    assert!(xml.contains("<a:t>第二点</a:t>"), "{}", xml);
}

#[test]
fn test_empty_shapes_are_skipped() {
    let input = pptx(&[pptx_slide(&format!("{}{}", pptx_shape(2, &[""]), pptx_shape(3, &["Kept"])))], &[1]);
    let translator = FakeTranslator::default();

    let output = translate(&input, &translator);
    assert_eq!(translator.received(), vec!["Kept"]);
    assert_eq!(output.stats.units_skipped, 1);
}

#[test]
fn test_missing_presentation_is_malformed() {
    let input = zip_entries(&[("ppt/slides/slide1.xml", pptx_slide(&pptx_shape(2, &["Orphan"])))]);
    let translator = FakeTranslator::default();
    let err = translate_bytes("orphan.pptx", &input, &TargetLanguage::Korean, &translator, &TranslateConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::MalformedContainer { format: "pptx", .. }), "got {:?}", err);
    assert_eq!(translator.call_count(), 0);
}

#[test]
fn test_round_trip_without_translation() {
    let input = pptx(&[pptx_slide(&pptx_shape(2, &["One", "Two"])), pptx_slide("")], &[1, 2]);
    let bytes = PptxDocument::open(&input).unwrap().serialize().unwrap();

    let reopened = PptxDocument::open(&bytes).unwrap();
    assert_eq!(reopened.slide_count(), 2);
    assert_eq!(reopened.shape_texts(), vec![vec!["One\nTwo".to_string()], vec![]]);
    for name in zip_names(&input) {
        assert_eq!(zip_entry(&bytes, &name), zip_entry(&input, &name), "{} changed", name);
    }
}
