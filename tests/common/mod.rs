//! Shared fixtures: documents built in memory and fake translators.

#![allow(dead_code)]

use doc_oxide::{Error, Result, TargetLanguage, Translator};
use lopdf::{dictionary, encryption, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

// ---------------------------------------------------------------------------
// Translators
// ---------------------------------------------------------------------------

/// Looks texts up in a table; unknown texts get a `[code]` prefix.
/// Records every call.
#[derive(Default)]
pub struct FakeTranslator {
    table: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTranslator {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            table: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn received(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Translator for FakeTranslator {
    fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{}] {}", target.code(), text)))
    }
}

/// Fails on the `fail_on`-th call (1-based), echoes before that.
pub struct FailingTranslator {
    fail_on: usize,
    calls: AtomicUsize,
}

impl FailingTranslator {
    pub fn always() -> Self {
        Self::on_call(1)
    }

    pub fn on_call(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Translator for FailingTranslator {
    fn translate(&self, text: &str, _: &TargetLanguage) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.fail_on {
            Err(Error::TranslationFailure("service unavailable".to_string()))
        } else {
            Ok(text.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

/// A Letter-size PDF with one page per content string. `/F1` is Helvetica,
/// `/F2` is Times-Bold, both inherited from the page tree.
pub fn pdf(pages: &[&str]) -> Vec<u8> {
    let pages: Vec<&[u8]> = pages.iter().map(|content| content.as_bytes()).collect();
    pdf_bytes(&pages)
}

/// Like [`pdf`], for content holding binary data.
pub fn pdf_bytes(pages: &[&[u8]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let times = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Bold",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => helvetica, "F2" => times },
    });

    let mut kids = Vec::new();
    for content in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => resources,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08, 0x2E, 0x2E, 0x00,
    0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// [`pdf`] under 40-bit RC4 (standard handler, revision 2) with an empty
/// user password. Only the owner password protects it.
pub fn encrypted_pdf(pages: &[&str]) -> Vec<u8> {
    encrypt(pages, true)
}

/// [`pdf`] under 40-bit RC4 whose user password is not empty.
pub fn password_protected_pdf(pages: &[&str]) -> Vec<u8> {
    encrypt(pages, false)
}

fn encrypt(pages: &[&str], empty_user_password: bool) -> Vec<u8> {
    let mut doc = Document::load_mem(&pdf(pages)).unwrap();
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1i64,
        "R" => 2i64,
        "Length" => 40i64,
        "P" => -4i64,
        "O" => Object::String(vec![0x4F; 32], StringFormat::Hexadecimal),
    });
    let file_id = Object::string_literal(b"doc-oxide-fixture".to_vec());
    doc.trailer.set("Encrypt", encrypt_id);
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);

    let key = encryption::get_encryption_key(&doc, "", false).unwrap();
    let user_entry = if empty_user_password {
        rc4(&key, &PASSWORD_PADDING)
    } else {
        vec![0u8; 32]
    };
    doc.get_object_mut(encrypt_id)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("U", Object::String(user_entry, StringFormat::Hexadecimal));

    // RC4 is symmetric, so decrypting plaintext encrypts it.
    let streams: Vec<ObjectId> = doc
        .objects
        .iter()
        .filter(|(_, obj)| matches!(obj, Object::Stream(_)))
        .map(|(id, _)| *id)
        .collect();
    for id in streams {
        let cipher = encryption::decrypt_object(&key, id, doc.get_object(id).unwrap()).unwrap();
        if let Ok(Object::Stream(stream)) = doc.get_object_mut(id) {
            stream.set_content(cipher);
        }
    }

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut state: Vec<u8> = (0..=255).collect();
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
        state.swap(i, j as usize);
    }
    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(state[i as usize]);
            state.swap(i as usize, j as usize);
            byte ^ state[state[i as usize].wrapping_add(state[j as usize]) as usize]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Office packages
// ---------------------------------------------------------------------------

/// Zip the given entries, deflated, in order.
pub fn zip_entries(entries: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Read one entry of a zip archive.
pub fn zip_entry(bytes: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).ok()?;
    let mut file = archive.by_name(name).ok()?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).ok()?;
    Some(data)
}

/// Entry names of a zip archive, in order.
pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

pub const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"/></w:styles>"#;

/// A document whose body holds `body_xml`.
pub fn docx(body_xml: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        body_xml
    );
    zip_entries(&[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#.to_string(),
        ),
        ("word/document.xml", document),
        ("word/styles.xml", STYLES_XML.to_string()),
    ])
}

/// A paragraph with one plain run.
pub fn docx_paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
}

/// A text shape holding one paragraph per line.
pub fn pptx_shape(id: u32, lines: &[&str]) -> String {
    let paragraphs: String = lines
        .iter()
        .map(|line| format!(r#"<a:p><a:r><a:rPr lang="en-US" sz="2400"/><a:t>{}</a:t></a:r></a:p>"#, line))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Shape {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

/// A picture shape, which carries no text.
pub fn pptx_picture(id: u32) -> String {
    format!(r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/><p:spPr/></p:pic>"#)
}

/// A slide whose shape tree holds `shapes_xml`.
pub fn pptx_slide(shapes_xml: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
        shapes_xml
    )
}

/// A presentation. `order` lists slide file numbers in presentation order;
/// `slides[i]` is written as `ppt/slides/slide{i+1}.xml`.
pub fn pptx(slides: &[String], order: &[usize]) -> Vec<u8> {
    let ids: String = order
        .iter()
        .enumerate()
        .map(|(i, n)| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, n + 10))
        .collect();
    let presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#,
        ids
    );
    let rels: String = (1..=slides.len())
        .map(|n| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                n + 10,
                n
            )
        })
        .collect();
    let rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    );

    let mut entries = vec![
        (
            "[Content_Types].xml".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#.to_string(),
        ),
        ("ppt/presentation.xml".to_string(), presentation),
        ("ppt/_rels/presentation.xml.rels".to_string(), rels),
    ];
    for (i, slide) in slides.iter().enumerate() {
        entries.push((format!("ppt/slides/slide{}.xml", i + 1), slide.clone()));
    }
    let borrowed: Vec<(&str, String)> = entries.iter().map(|(n, b)| (n.as_str(), b.clone())).collect();
    zip_entries(&borrowed)
}
