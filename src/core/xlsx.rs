//! Minimal single-sheet Office Open XML (`.xlsx`) writer.
//!
//! A workbook is a zip package of XML parts. Only the parts a spreadsheet
//! application needs to open one sheet are written: content types, package and
//! workbook relationships, the workbook, one worksheet with inline strings,
//! a small style sheet and the core document properties.

use crate::utils::error::{ReportError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Style indexes into `cellXfs` of the generated style sheet.
const STYLE_HEADER: u32 = 1;
const STYLE_DECIMAL: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Text(String),
    Integer(u64),
    /// Shown with two decimals, stored at full precision.
    Decimal(f64),
    Empty,
}

#[derive(Debug, Clone)]
pub struct Worksheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<SheetCell>>,
    pub column_width: f64,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, header: Vec<String>) -> Self {
        Self {
            name: name.into(),
            header,
            rows: Vec::new(),
            column_width: 18.0,
        }
    }

    pub fn push_row(&mut self, row: Vec<SheetCell>) {
        self.rows.push(row);
    }
}

pub fn validate_sheet_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("sheet name cannot be empty".to_string())
    } else if name.chars().count() > MAX_SHEET_NAME_LEN {
        Some(format!("sheet name is longer than {} characters", MAX_SHEET_NAME_LEN))
    } else if name.contains(&FORBIDDEN_SHEET_NAME_CHARS[..]) {
        Some("sheet name cannot contain any of [ ] : * ? / \\".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ReportError::InvalidConfigValueError {
            field: "sheet_name".to_string(),
            value: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Serializes `sheet` into the bytes of an `.xlsx` file.
pub fn write_workbook(sheet: &Worksheet, created: DateTime<Utc>) -> Result<Vec<u8>> {
    validate_sheet_name(&sheet.name)?;

    let parts = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", package_rels_xml()),
        ("docProps/core.xml", core_properties_xml(created)),
        ("xl/workbook.xml", workbook_xml(&sheet.name)),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml()),
        ("xl/styles.xml", styles_xml()),
        ("xl/worksheets/sheet1.xml", worksheet_xml(sheet)),
    ];

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, xml) in parts {
        let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);
        zip.start_file::<_, ()>(name, options)?;
        zip.write_all(xml.as_bytes())?;
    }

    let cursor = zip.finish()?;
    let bytes = cursor.into_inner();
    tracing::debug!(
        "Built workbook '{}' with {} data rows ({} bytes)",
        sheet.name,
        sheet.rows.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Escapes text for element content and attribute values. Characters XML 1.0
/// cannot carry are dropped.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

fn cell_ref(column: usize, row: usize) -> String {
    format!("{}{}", crate::core::aggregate::column_letter(column), row)
}

fn worksheet_xml(sheet: &Worksheet) -> String {
    let width = sheet
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(sheet.header.len()))
        .max()
        .unwrap_or(0);

    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    let _ = write!(xml, r#"<worksheet xmlns="{}" xmlns:r="{}">"#, NS_MAIN, NS_REL);
    if width > 0 {
        let _ = write!(
            xml,
            r#"<cols><col min="1" max="{}" width="{}" customWidth="1"/></cols>"#,
            width, sheet.column_width
        );
    }
    xml.push_str("<sheetData>");

    let header_cells: Vec<SheetCell> = sheet.header.iter().cloned().map(SheetCell::Text).collect();
    write_row(&mut xml, 1, &header_cells, Some(STYLE_HEADER));
    for (index, row) in sheet.rows.iter().enumerate() {
        write_row(&mut xml, index + 2, row, None);
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn write_row(xml: &mut String, row_number: usize, cells: &[SheetCell], style: Option<u32>) {
    let _ = write!(xml, r#"<row r="{}">"#, row_number);
    for (column, cell) in cells.iter().enumerate() {
        let reference = cell_ref(column, row_number);
        let style_attr = |default: Option<u32>| {
            style
                .or(default)
                .map(|s| format!(r#" s="{}""#, s))
                .unwrap_or_default()
        };
        match cell {
            SheetCell::Text(text) => {
                let _ = write!(
                    xml,
                    r#"<c r="{}"{} t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    reference,
                    style_attr(None),
                    escape_xml(text)
                );
            }
            SheetCell::Integer(value) => {
                let _ = write!(xml, r#"<c r="{}"{}><v>{}</v></c>"#, reference, style_attr(None), value);
            }
            SheetCell::Decimal(value) if value.is_finite() => {
                let _ = write!(
                    xml,
                    r#"<c r="{}"{}><v>{}</v></c>"#,
                    reference,
                    style_attr(Some(STYLE_DECIMAL)),
                    value
                );
            }
            SheetCell::Decimal(_) | SheetCell::Empty => {}
        }
    }
    xml.push_str("</row>");
}

fn content_types_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            "</Types>"
        ),
        XML_DECLARATION
    )
}

fn package_rels_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="{}">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
            "</Relationships>"
        ),
        XML_DECLARATION, NS_PKG_REL
    )
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"{}<workbook xmlns="{}" xmlns:r="{}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        XML_DECLARATION,
        NS_MAIN,
        NS_REL,
        escape_xml(sheet_name)
    )
}

fn workbook_rels_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="{}">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            "</Relationships>"
        ),
        XML_DECLARATION, NS_PKG_REL
    )
}

fn styles_xml() -> String {
    // numFmtId 4 is the built-in "#,##0.00".
    format!(
        concat!(
            "{}",
            r#"<styleSheet xmlns="{}">"#,
            r#"<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="3">"#,
            r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
            r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
            r#"<xf numFmtId="4" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#,
            "</cellXfs>",
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
            "</styleSheet>"
        ),
        XML_DECLARATION, NS_MAIN
    )
}

fn core_properties_xml(created: DateTime<Utc>) -> String {
    let timestamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        concat!(
            "{}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:creator>{}</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            "</cp:coreProperties>"
        ),
        XML_DECLARATION,
        env!("CARGO_PKG_NAME"),
        timestamp,
        timestamp
    )
}
