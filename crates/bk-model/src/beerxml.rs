//! BeerXML codec for equipment records.
//!
//! Reads every `<EQUIPMENT>` element in a document, wherever it sits
//! (top level, inside `<EQUIPMENTS>`, or embedded in a `<RECIPE>`), and
//! writes records back wrapped in `<EQUIPMENTS>`.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::equipment::Equipment;
use crate::load::{EQUIPMENT_TAG, LoadReport};
use crate::record::{FieldNode, Record};
use crate::{ModelError, ModelResult};

pub const EQUIPMENTS_TAG: &str = "EQUIPMENTS";

/// Byte offset -> 1-based line number.
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        Self {
            newlines: text
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i)
                .collect(),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        // newlines strictly before `offset`
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}

/// A child element of `<EQUIPMENT>` being read.
struct PendingChild {
    name: String,
    line: usize,
    text: String,
    depth: usize,
    has_elements: bool,
}

impl PendingChild {
    fn finish(self) -> FieldNode {
        let node = if self.has_elements || self.text.is_empty() {
            FieldNode::empty(self.name)
        } else {
            FieldNode::text(self.name, self.text)
        };
        node.at_line(self.line)
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Extract every `<EQUIPMENT>` element of `xml` as a [`Record`].
pub fn parse_records(xml: &str) -> ModelResult<Vec<Record>> {
    // untrimmed: NAME and NOTES keep surrounding whitespace
    let mut reader = Reader::from_str(xml);
    let lines = LineIndex::new(xml);

    let mut records = Vec::new();
    let mut current: Option<Record> = None;
    let mut child: Option<PendingChild> = None;

    loop {
        let event = reader.read_event()?;
        // position just past the event, i.e. on the line of its closing '>'
        let line = lines.line_of(reader.buffer_position() as usize);

        match event {
            Event::Start(e) => {
                let name = element_name(&e);
                if current.is_none() {
                    if name == EQUIPMENT_TAG {
                        current = Some(Record::new(EQUIPMENT_TAG).at_line(line));
                    }
                } else if let Some(pending) = child.as_mut() {
                    pending.depth += 1;
                    pending.has_elements = true;
                } else {
                    child = Some(PendingChild {
                        name,
                        line,
                        text: String::new(),
                        depth: 0,
                        has_elements: false,
                    });
                }
            }
            Event::Empty(e) => {
                let name = element_name(&e);
                if let Some(record) = current.as_mut() {
                    match child.as_mut() {
                        Some(pending) => pending.has_elements = true,
                        None => record.push(FieldNode::empty(name).at_line(line)),
                    }
                } else if name == EQUIPMENT_TAG {
                    records.push(Record::new(EQUIPMENT_TAG).at_line(line));
                }
            }
            Event::Text(t) => {
                if let Some(pending) = child.as_mut()
                    && pending.depth == 0
                {
                    pending.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(pending) = child.as_mut()
                    && pending.depth == 0
                {
                    pending.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(_) => {
                if let Some(pending) = child.as_mut()
                    && pending.depth > 0
                {
                    pending.depth -= 1;
                } else if let Some(pending) = child.take() {
                    if let Some(record) = current.as_mut() {
                        record.push(pending.finish());
                    }
                } else if let Some(record) = current.take() {
                    records.push(record);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(record) = current {
        return Err(ModelError::Truncated {
            tag: record.tag,
            line: record.line.unwrap_or_default(),
        });
    }

    Ok(records)
}

/// Render `records` as a BeerXML document wrapped in `<EQUIPMENTS>`.
///
/// Children without a value, or with an empty one, become empty elements.
pub fn write_records(records: &[Record]) -> ModelResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(EQUIPMENTS_TAG)))?;

    for record in records {
        writer.write_event(Event::Start(BytesStart::new(record.tag.as_str())))?;
        for field in record {
            match field.value() {
                Some(value) if !value.is_empty() => {
                    writer.write_event(Event::Start(BytesStart::new(field.name.as_str())))?;
                    writer.write_event(Event::Text(BytesText::new(value)))?;
                    writer.write_event(Event::End(BytesEnd::new(field.name.as_str())))?;
                }
                _ => {
                    writer.write_event(Event::Empty(BytesStart::new(field.name.as_str())))?;
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(record.tag.as_str())))?;
    }

    writer.write_event(Event::End(BytesEnd::new(EQUIPMENTS_TAG)))?;
    let mut out = String::from_utf8(writer.into_inner())?;
    out.push('\n');
    Ok(out)
}

pub fn parse_equipment(xml: &str) -> ModelResult<Vec<Equipment>> {
    Ok(parse_equipment_with_reports(xml)?
        .into_iter()
        .map(|(equipment, _)| equipment)
        .collect())
}

pub fn parse_equipment_with_reports(xml: &str) -> ModelResult<Vec<(Equipment, LoadReport)>> {
    let records = parse_records(xml)?;
    Ok(records.iter().map(Equipment::from_record_with_report).collect())
}

pub fn write_equipment(profiles: &[Equipment]) -> ModelResult<String> {
    let records: Vec<Record> = profiles.iter().map(Equipment::to_record).collect();
    write_records(&records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<EQUIPMENTS>
  <EQUIPMENT>
    <NAME>Pot &amp; Cooler</NAME>
    <VERSION>1</VERSION>
    <BATCH_SIZE>20.0</BATCH_SIZE>
    <SPARGE_ARM><TYPE>ring</TYPE></SPARGE_ARM>
    <NOTES/>
  </EQUIPMENT>
</EQUIPMENTS>
"#;

    #[test]
    fn reads_children_with_lines() {
        let records = parse_records(SAMPLE).unwrap();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.tag, "EQUIPMENT");
        assert_eq!(rec.line, Some(3));
        assert_eq!(rec.get("NAME"), Some("Pot & Cooler"));
        assert_eq!(rec.get("BATCH_SIZE"), Some("20.0"));

        let names: Vec<_> = rec.iter().map(|f| (f.name.as_str(), f.line)).collect();
        assert_eq!(
            names,
            vec![
                ("NAME", Some(4)),
                ("VERSION", Some(5)),
                ("BATCH_SIZE", Some(6)),
                ("SPARGE_ARM", Some(7)),
                ("NOTES", Some(8)),
            ]
        );
        assert_eq!(rec.fields[3].value, None, "nested elements carry no text");
        assert_eq!(rec.fields[4].value, None);
    }

    #[test]
    fn finds_equipment_inside_recipe() {
        let xml = "<RECIPES><RECIPE><NAME>IPA</NAME><EQUIPMENT><NAME>Keg</NAME></EQUIPMENT></RECIPE></RECIPES>";
        let records = parse_records(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("NAME"), Some("Keg"));
    }

    #[test]
    fn bare_equipment_element_is_accepted() {
        let records = parse_records("<EQUIPMENT><NAME>Solo</NAME></EQUIPMENT>").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn unclosed_equipment_is_an_error() {
        let err = parse_records("<EQUIPMENT><NAME>Solo</NAME>").unwrap_err();
        assert!(matches!(err, ModelError::Truncated { .. } | ModelError::Xml(_)));
    }

    #[test]
    fn writer_escapes_and_collapses_empty_values() {
        let mut rec = Record::new(EQUIPMENT_TAG).with("NAME", "A < B");
        rec.push(FieldNode::text("NOTES", ""));
        let xml = write_records(&[rec]).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<NAME>A &lt; B</NAME>"));
        assert!(xml.contains("<NOTES/>"));
        assert!(xml.contains("<EQUIPMENTS>"));
    }

    #[test]
    fn document_round_trip() {
        let mut a = Equipment::named("Alpha");
        a.set_batch_size_l(19.0).unwrap();
        a.set_notes("line one");
        let b = Equipment::named("Beta");

        let xml = write_equipment(&[a.clone(), b.clone()]).unwrap();
        let back = parse_equipment(&xml).unwrap();
        assert_eq!(back.len(), 2);
        assert!(back[0].same_values(&a));
        assert!(back[1].same_values(&b));
    }

    #[test]
    fn text_fields_keep_surrounding_whitespace() {
        let mut e = Equipment::named("  Big Kettle ");
        e.set_notes("\n  step 1: fill\n");
        let mut blank = Equipment::named("Blank Notes");
        blank.set_notes("   ");

        let xml = write_equipment(&[e.clone(), blank.clone()]).unwrap();
        let back = parse_equipment(&xml).unwrap();
        assert_eq!(back[0].name(), "  Big Kettle ");
        assert_eq!(back[0].notes(), "\n  step 1: fill\n");
        assert!(back[0].same_values(&e));
        assert_eq!(back[1].notes(), "   ");
        assert!(back[1].same_values(&blank));
    }

    #[test]
    fn indentation_between_children_is_not_a_value() {
        let xml = "<EQUIPMENT>\n  <NAME>Pot</NAME>\n  <SPARGE_ARM>\n    <TYPE>ring</TYPE>\n  </SPARGE_ARM>\n</EQUIPMENT>";
        let records = parse_records(xml).unwrap();
        assert_eq!(records[0].get("NAME"), Some("Pot"));
        assert_eq!(records[0].fields.len(), 2);
        assert_eq!(records[0].fields[1].value, None);
    }
}
