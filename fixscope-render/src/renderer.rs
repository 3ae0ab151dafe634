/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Dictionary-driven message renderer.
//!
//! Fields are printed in the order the dictionary declares them, not in wire
//! order. Each line carries the tag, the field name right-aligned to a width
//! that grows with nesting, the raw value and, for enumerated values, the
//! description:
//!
//! ```text
//! 	[  54]	                            Side: 1 [BUY]
//! ```
//!
//! Repeating groups print their count line followed by one block per row,
//! one level deeper. Rows of multi-row groups are numbered from `#0` on their
//! first line. Problems with a single field (unknown tag, unresolvable
//! template, rows that do not match the count) become inline `ERROR` lines
//! and rendering continues.

use crate::config::RenderConfig;
use fixscope_core::error::DecodeError;
use fixscope_core::message::{FieldMap, Message};
use fixscope_dictionary::{Dictionary, FieldDef, FieldType, MessagePart, resolve_template};
use fixscope_tagvalue::{MessageParser, SOH, replace_delimiter};
use std::collections::BTreeSet;
use std::fmt;

/// Renders messages against a protocol dictionary.
#[derive(Debug, Clone)]
pub struct Renderer<'d> {
    dictionary: &'d Dictionary,
    config: RenderConfig,
}

impl<'d> Renderer<'d> {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(dictionary: &'d Dictionary, config: RenderConfig) -> Self {
        Self { dictionary, config }
    }

    /// Returns the dictionary.
    #[must_use]
    pub const fn dictionary(&self) -> &'d Dictionary {
        self.dictionary
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Returns a parser configured like this renderer.
    #[must_use]
    pub const fn parser(&self) -> MessageParser<'d> {
        MessageParser::new(self.dictionary).with_checksum_validation(self.config.validate_checksum)
    }

    /// Renders a full report for one SOH-delimited message.
    ///
    /// The report holds the original text with SOH shown as the configured
    /// delimiter, then the header, body and trailer sections. A message that
    /// cannot be framed yields the error followed by the original text.
    #[must_use]
    pub fn render(&self, raw: &[u8]) -> String {
        self.try_render(raw)
            .unwrap_or_else(|e| self.error_report(&e, raw))
    }

    /// Renders a full report, returning the framing error instead of an
    /// error report.
    ///
    /// # Errors
    /// Returns the [`DecodeError`] raised while framing `raw`.
    pub fn try_render(&self, raw: &[u8]) -> Result<String, DecodeError> {
        let message = self.parser().parse(raw)?;
        Ok(format!(
            "\nORIG:\n{}\n\n{}",
            self.original_text(raw),
            self.render_message(&message)
        ))
    }

    /// Formats the report shown for a message that cannot be framed.
    #[must_use]
    pub fn error_report(&self, error: &DecodeError, raw: &[u8]) -> String {
        format!("Error: {}\n{}", error, self.original_text(raw))
    }

    fn original_text(&self, raw: &[u8]) -> String {
        let visible = replace_delimiter(raw, SOH, self.config.delimiter);
        String::from_utf8_lossy(&visible).into_owned()
    }

    /// Renders a report for a log line that uses the configured delimiter
    /// instead of SOH.
    #[must_use]
    pub fn render_line(&self, line: &str) -> String {
        let raw = replace_delimiter(line.trim_end().as_bytes(), self.config.delimiter, SOH);
        self.render(&raw)
    }

    /// Renders the header, body and trailer sections of a parsed message.
    #[must_use]
    pub fn render_message(&self, message: &Message) -> String {
        let dict = self.dictionary;
        let msg_type = message.header.get(35).unwrap_or_default();
        format!(
            "HEADER:\n{}\nBODY:\n{}\nTRAILER:\n{}\n",
            self.render_field_map(&message.header, dict.header_parts(), 0, None),
            self.render_field_map(&message.body, dict.message_parts(msg_type), 0, None),
            self.render_field_map(&message.trailer, dict.trailer_parts(), 0, None),
        )
    }

    /// Renders one field map against its layout.
    ///
    /// Level zero starts with the banner. `index` numbers the first line of a
    /// group row and is `None` for segments and single-row groups.
    #[must_use]
    pub fn render_field_map(
        &self,
        map: &FieldMap,
        parts: &[MessagePart],
        level: usize,
        index: Option<usize>,
    ) -> String {
        FieldMapView {
            renderer: self,
            map,
            parts,
            level,
            index,
        }
        .to_string()
    }
}

struct FieldMapView<'a, 'd> {
    renderer: &'a Renderer<'d>,
    map: &'a FieldMap,
    parts: &'a [MessagePart],
    level: usize,
    index: Option<usize>,
}

impl FieldMapView<'_, '_> {
    fn dictionary(&self) -> &Dictionary {
        self.renderer.dictionary
    }

    fn write_line(
        &self,
        f: &mut fmt::Formatter<'_>,
        def: &FieldDef,
        value: &str,
        index: Option<usize>,
        description: Option<&str>,
    ) -> fmt::Result {
        let label = match index {
            Some(i) => format!("#{} {}", i, def.name),
            None => def.name.clone(),
        };
        let width = self.renderer.config.width(self.level);
        write!(f, "\t[{:>4}]\t{:>width$}: {}", def.tag, label, value, width = width)?;
        match description {
            Some(desc) if !desc.is_empty() => writeln!(f, " [{}]", desc),
            _ => writeln!(f),
        }
    }

    fn write_field(
        &self,
        f: &mut fmt::Formatter<'_>,
        def: &FieldDef,
        value: &str,
        index: Option<usize>,
        enclosing: &[&FieldDef],
    ) -> fmt::Result {
        if def.is_group() || def.field_type == FieldType::NumInGroup {
            self.write_line(f, def, value, index, None)?;
            self.write_group(f, def, value, enclosing)
        } else {
            self.write_line(f, def, value, index, def.describe(value))
        }
    }

    fn write_group(
        &self,
        f: &mut fmt::Formatter<'_>,
        def: &FieldDef,
        value: &str,
        enclosing: &[&FieldDef],
    ) -> fmt::Result {
        let template = match resolve_template(self.dictionary(), def.tag, enclosing) {
            Ok(template) => template,
            Err(e) => return writeln!(f, "\tERROR: GROUP[{}]=VALUE[{}]: {}", def.tag, value, e),
        };
        let rows = match self.map.group(def.tag, &template) {
            Ok(rows) => rows,
            Err(e) => {
                let tags: Vec<String> = template.iter().map(u32::to_string).collect();
                return writeln!(
                    f,
                    "\tERROR: GROUP[{}]=VALUE[{}] TEMPLATE[{}]: {}",
                    def.tag,
                    value,
                    tags.join(","),
                    e
                );
            }
        };

        let members = def.members().unwrap_or_default();
        let numbered = rows.len() > 1;
        for (i, row) in rows.iter().enumerate() {
            let view = FieldMapView {
                renderer: self.renderer,
                map: row,
                parts: members,
                level: self.level + 1,
                index: numbered.then_some(i),
            };
            write!(f, "{}", view)?;
        }
        Ok(())
    }
}

impl fmt::Display for FieldMapView<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.level == 0 {
            writeln!(f, "{}", self.renderer.config.banner)?;
        }

        let defs = self.dictionary().expand(self.parts);
        let mut index = self.index;
        let mut consumed = BTreeSet::new();

        for def in &defs {
            let Some(value) = self.map.get(def.tag) else {
                continue;
            };
            if !consumed.insert(def.tag) {
                continue;
            }
            self.write_field(f, def, value, index.take(), &defs)?;
        }

        for tag in self.map.tags().filter(|tag| !consumed.contains(tag)) {
            let value = self.map.get(tag).unwrap_or_default();
            match self.dictionary().field(tag) {
                Some(def) => self.write_field(f, def, value, index.take(), &defs)?,
                None => writeln!(f, "\tERROR: TAG[{}]=VALUE[{}]", tag, value)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixscope_tagvalue::Encoder;
    use proptest::prelude::*;

    const DICTIONARY: &str = r#"{
        "begin_string": "FIX.4.4",
        "fields": [
            {"number": 1, "name": "Account", "type": "STRING"},
            {"number": 8, "name": "BeginString", "type": "STRING"},
            {"number": 9, "name": "BodyLength", "type": "LENGTH"},
            {"number": 10, "name": "CheckSum", "type": "STRING"},
            {"number": 11, "name": "ClOrdID", "type": "STRING"},
            {"number": 35, "name": "MsgType", "type": "STRING",
             "values": [{"enum": "D", "description": "ORDER_SINGLE"}]},
            {"number": 38, "name": "OrderQty", "type": "QTY"},
            {"number": 40, "name": "OrdType", "type": "CHAR",
             "values": [{"enum": "1", "description": "MARKET"}, {"enum": "2", "description": "LIMIT"}]},
            {"number": 44, "name": "Price", "type": "PRICE"},
            {"number": 54, "name": "Side", "type": "CHAR",
             "values": [{"enum": "1", "description": "Buy"}, {"enum": "2", "description": "Sell"}]},
            {"number": 55, "name": "Symbol", "type": "STRING"},
            {"number": 58, "name": "Text", "type": "STRING"},
            {"number": 448, "name": "PartyID", "type": "STRING"},
            {"number": 453, "name": "NoPartyIDs", "type": "NUMINGROUP"},
            {"number": 555, "name": "NoLegs", "type": "NUMINGROUP"},
            {"number": 600, "name": "LegSymbol", "type": "STRING"},
            {"number": 683, "name": "NoLegStipulations", "type": "NUMINGROUP"},
            {"number": 688, "name": "LegStipulationType", "type": "STRING"}
        ],
        "header": [
            {"kind": "field", "name": "BeginString", "required": true},
            {"kind": "field", "name": "BodyLength", "required": true},
            {"kind": "field", "name": "MsgType", "required": true}
        ],
        "trailer": [
            {"kind": "field", "name": "CheckSum", "required": true}
        ],
        "components": [
            {"name": "Instrument", "parts": [{"kind": "field", "name": "Symbol"}]}
        ],
        "messages": [
            {"name": "NewOrderSingle", "msgtype": "D", "parts": [
                {"kind": "field", "name": "ClOrdID", "required": true},
                {"kind": "field", "name": "Side", "required": true},
                {"kind": "group", "name": "NoLegs", "parts": [
                    {"kind": "field", "name": "LegSymbol"}
                ]}
            ]},
            {"name": "NewOrderMultileg", "msgtype": "AB", "parts": [
                {"kind": "field", "name": "OrdType"},
                {"kind": "field", "name": "Price"},
                {"kind": "component", "name": "Instrument"},
                {"kind": "field", "name": "ClOrdID"},
                {"kind": "field", "name": "Side"},
                {"kind": "field", "name": "Account"},
                {"kind": "field", "name": "OrderQty"},
                {"kind": "group", "name": "NoLegs", "parts": [
                    {"kind": "field", "name": "LegSymbol"},
                    {"kind": "group", "name": "NoLegStipulations", "parts": [
                        {"kind": "field", "name": "LegStipulationType"}
                    ]}
                ]},
                {"kind": "field", "name": "Text"}
            ]}
        ]
    }"#;

    fn dictionary() -> Dictionary {
        Dictionary::from_json_str(DICTIONARY).unwrap()
    }

    fn line(tag: u32, label: &str, width: usize, rest: &str) -> String {
        format!("\t[{:>4}]\t{:>width$}: {}\n", tag, label, rest, width = width)
    }

    fn encode(fields: &[(u32, &str)]) -> Vec<u8> {
        let mut encoder = Encoder::new("FIX.4.4");
        encoder.put_fields(fields.iter().copied());
        encoder.finish().to_vec()
    }

    fn legs(symbols: &[&str]) -> fixscope_core::message::Group {
        let rows = symbols
            .iter()
            .map(|s| FieldMap::new().with(600, *s))
            .collect();
        fixscope_core::message::Group::new(555, rows)
    }

    #[test]
    fn test_new_order_single_body() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let body = FieldMap::new()
            .with(11, "42")
            .with(54, "1")
            .with(555, "2")
            .with_group(legs(&["BTC-USD", "ETH-USD"]));

        let out = renderer.render_field_map(&body, dict.message_parts("D"), 0, None);
        let expected = [
            format!("{}\n", "-".repeat(68)),
            line(11, "ClOrdID", 32, "42"),
            line(54, "Side", 32, "1 [Buy]"),
            line(555, "NoLegs", 32, "2"),
            line(600, "#0 LegSymbol", 36, "BTC-USD"),
            line(600, "#1 LegSymbol", 36, "ETH-USD"),
        ]
        .concat();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_single_row_is_not_numbered() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let body = FieldMap::new().with(11, "7").with_group(legs(&["BTC-USD"]));

        let out = renderer.render_field_map(&body, dict.message_parts("D"), 0, None);
        assert!(out.ends_with(&line(600, "LegSymbol", 36, "BTC-USD")));
        assert!(!out.contains('#'));
    }

    #[test]
    fn test_group_rows_omit_banner() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let row = FieldMap::new().with(600, "BTC-USD");
        let defs = dict.expand(dict.message_parts("D"));
        let members = defs
            .iter()
            .find(|d| d.tag == 555)
            .and_then(|d| d.members())
            .unwrap();

        let out = renderer.render_field_map(&row, members, 1, Some(3));
        assert_eq!(out, line(600, "#3 LegSymbol", 36, "BTC-USD"));
    }

    #[test]
    fn test_nested_groups_and_components() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let wire = encode(&[
            (35, "AB"),
            (11, "X1"),
            (55, "SPREAD"),
            (555, "2"),
            (600, "A"),
            (683, "1"),
            (688, "S1"),
            (600, "B"),
            (40, "2"),
        ]);

        let report = renderer.render(&wire);
        let body = report
            .split("BODY:\n")
            .nth(1)
            .and_then(|rest| rest.split("TRAILER:\n").next())
            .unwrap();
        let expected = [
            format!("{}\n", "-".repeat(68)),
            line(40, "OrdType", 32, "2 [LIMIT]"),
            line(55, "Symbol", 32, "SPREAD"),
            line(11, "ClOrdID", 32, "X1"),
            line(555, "NoLegs", 32, "2"),
            line(600, "#0 LegSymbol", 36, "A"),
            line(683, "NoLegStipulations", 36, "1"),
            line(688, "LegStipulationType", 40, "S1"),
            line(600, "#1 LegSymbol", 36, "B"),
            "\n".to_string(),
        ]
        .concat();
        assert_eq!(body, expected);
    }

    #[test]
    fn test_report_sections() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let wire = encode(&[(35, "D"), (11, "42")]);

        let report = renderer.render(&wire);
        let orig = String::from_utf8_lossy(&wire).replace('\x01', "|");
        assert!(report.starts_with(&format!("\nORIG:\n{}\n\nHEADER:\n", orig)));
        assert!(report.contains(&line(35, "MsgType", 32, "D [ORDER_SINGLE]")));
        assert!(report.contains("\nBODY:\n"));
        assert!(report.contains("\nTRAILER:\n"));
        assert_eq!(report.matches(&"-".repeat(68)).count(), 3);
    }

    #[test]
    fn test_render_line_accepts_log_delimiter() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let wire = encode(&[(35, "D"), (11, "42")]);
        let logged = String::from_utf8_lossy(&wire).replace('\x01', "|");

        assert_eq!(renderer.render_line(&logged), renderer.render(&wire));
    }

    #[test]
    fn test_framing_error_report() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());

        let report = renderer.render(b"35=D\x0111=1\x01");
        assert_eq!(
            report,
            "Error: invalid begin string: expected 8=FIX.x.y\n35=D|11=1|"
        );
    }

    #[test]
    fn test_unknown_tag_is_reported_once() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let body = FieldMap::new().with(11, "42").with(9999, "x").with(54, "2");

        let out = renderer.render_field_map(&body, dict.message_parts("D"), 0, None);
        assert_eq!(out.matches("ERROR").count(), 1);
        assert!(out.ends_with("\tERROR: TAG[9999]=VALUE[x]\n"));
        assert!(out.contains(&line(54, "Side", 32, "2 [Sell]")));
    }

    #[test]
    fn test_undeclared_tags_follow_declared_ones() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let body = FieldMap::new().with(58, "note").with(1, "ACC").with(11, "42");

        let out = renderer.render_field_map(&body, dict.message_parts("D"), 0, None);
        let expected = [
            format!("{}\n", "-".repeat(68)),
            line(11, "ClOrdID", 32, "42"),
            line(1, "Account", 32, "ACC"),
            line(58, "Text", 32, "note"),
        ]
        .concat();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_count_mismatch_is_inline() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let body = FieldMap::new()
            .with(555, "3")
            .with_group(legs(&["A", "B"]))
            .with(54, "1");

        let out = renderer.render_field_map(&body, dict.message_parts("D"), 0, None);
        assert!(out.contains(&line(54, "Side", 32, "1 [Buy]")));
        assert!(out.contains(&line(555, "NoLegs", 32, "3")));
        assert!(out.contains(
            "\tERROR: GROUP[555]=VALUE[3] TEMPLATE[600]: group count mismatch for tag 555: expected 3, found 2\n"
        ));
        assert!(!out.contains("LegSymbol"));
    }

    #[test]
    fn test_missing_rows_are_inline() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let body = FieldMap::new().with(555, "1").with(11, "42");

        let out = renderer.render_field_map(&body, dict.message_parts("D"), 0, None);
        assert!(out.contains("\tERROR: GROUP[555]=VALUE[1] TEMPLATE[600]: "));
        assert!(out.contains(&line(11, "ClOrdID", 32, "42")));
    }

    #[test]
    fn test_undeclared_group_is_inline() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let body = FieldMap::new().with(453, "1").with(448, "TRADER");

        let out = renderer.render_field_map(&body, dict.message_parts("D"), 0, None);
        assert!(out.contains(&line(453, "NoPartyIDs", 32, "1")));
        assert!(out.contains("\tERROR: GROUP[453]=VALUE[1]: group tag 453 is not declared here\n"));
        assert!(out.contains(&line(448, "PartyID", 32, "TRADER")));
    }

    #[test]
    fn test_tag_declared_twice_renders_once() {
        let source = r#"{
            "fields": [
                {"number": 11, "name": "ClOrdID", "type": "STRING"},
                {"number": 55, "name": "Symbol", "type": "STRING"}
            ],
            "components": [
                {"name": "Instrument", "parts": [{"kind": "field", "name": "Symbol"}]}
            ],
            "messages": [
                {"name": "QuoteRequest", "msgtype": "R", "parts": [
                    {"kind": "field", "name": "Symbol"},
                    {"kind": "field", "name": "ClOrdID"},
                    {"kind": "component", "name": "Instrument"}
                ]}
            ]
        }"#;
        let dict = Dictionary::from_json_str(source).unwrap();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let body = FieldMap::new().with(11, "1").with(55, "BTC");

        let out = renderer.render_field_map(&body, dict.message_parts("R"), 0, None);
        let expected = [
            format!("{}\n", "-".repeat(68)),
            line(55, "Symbol", 32, "BTC"),
            line(11, "ClOrdID", 32, "1"),
        ]
        .concat();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_repeated_tag_keeps_first_value() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let wire = encode(&[(35, "U9"), (555, "2"), (600, "A"), (600, "B")]);

        let out = renderer.render(&wire);
        assert!(out.contains(&line(600, "LegSymbol", 32, "A")));
        assert!(!out.contains("LegSymbol: B"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let dict = dictionary();
        let renderer = Renderer::new(&dict, RenderConfig::default());
        let wire = encode(&[(35, "AB"), (555, "1"), (600, "A"), (11, "1"), (9999, "?")]);
        assert_eq!(renderer.render(&wire), renderer.render(&wire));
    }

    const AB_ORDER: [u32; 7] = [40, 44, 55, 11, 54, 1, 38];

    proptest! {
        #[test]
        fn test_body_follows_schema_order(
            order in Just(AB_ORDER.to_vec()).prop_shuffle(),
            values in proptest::collection::vec("[A-Z0-9]{1,8}", AB_ORDER.len()),
        ) {
            let dict = dictionary();
            let renderer = Renderer::new(&dict, RenderConfig::default());
            let mut fields = vec![(35, "AB")];
            fields.extend(order.iter().zip(&values).map(|(tag, value)| (*tag, value.as_str())));
            let wire = encode(&fields);

            let report = renderer.render(&wire);
            prop_assert_eq!(&report, &renderer.render(&wire));

            let body = report.split("BODY:\n").nth(1).unwrap_or_default();
            let rendered: Vec<u32> = body
                .lines()
                .take_while(|l| !l.starts_with("TRAILER:"))
                .filter_map(|l| l.strip_prefix("\t["))
                .filter_map(|l| l.split(']').next())
                .filter_map(|t| t.trim().parse().ok())
                .collect();
            prop_assert_eq!(rendered, AB_ORDER.to_vec());
        }
    }
}
