//! Reuters-style pseudo-markup records:
//! `<REUTERS ... NEWID="12"> <TITLE>..</TITLE> <BODY>..</BODY> </REUTERS>`.

use crate::DocId;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RECORD: Regex = Regex::new(r"(?s)<REUTERS\b([^>]*)>(.*?)</REUTERS>").expect("valid regex");
    static ref NEW_ID: Regex = Regex::new(r#"NEWID="(\d+)""#).expect("valid regex");
    static ref TITLE: Regex = Regex::new(r"(?s)<TITLE>(.*?)</TITLE>").expect("valid regex");
    static ref BODY: Regex = Regex::new(r"(?s)<BODY>(.*?)</BODY>").expect("valid regex");
}

/// One record as found in the file. `id` is `None` when missing or unparseable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub id: Option<DocId>,
    pub title: Option<&'a str>,
    pub body: Option<&'a str>,
}

/// Decode bytes as Latin-1, which maps every byte to a code point.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub fn parse_records(text: &str) -> impl Iterator<Item = RawRecord<'_>> {
    RECORD.captures_iter(text).map(|caps| {
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        let content = caps.get(2).map_or("", |m| m.as_str());
        RawRecord {
            id: NEW_ID
                .captures(attrs)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok()),
            title: field(&TITLE, content),
            body: field(&BODY, content),
        }
    })
}

fn field<'a>(re: &Regex, content: &'a str) -> Option<&'a str> {
    re.captures(content).and_then(|c| c.get(1)).map(|m| m.as_str())
}
