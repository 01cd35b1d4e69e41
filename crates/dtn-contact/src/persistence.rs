//! Contact-plan file I/O: JSON (the canonical format, matching the wire
//! shape produced by `Contact`'s serde attributes) and CSV (a flatter
//! interchange format for hand-authored or spreadsheet-edited plans).
//!
//! # JSON format
//!
//! ```json
//! { "contacts": [
//!     {"contact": 0, "source": "0", "dest": "1", "startTime": 0, "endTime": 100, "rate": 100, "owlt": 0, "confidence": 1.0}
//! ] }
//! ```
//!
//! # CSV format
//!
//! ```csv
//! contact_id,source,dest,startTime,endTime,rate
//! 0,0,1,0,100,100
//! ```
//!
//! `owlt` and `confidence` are not present in the CSV form; they take their
//! serde defaults (`0` and `1.0` respectively).

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use dtn_core::{AgentId, ContactId, Tick};

use crate::contact::Contact;
use crate::error::ContactResult;

#[derive(Serialize, Deserialize)]
struct ContactPlanFile {
    contacts: Vec<Contact>,
}

pub fn load_contacts_json(path: &Path) -> ContactResult<Vec<Contact>> {
    let file = std::fs::File::open(path)?;
    load_contacts_json_reader(file)
}

pub fn load_contacts_json_reader<R: Read>(reader: R) -> ContactResult<Vec<Contact>> {
    let parsed: ContactPlanFile = serde_json::from_reader(reader)?;
    Ok(parsed.contacts)
}

pub fn save_contacts_json(path: &Path, contacts: &[Contact]) -> ContactResult<()> {
    let mut file = std::fs::File::create(path)?;
    let payload = ContactPlanFile {
        contacts: contacts.to_vec(),
    };
    let body = serde_json::to_string_pretty(&payload)?;
    file.write_all(body.as_bytes())?;
    Ok(())
}

#[derive(Deserialize)]
struct CsvRecord {
    contact_id: i64,
    source: String,
    dest: String,
    #[serde(rename = "startTime")]
    start_time: u64,
    #[serde(rename = "endTime")]
    end_time: u64,
    rate: i64,
}

pub fn load_contacts_csv(path: &Path) -> ContactResult<Vec<Contact>> {
    let file = std::fs::File::open(path)?;
    load_contacts_csv_reader(file)
}

pub fn load_contacts_csv_reader<R: Read>(reader: R) -> ContactResult<Vec<Contact>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for result in csv_reader.deserialize::<CsvRecord>() {
        let row = result?;
        out.push(Contact::new(
            ContactId(row.contact_id),
            AgentId::new(row.source),
            AgentId::new(row.dest),
            Tick(row.start_time),
            Tick(row.end_time),
            row.rate,
            0,
            1.0,
        ));
    }
    Ok(out)
}

pub fn save_contacts_csv(path: &Path, contacts: &[Contact]) -> ContactResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["contact_id", "source", "dest", "startTime", "endTime", "rate"])?;
    for c in contacts {
        writer.write_record(&[
            c.id.0.to_string(),
            c.src.as_str().to_string(),
            c.dst.as_str().to_string(),
            c.start_ts.0.to_string(),
            c.end_ts.0.to_string(),
            c.rate.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn json_round_trip() {
        let json = r#"{"contacts": [
            {"contact": 0, "source": "0", "dest": "1", "startTime": 0, "endTime": 100, "rate": 100, "owlt": 5, "confidence": 0.9}
        ]}"#;
        let contacts = load_contacts_json_reader(Cursor::new(json)).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].owlt, 5);
        assert_eq!(contacts[0].confidence, 0.9);
    }

    #[test]
    fn csv_round_trip_defaults_owlt_and_confidence() {
        let csv = "contact_id,source,dest,startTime,endTime,rate\n0,0,1,0,100,100\n";
        let contacts = load_contacts_csv_reader(Cursor::new(csv)).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].owlt, 0);
        assert_eq!(contacts[0].confidence, 1.0);
        assert_eq!(contacts[0].src, AgentId::new("0"));
    }
}
