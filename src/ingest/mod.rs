//! Bulk CSV loading of the fuel station corpus, grounded in
//! `gtfs::raw_gtfs::GtfsDataSet::read_obj`'s BOM-aware `csv::ReaderBuilder`
//! setup, but lenient the way `original_source`'s `load_fuel_stations`
//! management command is: a bad row is recorded and skipped rather than
//! aborting the whole file.

pub mod error;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

pub use error::{IngestError, RowError};
use crate::station::Station;

/// Raw shape of one row in the OPIS fuel-price corpus CSV, mirroring
/// `original_source`'s `FuelStation` model fields that the loader populates
/// directly from the file (everything geocoding fills in later is absent
/// here).
#[derive(Debug, Deserialize)]
struct StationRecord {
    #[serde(rename = "OPIS Truckstop ID")]
    opis_id: i64,
    #[serde(rename = "Truckstop Name")]
    name: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Retail Price")]
    retail_price: f64,
}

/// Reads a fuel-station CSV, returning every row that parsed successfully
/// plus a log of the ones that didn't. Never fails outright because of a bad
/// row -- only because the file itself couldn't be opened or its header
/// couldn't be read.
pub fn load_stations_csv<P: AsRef<Path>>(path: P) -> Result<(Vec<Station>, Vec<RowError>), IngestError> {
    let path_str = path.as_ref().display().to_string();
    let file = File::open(&path).map_err(|e| IngestError::Io {
        path: path_str.clone(),
        source: e,
    })?;

    let mut bom = [0u8; 3];
    let mut file = file;
    let read = file.read(&mut bom).unwrap_or(0);
    let chained: Box<dyn Read> = if read == 3 && bom == [0xef, 0xbb, 0xbf] {
        Box::new(file)
    } else {
        Box::new(bom[..read].chain(file))
    };

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(chained);

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Header {
            path: path_str.clone(),
            source: e,
        })?
        .clone();

    let mut stations = Vec::new();
    let mut errors = Vec::new();
    let mut rec = csv::StringRecord::new();

    loop {
        let line_number = reader.position().line();
        match reader.read_record(&mut rec) {
            Ok(false) => break,
            Ok(true) => match rec.deserialize::<StationRecord>(Some(&headers)) {
                Ok(raw) => stations.push(Station {
                    id: raw.opis_id,
                    name: raw.name,
                    city: raw.city,
                    state: raw.state,
                    address: raw.address,
                    retail_price: raw.retail_price,
                    latitude: None,
                    longitude: None,
                }),
                Err(e) => errors.push(RowError {
                    line_number,
                    message: e.to_string(),
                }),
            },
            Err(e) => {
                errors.push(RowError {
                    line_number,
                    message: e.to_string(),
                });
                break;
            }
        }
    }

    Ok((stations, errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_well_formed_rows() {
        let csv = "OPIS Truckstop ID,Truckstop Name,Address,City,State,Retail Price\n\
                    1001,Pilot #42,1 Main St,Springfield,IL,3.199\n\
                    1002,Love's #7,2 Elm St,Joplin,MO,3.259\n";
        let file = write_csv(csv);
        let (stations, errors) = load_stations_csv(file.path()).unwrap();
        assert_eq!(stations.len(), 2);
        assert!(errors.is_empty());
        assert_eq!(stations[0].id, 1001);
        assert_eq!(stations[0].retail_price, 3.199);
    }

    #[test]
    fn skips_malformed_rows_and_reports_them() {
        let csv = "OPIS Truckstop ID,Truckstop Name,Address,City,State,Retail Price\n\
                    1001,Pilot #42,1 Main St,Springfield,IL,3.199\n\
                    not-a-number,Bad Row,1 Elm St,Joplin,MO,oops\n\
                    1003,Flying J #3,3 Oak St,Tulsa,OK,3.109\n";
        let file = write_csv(csv);
        let (stations, errors) = load_stations_csv(file.path()).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_stations_csv("/nonexistent/path/stations.csv").unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
