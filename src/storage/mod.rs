//! Storage is organized as a handful of JSON documents inside the application directory.
//!  - `day_records.json` holds one [day_record::DayRecord] per sundown day.
//!  - `control.json` carries cli requests to the daemon.
//!  - `status.json` is the last snapshot published by the daemon.
//!
//! Every access takes a file lock, and undecodable content reads as "no data".

pub mod control;
pub mod day_record;
pub mod day_record_store;
pub mod json_file;
pub mod status;
