//! Loading engine inputs from JSON files.
//!
//! Reports may be a JSON array, an openFDA response object with a `results`
//! array, or JSON lines. Milestones and devices are JSON arrays.

use crate::core::{Device, Error, LitigationMilestone, Result};
use crate::normalize::RawReport;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::input(path, format!("cannot read file: {e}")))
}

fn into_reports(values: Vec<Value>, path: &Path) -> Result<Vec<RawReport>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            RawReport::from_value(value)
                .ok_or_else(|| Error::input(path, format!("report {index} is not a JSON object")))
        })
        .collect()
}

/// Parse report file contents. `path` is only used in error messages.
pub fn parse_reports(contents: &str, path: &Path) -> Result<Vec<RawReport>> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => into_reports(items, path),
        Ok(Value::Object(mut object)) => match object.remove("results") {
            Some(Value::Array(items)) => into_reports(items, path),
            Some(_) => Err(Error::input(path, "'results' must be an array")),
            None => Ok(vec![RawReport::from_map(object)]),
        },
        Ok(_) => Err(Error::input(path, "expected an array, an object or JSON lines")),
        Err(_) => parse_json_lines(trimmed, path),
    }
}

fn parse_json_lines(contents: &str, path: &Path) -> Result<Vec<RawReport>> {
    let mut reports = Vec::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .map_err(|e| Error::input(path, format!("line {}: {e}", number + 1)))?;
        let report = RawReport::from_value(value).ok_or_else(|| {
            Error::input(path, format!("line {}: not a JSON object", number + 1))
        })?;
        reports.push(report);
    }
    Ok(reports)
}

fn parse_array<T: DeserializeOwned>(contents: &str, path: &Path) -> Result<Vec<T>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(contents).map_err(|e| Error::input(path, e.to_string()))
}

pub fn load_reports(path: &Path) -> Result<Vec<RawReport>> {
    parse_reports(&read_input(path)?, path)
}

pub fn parse_milestones(contents: &str, path: &Path) -> Result<Vec<LitigationMilestone>> {
    parse_array(contents, path)
}

pub fn load_milestones(path: &Path) -> Result<Vec<LitigationMilestone>> {
    parse_milestones(&read_input(path)?, path)
}

pub fn parse_devices(contents: &str, path: &Path) -> Result<Vec<Device>> {
    parse_array(contents, path)
}

pub fn load_devices(path: &Path) -> Result<Vec<Device>> {
    parse_devices(&read_input(path)?, path)
}
