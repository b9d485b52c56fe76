//! Common routines for handling input data.
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fmt::Display;
use std::fs;
use std::path::Path;

pub mod rates;
pub use rates::read_rate_table;
pub mod year_record;
pub use year_record::read_year_records;

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<impl Iterator<Item = T>> {
    let vec = read_csv_internal(file_path)?;
    ensure!(!vec.is_empty(), "CSV file {} cannot be empty", file_path.display());

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file, returning `None` if the file doesn't exist.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<T: DeserializeOwned>(
    file_path: &Path,
) -> Result<Option<impl Iterator<Item = T>>> {
    if !file_path.exists() {
        return Ok(None);
    }

    Ok(Some(read_csv_internal(file_path)?.into_iter()))
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value must be between 0 and 1"))?;
    }

    Ok(value)
}

/// The largest amount accepted for any user-entered figure.
///
/// Larger values are reduced to this so that products and sums of figures stay finite.
pub const MAX_INPUT_VALUE: f64 = 1e15;

/// Parse a user-entered number leniently.
///
/// Values which are missing, non-numeric or non-finite are treated as zero, negative values are
/// raised to zero and values above [`MAX_INPUT_VALUE`] are reduced to it. A warning is logged
/// whenever a value is changed.
///
/// # Arguments
///
/// * `field` - Name of the field, for warnings
/// * `context` - Where the value came from (e.g. the year), for warnings
/// * `raw` - The value as entered
pub fn parse_non_negative<C: Display>(field: &str, context: C, raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > MAX_INPUT_VALUE => {
            warn!("{context}: value {value} for {field} is too large; using {MAX_INPUT_VALUE}");
            MAX_INPUT_VALUE
        }
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        Ok(value) if value.is_finite() => {
            warn!("{context}: negative value {value} for {field} treated as zero");
            0.0
        }
        _ => {
            warn!("{context}: invalid value '{raw}' for {field} treated as zero");
            0.0
        }
    }
}

/// Parse a user-entered percentage leniently, clamping it to lie between 0 and 100
pub fn parse_percentage<C: Display>(field: &str, context: C, raw: &str) -> f64 {
    let value = parse_non_negative(field, &context, raw);
    if value > 100.0 {
        warn!("{context}: {field} of {value} exceeds 100%; using 100");
        return 100.0;
    }

    value
}

/// Parse a user-entered count leniently, rounding to the nearest whole number
pub fn parse_count<C: Display>(field: &str, context: C, raw: &str) -> u32 {
    let value = parse_non_negative(field, context, raw).round();
    if value >= u32::MAX as f64 {
        u32::MAX
    } else {
        value as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello,1\n world , 2\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: 1,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                }
            ]
        );

        // File with no data (only column headers)
        let file_path = create_csv_file(dir.path(), "id,value\n");
        assert!(read_csv::<Record>(&file_path).is_err());
        assert!(
            read_csv_optional::<Record>(&file_path)
                .unwrap()
                .unwrap()
                .next()
                .is_none()
        );

        // Missing file
        let dir = tempdir().unwrap();
        assert!(
            read_csv_optional::<Record>(&dir.path().join("a.csv"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "value = 1").unwrap();
        }

        #[derive(Debug, Deserialize, PartialEq)]
        struct Value {
            value: u32,
        }
        assert_eq!(read_toml::<Value>(&file_path).unwrap(), Value { value: 1 });
        assert!(read_toml::<Value>(&dir.path().join("missing.toml")).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Proportion {
        #[serde(deserialize_with = "deserialise_proportion")]
        value: f64,
    }

    #[rstest]
    #[case("value = 0.0", true)]
    #[case("value = 0.5", true)]
    #[case("value = 1.0", true)]
    #[case("value = -1.0", false)]
    #[case("value = 1.5", false)]
    fn test_deserialise_proportion(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(toml::from_str::<Proportion>(input).is_ok(), valid);
    }

    #[rstest]
    #[case("1500.5", 1500.5)]
    #[case(" 42 ", 42.0)]
    #[case("", 0.0)]
    #[case("-10", 0.0)]
    #[case("abc", 0.0)]
    #[case("NaN", 0.0)]
    #[case("inf", 0.0)]
    #[case("1e15", 1e15)]
    #[case("1e308", MAX_INPUT_VALUE)]
    #[case("1.7e308", MAX_INPUT_VALUE)]
    fn test_parse_non_negative(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(parse_non_negative("external_cost", 2024, raw), expected);
    }

    #[rstest]
    #[case("50", 50.0)]
    #[case("150", 100.0)]
    #[case("-5", 0.0)]
    fn test_parse_percentage(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(parse_percentage("rd_share", 2024, raw), expected);
    }

    #[rstest]
    #[case("3", 3)]
    #[case("2.6", 3)]
    #[case("-1", 0)]
    #[case("x", 0)]
    #[case("1e308", u32::MAX)]
    fn test_parse_count(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(parse_count("staff_count", 2024, raw), expected);
    }
}
