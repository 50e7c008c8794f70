use crate::codec::json_type_name;
use crate::domain::model::{CsvOptions, Format, Record, SchemaPolicy};
use crate::utils::error::{ConvertError, Result};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::io::Read;

/// Decodes delimited text with a header row into records.
///
/// Field `i` of every row is stored under `header[i]`, in header order. A row
/// with a different field count than the header is rejected as
/// [`ConvertError::MalformedRow`]; unbalanced quoting is a
/// [`ConvertError::ParseError`].
pub fn decode<R: Read>(mut source: R, options: &CsvOptions) -> Result<Vec<Record>> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    check_quoting(&bytes, options.delimiter)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(ConvertError::ParseError {
            format: Format::Csv,
            message: "missing header row".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for name in header.iter() {
        if !seen.insert(name) {
            return Err(ConvertError::ParseError {
                format: Format::Csv,
                message: format!("duplicate column name '{}'", name),
            });
        }
    }

    tracing::debug!("CSV header: {:?}", header);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() != header.len() {
            return Err(ConvertError::MalformedRow {
                line: row.position().map(|p| p.line()).unwrap_or_default(),
                expected: header.len(),
                found: row.len(),
            });
        }

        let record: Record = header
            .iter()
            .zip(row.iter())
            .map(|(name, field)| (name, Value::String(field.to_string())))
            .collect();
        records.push(record);
    }

    Ok(records)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Rejects the quoting the `csv` reader would otherwise accept: a quote
/// inside an unquoted field, text after a closing quote, and a quoted field
/// left open at end of input.
fn check_quoting(bytes: &[u8], delimiter: u8) -> Result<()> {
    let malformed = |line: u64, message: &str| ConvertError::ParseError {
        format: Format::Csv,
        message: format!("{} on line {}", message, line),
    };

    let mut state = QuoteState::FieldStart;
    let mut line = 1u64;
    let mut opened_on = 1u64;

    for &byte in bytes {
        let ends_field = byte == delimiter || byte == b'\n' || byte == b'\r';

        state = match (state, byte) {
            (QuoteState::FieldStart, b'"') => {
                opened_on = line;
                QuoteState::Quoted
            }
            (QuoteState::FieldStart, _) if ends_field => QuoteState::FieldStart,
            (QuoteState::FieldStart, _) => QuoteState::Unquoted,
            (QuoteState::Unquoted, b'"') => {
                return Err(malformed(line, "bare quote in unquoted field"))
            }
            (QuoteState::Unquoted, _) if ends_field => QuoteState::FieldStart,
            (QuoteState::Unquoted, _) => QuoteState::Unquoted,
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, _) if ends_field => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted, _) => {
                return Err(malformed(line, "unexpected text after closing quote"))
            }
        };

        if byte == b'\n' {
            line += 1;
        }
    }

    if state == QuoteState::Quoted {
        return Err(malformed(opened_on, "unterminated quoted field starting"));
    }
    Ok(())
}

/// Works out the CSV column order for `records` under `policy`.
///
/// Columns are sorted by byte order. Fails with [`ConvertError::EmptyInput`]
/// when there is no record or no field to build a column from, and under
/// [`SchemaPolicy::Strict`] on any record whose key set differs from the
/// first record's.
pub fn derive_header(records: &[Record], policy: SchemaPolicy) -> Result<Vec<String>> {
    let first = records.first().ok_or(ConvertError::EmptyInput)?;

    match policy {
        SchemaPolicy::Strict => {
            let header: BTreeSet<&String> = first.keys().collect();
            for (index, record) in records.iter().enumerate().skip(1) {
                let keys: BTreeSet<&String> = record.keys().collect();
                if keys != header {
                    return Err(ConvertError::SchemaMismatch {
                        record: index,
                        missing: header.difference(&keys).map(|k| k.to_string()).collect(),
                        unexpected: keys.difference(&header).map(|k| k.to_string()).collect(),
                    });
                }
            }
            if first.is_empty() {
                return Err(ConvertError::EmptyInput);
            }
            Ok(header.into_iter().cloned().collect())
        }
        SchemaPolicy::Union => {
            if records.iter().all(Record::is_empty) {
                return Err(ConvertError::EmptyInput);
            }
            let header: BTreeSet<&String> = records.iter().flat_map(|r| r.keys()).collect();
            Ok(header.into_iter().cloned().collect())
        }
    }
}

/// Encodes records as CSV text with a sorted header row.
///
/// Returns the header alongside the text. Only JSON strings are written;
/// any other value at a header key is a [`ConvertError::TypeError`].
pub fn encode(records: &[Record], options: &CsvOptions) -> Result<(Vec<String>, String)> {
    let header = derive_header(records, options.schema)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(Vec::new());
    writer.write_record(&header)?;

    for (index, record) in records.iter().enumerate() {
        let mut row = Vec::with_capacity(header.len());
        for key in &header {
            match record.get(key) {
                Some(Value::String(text)) => row.push(text.as_str()),
                // only reachable under SchemaPolicy::Union
                None => row.push(""),
                Some(other) => {
                    return Err(ConvertError::TypeError {
                        record: index,
                        field: key.clone(),
                        found: json_type_name(other),
                    })
                }
            }
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConvertError::IoError(e.into_error()))?;
    let text = String::from_utf8(bytes).map_err(|e| ConvertError::SerializationError {
        message: e.to_string(),
    })?;

    Ok((header, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    fn decode_str(input: &str) -> Result<Vec<Record>> {
        decode(input.as_bytes(), &CsvOptions::default())
    }

    #[test]
    fn test_decode_zips_header_with_rows() {
        let records = decode_str("name,age\nAda,36\nGrace,45\n").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("name"), Some(&json!("Ada")));
        assert_eq!(records[0].get("age"), Some(&json!("36")));
        assert_eq!(records[1].get("name"), Some(&json!("Grace")));

        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, ["name", "age"]);
    }

    #[test]
    fn test_decode_keeps_values_as_text() {
        let records = decode_str("n,flag,empty\n42,true,\n").unwrap();

        assert_eq!(records[0].get("n"), Some(&json!("42")));
        assert_eq!(records[0].get("flag"), Some(&json!("true")));
        assert_eq!(records[0].get("empty"), Some(&json!("")));
    }

    #[test]
    fn test_decode_quoted_fields() {
        let records = decode_str("id,note\n1,\"hello, world\"\n2,\"say \"\"hi\"\"\"\n").unwrap();

        assert_eq!(records[0].get("note"), Some(&json!("hello, world")));
        assert_eq!(records[1].get("note"), Some(&json!("say \"hi\"")));
    }

    #[test]
    fn test_decode_short_row_is_malformed() {
        match decode_str("a,b,c\n1,2\n") {
            Err(ConvertError::MalformedRow {
                line,
                expected,
                found,
            }) => {
                assert_eq!(line, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_long_row_is_malformed() {
        let result = decode_str("a,b\n1,2\n3,4,5\n");
        assert!(matches!(
            result,
            Err(ConvertError::MalformedRow {
                line: 3,
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_decode_header_only() {
        let records = decode_str("a,b,c\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_decode_empty_input_has_no_header() {
        assert!(matches!(
            decode_str(""),
            Err(ConvertError::ParseError {
                format: Format::Csv,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_duplicate_header() {
        match decode_str("id,id\n1,2\n") {
            Err(ConvertError::ParseError { message, .. }) => assert!(message.contains("'id'")),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let input: &[u8] = b"name\n\xff\xfe\n";
        let result = decode(input, &CsvOptions::default());
        assert!(matches!(result, Err(ConvertError::CsvError(_))));
    }

    #[test]
    fn test_decode_unterminated_quote() {
        match decode_str("a,b\n1,\"2\n") {
            Err(ConvertError::ParseError { format, message }) => {
                assert_eq!(format, Format::Csv);
                assert_eq!(message, "unterminated quoted field starting on line 2");
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_bare_quote_in_unquoted_field() {
        match decode_str("a,b\n1,x\"y\n") {
            Err(ConvertError::ParseError { message, .. }) => {
                assert_eq!(message, "bare quote in unquoted field on line 2");
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_text_after_closing_quote() {
        assert!(matches!(
            decode_str("a,b\n\"1\"x,2\n"),
            Err(ConvertError::ParseError { .. })
        ));
    }

    #[test]
    fn test_decode_accepts_escaped_and_empty_quotes() {
        let records = decode_str("a,b,c\r\n\"\",\"\"\"\"\",\"x\ny\"\r\n").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("a"), Some(&json!("")));
        assert_eq!(records[0].get("b"), Some(&json!("\"")));
        assert_eq!(records[0].get("c"), Some(&json!("x\ny")));
    }

    #[test]
    fn test_decode_custom_delimiter() {
        let options = CsvOptions {
            delimiter: b';',
            ..CsvOptions::default()
        };
        let records = decode("a;b\n1,5;2\n".as_bytes(), &options).unwrap();

        assert_eq!(records[0].get("a"), Some(&json!("1,5")));
        assert_eq!(records[0].get("b"), Some(&json!("2")));
    }

    #[test]
    fn test_encode_sorts_header() {
        let records = vec![
            record(&[("b", json!("2")), ("a", json!("1"))]),
            record(&[("a", json!("3")), ("b", json!("4"))]),
        ];

        let (header, text) = encode(&records, &CsvOptions::default()).unwrap();

        assert_eq!(header, ["a", "b"]);
        assert_eq!(text, "a,b\n1,2\n3,4\n");
    }

    #[test]
    fn test_encode_header_uses_byte_order() {
        let records = vec![record(&[
            ("beta", json!("1")),
            ("Zed", json!("2")),
            ("alpha", json!("3")),
            ("_x", json!("4")),
        ])];

        let (header, _) = encode(&records, &CsvOptions::default()).unwrap();
        assert_eq!(header, ["Zed", "_x", "alpha", "beta"]);
    }

    #[test]
    fn test_encode_empty_input() {
        assert!(matches!(
            encode(&[], &CsvOptions::default()),
            Err(ConvertError::EmptyInput)
        ));
    }

    #[test]
    fn test_encode_keyless_records() {
        let records = vec![Record::new()];
        assert!(matches!(
            encode(&records, &CsvOptions::default()),
            Err(ConvertError::EmptyInput)
        ));

        let options = CsvOptions {
            schema: SchemaPolicy::Union,
            ..CsvOptions::default()
        };
        assert!(matches!(
            encode(&[Record::new(), Record::new()], &options),
            Err(ConvertError::EmptyInput)
        ));
    }

    #[test]
    fn test_encode_keyless_first_record_is_a_mismatch() {
        let records = vec![Record::new(), record(&[("a", json!("1"))])];
        assert!(matches!(
            encode(&records, &CsvOptions::default()),
            Err(ConvertError::SchemaMismatch { record: 1, .. })
        ));
    }

    #[test]
    fn test_encode_rejects_non_text_values() {
        let records = vec![
            record(&[("id", json!("1")), ("score", json!("9"))]),
            record(&[("id", json!("2")), ("score", json!(7))]),
        ];

        match encode(&records, &CsvOptions::default()) {
            Err(ConvertError::TypeError {
                record,
                field,
                found,
            }) => {
                assert_eq!(record, 1);
                assert_eq!(field, "score");
                assert_eq!(found, "a number");
            }
            other => panic!("expected TypeError, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_rejects_null_and_nested() {
        let nulls = vec![record(&[("a", Value::Null)])];
        assert!(matches!(
            encode(&nulls, &CsvOptions::default()),
            Err(ConvertError::TypeError { found: "null", .. })
        ));

        let nested = vec![record(&[("a", json!({"inner": "x"}))])];
        assert!(matches!(
            encode(&nested, &CsvOptions::default()),
            Err(ConvertError::TypeError {
                found: "an object",
                ..
            })
        ));
    }

    #[test]
    fn test_encode_strict_rejects_heterogeneous_records() {
        let records = vec![
            record(&[("a", json!("1")), ("b", json!("2"))]),
            record(&[("a", json!("3")), ("c", json!("4"))]),
        ];

        match encode(&records, &CsvOptions::default()) {
            Err(ConvertError::SchemaMismatch {
                record,
                missing,
                unexpected,
            }) => {
                assert_eq!(record, 1);
                assert_eq!(missing, ["b"]);
                assert_eq!(unexpected, ["c"]);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_union_fills_missing_fields() {
        let records = vec![
            record(&[("a", json!("1")), ("b", json!("2"))]),
            record(&[("c", json!("3")), ("a", json!("4"))]),
        ];
        let options = CsvOptions {
            schema: SchemaPolicy::Union,
            ..CsvOptions::default()
        };

        let (header, text) = encode(&records, &options).unwrap();

        assert_eq!(header, ["a", "b", "c"]);
        assert_eq!(text, "a,b,c\n1,2,\n4,,3\n");
    }

    #[test]
    fn test_encode_quotes_when_needed() {
        let records = vec![record(&[
            ("note", json!("hello, world")),
            ("quote", json!("say \"hi\"")),
        ])];

        let (_, text) = encode(&records, &CsvOptions::default()).unwrap();
        assert_eq!(text, "note,quote\n\"hello, world\",\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let records = vec![
            record(&[
                ("name", json!("Ada Lovelace")),
                ("motto", json!("poetical, \"science\"")),
                ("lines", json!("one\ntwo")),
            ]),
            record(&[
                ("lines", json!("")),
                ("name", json!("Grace Hopper")),
                ("motto", json!("ship it")),
            ]),
        ];

        let (_, text) = encode(&records, &CsvOptions::default()).unwrap();
        let decoded = decode(text.as_bytes(), &CsvOptions::default()).unwrap();

        assert_eq!(decoded.len(), records.len());
        for (original, back) in records.iter().zip(&decoded) {
            assert_eq!(original.len(), back.len());
            for key in original.keys() {
                assert_eq!(original.get(key), back.get(key), "key {}", key);
            }
        }
    }
}
