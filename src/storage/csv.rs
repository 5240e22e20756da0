//! Minimal CSV dialect shared by the feature table, the failure log and the ledger reader.

/// Quote a field containing a comma, quote or line break; inner quotes are doubled.
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Float cell in shortest round-trip form. Integral values keep a `.0`, decimal exponents
/// below -4 or from 16 up switch to `1e-05` / `1e+16` notation, non-finite values read
/// `nan` / `inf` / `-inf`.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        let s = if v > 0.0 { "inf" } else { "-inf" };
        return s.to_string();
    }
    let sci = format!("{v:e}");
    let exponent = sci
        .split_once('e')
        .and_then(|(mantissa, exp)| exp.parse::<i32>().ok().map(|exp| (mantissa, exp)));
    match exponent {
        Some((mantissa, exp)) if !(-4..16).contains(&exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        _ if v == v.trunc() => format!("{v:.1}"),
        _ => format!("{v}"),
    }
}

/// Length of the prefix made of newline-terminated lines; anything after it is a torn write.
pub fn complete_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1)
}

/// One line, newline included.
pub fn format_record<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Split CSV text into records. Blank lines are skipped; `\r\n` and `\n` both end a record.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut started = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                started = true;
            }
            '\r' => {}
            '\n' => {
                if started {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                started = false;
            }
            _ => {
                field.push(c);
                started = true;
            }
        }
    }
    if started {
        record.push(field);
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_only_when_needed() {
        assert_eq!(escape_field("plain/path.dot"), "plain/path.dot");
        assert_eq!(escape_field("a,b.dot"), "\"a,b.dot\"");
        assert_eq!(escape_field("say \"x\""), "\"say \"\"x\"\"\"");
    }

    #[test]
    fn floats_render_like_the_table_expects() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn floats_switch_to_exponent_outside_the_plain_range() {
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(-2.5e-12), "-2.5e-12");
        assert_eq!(format_float(9999999999999998.0), "9999999999999998.0");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.2345678901234568e17), "1.2345678901234568e+17");
        assert_eq!(format_float(1e300), "1e+300");
    }

    #[test]
    fn complete_len_stops_at_last_newline() {
        assert_eq!(complete_len(b""), 0);
        assert_eq!(complete_len(b"Filename,Lab"), 0);
        assert_eq!(complete_len(b"h\nrow\n"), 6);
        assert_eq!(complete_len(b"h\nrow\nA.dot,Malic"), 6);
    }

    #[test]
    fn records_roundtrip_through_quoting() {
        let line = format_record(&["Malicious/a,b.dot", "Malicious", "3"]);
        let parsed = parse_records(&line);
        assert_eq!(parsed, vec![vec!["Malicious/a,b.dot", "Malicious", "3"]]);
    }

    #[test]
    fn parses_crlf_blank_lines_and_embedded_newlines() {
        let text = "Filename,Label\r\n\r\nx.dot,Malicious\r\n\"multi\nline.dot\",Nonmalicious";
        let parsed = parse_records(text);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1], vec!["x.dot", "Malicious"]);
        assert_eq!(parsed[2][0], "multi\nline.dot");
    }
}
