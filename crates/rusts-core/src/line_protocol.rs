//! InfluxDB Line Protocol writer
//!
//! Format: measurement,tag1=value1,tag2=value2 field1=value1,field2=value2 timestamp
//!
//! Example: cpu,host=server01,region=us-west usage=64.5,cores=8i 1609459200000000000
//!
//! Points are streamed straight into the sink; nothing is concatenated into
//! an intermediate `String`.

use crate::types::{FieldValue, Point};
use std::io::{self, Write};

impl Point {
    /// Write this point as a single line-protocol line (with trailing newline)
    pub fn write_line_protocol<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        write_escaped(w, self.measurement, b", ")?;

        for tag in &self.tags {
            w.write_all(b",")?;
            write_escaped(w, tag.key, b", =")?;
            w.write_all(b"=")?;
            write_escaped(w, &tag.value, b", =")?;
        }

        for (i, field) in self.fields.iter().enumerate() {
            w.write_all(if i == 0 { b" " } else { b"," })?;
            write_escaped(w, field.key, b", =")?;
            w.write_all(b"=")?;
            write_field_value(w, &field.value)?;
        }

        writeln!(w, " {}", self.timestamp)
    }

    /// Render this point as a line-protocol string (without trailing newline)
    pub fn to_line_protocol(&self) -> String {
        let mut buf = Vec::with_capacity(128);
        // Writing into a Vec cannot fail
        let _ = self.write_line_protocol(&mut buf);
        buf.pop();
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn write_field_value<W: Write + ?Sized>(w: &mut W, value: &FieldValue) -> io::Result<()> {
    match value {
        FieldValue::Float(v) => write!(w, "{}", v),
        FieldValue::Integer(v) => write!(w, "{}i", v),
        FieldValue::UnsignedInteger(v) => write!(w, "{}u", v),
        FieldValue::Boolean(v) => w.write_all(if *v { b"true" } else { b"false" }),
    }
}

/// Writes `s`, backslash-escaping any byte found in `special`.
fn write_escaped<W: Write + ?Sized>(w: &mut W, s: &str, special: &[u8]) -> io::Result<()> {
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, b) in bytes.iter().enumerate() {
        if special.contains(b) {
            w.write_all(&bytes[start..i])?;
            w.write_all(&[b'\\', *b])?;
            start = i + 1;
        }
    }
    w.write_all(&bytes[start..])
}
