use std::fmt::Display;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]");

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmm`.
pub fn wire_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&TIMESTAMP_FORMAT)
        .unwrap_or_default()
}

/// Print one traced wire message to stdout:
/// `[src_ip:src_port,dst_ip:dst_port,timestamp] RAW`.
///
/// `raw` is the verbatim line, terminator included, so the trace reproduces
/// the wire byte-for-byte after the prefix.
pub fn wire_trace(src: impl Display, dst: impl Display, raw: &str) {
    print!("[{src},{dst},{}] {raw}", wire_timestamp());
}
