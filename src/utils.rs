use chrono::{NaiveDate, NaiveDateTime};

const DRAW_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses a comma separated open code into six regular numbers plus the special.
pub fn parse_open_code(open_code: &str) -> Option<[u8; 7]> {
    let parsed = open_code
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok().filter(|n| (1..=49).contains(n)))
        .collect::<Option<Vec<u8>>>()?;

    parsed.try_into().ok()
}

pub fn parse_draw_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DRAW_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// The sequence id following `expect`, keeping its zero padding.
pub fn next_expect(expect: &str) -> Option<String> {
    let value: u64 = expect.trim().parse().ok()?;
    let next = value.checked_add(1)?;
    Some(format!("{:0>width$}", next, width = expect.trim().len()))
}

pub fn format_number(number: u8) -> String {
    format!("{:02}", number)
}
