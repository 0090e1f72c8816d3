use chrono::NaiveDate;

/// Date format printed on detail pages, e.g. `Jan 5, 2021`
pub const PAGE_DATE_FORMAT: &str = "%b %d, %Y";

/// Parses a date as printed on a detail page
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use patent_harvester::extract::parse_page_date;
///
/// assert_eq!(
///     parse_page_date("Jan 5, 2021").unwrap(),
///     NaiveDate::from_ymd_opt(2021, 1, 5).unwrap()
/// );
/// assert!(parse_page_date("2021-01-05").is_err());
/// ```
pub fn parse_page_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text.trim(), PAGE_DATE_FORMAT)
}
