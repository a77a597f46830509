//! Search-URL construction for the marketplace's result page.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use dealhawk_core::Department;

/// Everything except unreserved characters is percent-encoded in the query
/// value; spaces become `%20`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Builds the search URL for `query`, refined to the department's catalog
/// section unless the department is [`Department::All`].
#[must_use]
pub fn build_search_url(origin: &str, query: &str, department: Department) -> String {
    let encoded = utf8_percent_encode(query, QUERY_VALUE);
    match department.refinement() {
        Some(section) => format!("{origin}/s?k={encoded}&i={section}"),
        None => format!("{origin}/s?k={encoded}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.amazon.in";

    #[test]
    fn plain_query_without_refinement() {
        assert_eq!(
            build_search_url(ORIGIN, "banana", Department::All),
            "https://www.amazon.in/s?k=banana"
        );
    }

    #[test]
    fn department_adds_refinement_parameter() {
        assert_eq!(
            build_search_url(ORIGIN, "iphone", Department::Electronics),
            "https://www.amazon.in/s?k=iphone&i=electronics"
        );
        assert_eq!(
            build_search_url(ORIGIN, "macbook", Department::Computers),
            "https://www.amazon.in/s?k=macbook&i=computers"
        );
    }

    #[test]
    fn query_is_percent_encoded() {
        assert_eq!(
            build_search_url(ORIGIN, "iPhone 14 Pro", Department::Electronics),
            "https://www.amazon.in/s?k=iPhone%2014%20Pro&i=electronics"
        );
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let url = build_search_url(ORIGIN, "usb-c & hub?", Department::All);
        assert_eq!(url, "https://www.amazon.in/s?k=usb-c%20%26%20hub%3F");
    }
}
