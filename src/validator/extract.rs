//! City/country extraction from a comma-separated address.

use crate::reference::{CountryMapping, Gazetteer};

/// Longest city phrase tried, in words
const MAX_CITY_WORDS: usize = 2;

/// Extract `(city, country)` from `address`, both lowercased.
///
/// The country is the last segment, or the last two when `two_parts` is set
/// and that two-segment phrase has its own alias entry. It is returned in
/// normalized form. The city is the first word or adjacent word pair, scanning
/// the remaining segments right to left, that the gazetteer confirms belongs
/// to that country. Phrases containing digits in any script are skipped.
///
/// Returns `("", "")` when no country can be read and `("", country)` when no
/// city is confirmed.
pub fn extract_city_country(
    address: &str,
    two_parts: bool,
    mapping: &CountryMapping,
    gazetteer: &Gazetteer,
) -> (String, String) {
    if address.is_empty() {
        return (String::new(), String::new());
    }

    let address = address.to_lowercase();
    let parts: Vec<&str> = address.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return (String::new(), String::new());
    }

    let Some(country) = mapping.resolve_tail(&parts, two_parts) else {
        return (String::new(), String::new());
    };
    if country.name.is_empty() {
        return (String::new(), String::new());
    }

    let remaining = &parts[..parts.len() - country.segments];
    for part in remaining.iter().rev().filter(|p| !p.is_empty()) {
        let words: Vec<&str> = part.split_whitespace().collect();

        for end in 0..words.len() {
            let start = (end + 1).saturating_sub(MAX_CITY_WORDS);
            // Single word first, then the pair ending on it
            for begin in (start..=end).rev() {
                let candidate = words[begin..=end].join(" ");
                if candidate.chars().any(char::is_numeric) {
                    continue;
                }
                if gazetteer.city_in_country(&candidate, &country.name) {
                    return (candidate, country.name);
                }
            }
        }
    }

    (String::new(), country.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate_address_region;

    fn gazetteer() -> Gazetteer {
        Gazetteer::from_records(
            [
                ("London", "GB"),
                ("Melbourne", "AU"),
                ("Berlin", "DE"),
                ("Cape Town", "ZA"),
                ("Brazzaville", "CG"),
                ("Kinshasa", "CD"),
            ],
            [
                ("GB", "United Kingdom"),
                ("AU", "Australia"),
                ("DE", "Germany"),
                ("ZA", "South Africa"),
                ("CG", "Republic of the Congo"),
                ("CD", "Democratic Republic of the Congo"),
                ("YE", "Yemen"),
            ],
        )
    }

    fn extract(address: &str, two_parts: bool) -> (String, String) {
        extract_city_country(address, two_parts, &CountryMapping::default(), &gazetteer())
    }

    fn pair(city: &str, country: &str) -> (String, String) {
        (city.to_string(), country.to_string())
    }

    #[test]
    fn test_canonical_examples() {
        assert_eq!(
            extract("115 New Cavendish Street, London W1T 5DU, United Kingdom", false),
            pair("london", "united kingdom")
        );
        assert_eq!(
            extract("223 William Street, Melbourne VIC 3000, Australia", false),
            pair("melbourne", "australia")
        );
        assert_eq!(
            extract("Rosenthaler Straße 1, 10119 Berlin, Germany", false),
            pair("berlin", "germany")
        );
        assert_eq!(
            extract("3 Upper Alma Road, Rosebank, Cape Town, 7700, South Africa", false),
            pair("cape town", "south africa")
        );
    }

    #[test]
    fn test_country_without_city() {
        assert_eq!(extract("6, Yemen", false), pair("", "yemen"));
        assert_eq!(extract("6 , Yemen", false), pair("", "yemen"));
    }

    #[test]
    fn test_no_country() {
        assert_eq!(extract("", false), pair("", ""));
        assert_eq!(extract("London", false), pair("", ""));
        assert_eq!(extract("12 Baker Street, London, ", false), pair("", ""));
    }

    #[test]
    fn test_country_alias_is_normalized() {
        assert_eq!(
            extract("10 Downing Street, London, SW1A 2AA, UK", false),
            pair("london", "united kingdom")
        );
    }

    #[test]
    fn test_two_part_country() {
        let address = "12 Avenue Foch, Brazzaville, Congo, Republic of the";
        assert_eq!(extract(address, true), pair("brazzaville", "republic of the congo"));
        // Without the flag the last segment alone is taken as the country
        assert_eq!(extract(address, false), pair("", "republic of the"));
    }

    #[test]
    fn test_rightmost_city_wins() {
        let g = Gazetteer::from_records(
            [("Paris", "US"), ("London", "US")],
            [("US", "United States")],
        );
        let (city, country) = extract_city_country(
            "1 Paris Road, London, Ohio, USA",
            false,
            &CountryMapping::default(),
            &g,
        );
        assert_eq!(city, "london");
        assert_eq!(country, "united states");
    }

    #[test]
    fn test_non_ascii_digits_are_skipped() {
        let g = Gazetteer::from_records([("Karte Parwan", "AF")], [("AF", "Afghanistan")]);
        let mapping = CountryMapping::default();
        let address = "Street 4, Karte ۳, Afghanistan";

        assert_eq!(
            extract_city_country(address, false, &mapping, &g),
            pair("", "afghanistan")
        );
        assert!(!validate_address_region(address, "Afghanistan", &mapping, &g));

        // The same phrase without a house number still reaches the gazetteer
        assert_eq!(
            extract_city_country("Street 4, Karte Seh, Afghanistan", false, &mapping, &g),
            pair("karte seh", "afghanistan")
        );
    }

    #[test]
    fn test_empty_country_implies_empty_city() {
        for address in ["", ",", "London,", "a, b, ", "115 New Cavendish Street, London W1T 5DU, United Kingdom"] {
            let (city, country) = extract(address, false);
            if country.is_empty() {
                assert!(city.is_empty(), "{address:?} gave city without country");
            }
        }
    }
}
