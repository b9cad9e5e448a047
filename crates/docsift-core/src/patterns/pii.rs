//! PII catalogue: South African identity and contact details plus
//! demographic mentions.

use super::{Catalogue, KeywordMatcher, RegexMatcher};
use crate::record::Category;

pub const ID_NUMBER: Category = Category::new("id_number");
pub const PASSPORT: Category = Category::new("passport");
pub const CELLPHONE: Category = Category::new("cellphone");
pub const LANDLINE: Category = Category::new("landline");
pub const EMAIL: Category = Category::new("email");
pub const IP_ADDRESS: Category = Category::new("ip_address");
pub const COUNTRY: Category = Category::new("country");
pub const GENDER: Category = Category::new("gender");
pub const RACE: Category = Category::new("race");

/// Report column headings, in catalogue order.
pub const COLUMNS: [(Category, &str); 9] = [
    (ID_NUMBER, "ID Number"),
    (PASSPORT, "Passport Number"),
    (CELLPHONE, "Cellphone Number"),
    (LANDLINE, "Landline Number"),
    (EMAIL, "Email"),
    (IP_ADDRESS, "IP Address"),
    (COUNTRY, "Country"),
    (GENDER, "Gender"),
    (RACE, "Race"),
];

/// `YYMMDD SSSS C A Z` with optional runs of separators between digit groups.
pub const ID_NUMBER_PATTERN: &str = r"\b\d{2}(?:0[1-9]|1[0-2])(?:0[1-9]|[12]\d|3[01])[-.,#$%& ]*\d{4}[-.,#$%& ]*\d[-.,#$%& ]*\d[-.,#$%& ]*\d\b";

pub const PASSPORT_PATTERN: &str = r"\b[ADMT]\d{8}\b";

pub const CELLPHONE_PATTERN: &str = r"(?:(?:\+27|\b0027|\b27|\b0) ?|\b)[5-9]\d(?: ?\d){7}\b";

/// A bracketed area code keeps its opening bracket.
pub const LANDLINE_PATTERN: &str = r"(?:\+27|\(?\b0)[-. (]*[1-5]\d[-. )]*\d{3}[-. ]*\d{4}\b";

pub const EMAIL_PATTERN: &str = r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b";

pub const IP_ADDRESS_PATTERN: &str = concat!(
    r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b",
    "|",
    r"\b(?:(?:[0-9A-Fa-f]{1,4}:){7}[0-9A-Fa-f]{1,4}|(?:[0-9A-Fa-f]{1,4}:){1,6}(?::[0-9A-Fa-f]{1,4}){1,6})\b",
);

pub const GENDER_PATTERN: &str = r"(?i:\b(?:male|female|not prefer to say)\b)|\b[MmFf]\b";

pub const COUNTRIES: &[&str] = &[
    "Afghanistan", "Albania", "Algeria", "Angola", "Argentina", "Armenia", "Australia",
    "Austria", "Bangladesh", "Belgium", "Botswana", "Brazil", "Bulgaria", "Burundi",
    "Cameroon", "Canada", "Chile", "China", "Colombia", "Congo", "Croatia", "Cuba",
    "Czech Republic", "Denmark", "Egypt", "Eswatini", "Ethiopia", "Finland", "France",
    "Germany", "Ghana", "Greece", "Hungary", "India", "Indonesia", "Iran", "Iraq", "Ireland",
    "Israel", "Italy", "Jamaica", "Japan", "Kenya", "Lesotho", "Liberia", "Madagascar",
    "Malawi", "Malaysia", "Mali", "Mauritius", "Mexico", "Morocco", "Mozambique", "Namibia",
    "Netherlands", "New Zealand", "Nigeria", "Norway", "Oman", "Pakistan", "Peru",
    "Philippines", "Poland", "Portugal", "Qatar", "Romania", "Russia", "Rwanda",
    "Saudi Arabia", "Senegal", "Singapore", "Somalia", "South Africa", "South Korea",
    "Spain", "Sri Lanka", "Sudan", "Swaziland", "Sweden", "Switzerland", "Tanzania",
    "Thailand", "Tunisia", "Turkey", "Uganda", "Ukraine", "United Arab Emirates",
    "United Kingdom", "United States", "Vietnam", "Zambia", "Zimbabwe",
];

pub const RACES: &[&str] = &[
    "black", "white", "coloured", "colored", "indian", "asian", "african", "caucasian",
    "hispanic", "latino", "latina", "mixed race", "multiracial", "khoisan", "arab",
];

/// Drops separator punctuation so every surface form of one identity
/// number compares equal.
pub fn strip_id_separators(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

pub fn catalogue() -> Result<Catalogue, regex::Error> {
    Ok(Catalogue::new("pii")
        .with_matcher(
            RegexMatcher::new(ID_NUMBER, ID_NUMBER_PATTERN)?.with_normalizer(strip_id_separators),
        )
        .with_matcher(RegexMatcher::new(PASSPORT, PASSPORT_PATTERN)?)
        .with_matcher(RegexMatcher::new(CELLPHONE, CELLPHONE_PATTERN)?)
        .with_matcher(RegexMatcher::new(LANDLINE, LANDLINE_PATTERN)?)
        .with_matcher(RegexMatcher::new(EMAIL, EMAIL_PATTERN)?)
        .with_matcher(RegexMatcher::new(IP_ADDRESS, IP_ADDRESS_PATTERN)?)
        .with_matcher(KeywordMatcher::new(COUNTRY, COUNTRIES.iter().copied()))
        .with_matcher(RegexMatcher::new(GENDER, GENDER_PATTERN)?)
        .with_matcher(KeywordMatcher::new(RACE, RACES.iter().copied())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::Matcher;

    fn found(pattern: &str, text: &str) -> Vec<String> {
        RegexMatcher::new(Category::new("test"), pattern)
            .unwrap()
            .find(text)
            .into_iter()
            .map(|m| m.value)
            .collect()
    }

    #[test]
    fn test_contact_line() {
        let set = catalogue()
            .unwrap()
            .find_all("Contact: jane.doe@example.co.za, phone 0821234567, ID 8801015800085");

        assert_eq!(set.count(EMAIL), 1);
        assert_eq!(set.count(CELLPHONE), 1);
        assert_eq!(set.count(ID_NUMBER), 1);
        assert_eq!(set.get(ID_NUMBER)[0].value, "8801015800085");
        assert_eq!(set.get(EMAIL)[0].value, "jane.doe@example.co.za");
        assert!(set.is_empty(LANDLINE));
        assert!(set.is_empty(PASSPORT));
    }

    #[test]
    fn test_id_number_separators_dedup() {
        let set = catalogue()
            .unwrap()
            .find_all("IDs: 8801015800085 and 880101 5800 085 and 880101-5800-0-8-5");

        assert_eq!(set.count(ID_NUMBER), 3);
        let unique: Vec<_> = set.unique_values(ID_NUMBER).into_iter().collect();
        assert_eq!(unique, ["8801015800085"]);
    }

    #[test]
    fn test_id_number_separator_runs() {
        let set = catalogue()
            .unwrap()
            .find_all("ID no. 880101 - 5800 085, copy 880101--5800..0 8 5");

        assert_eq!(set.count(ID_NUMBER), 2);
        let unique: Vec<_> = set.unique_values(ID_NUMBER).into_iter().collect();
        assert_eq!(unique, ["8801015800085"]);
    }

    #[test]
    fn test_id_number_rejects_bad_month() {
        assert!(found(ID_NUMBER_PATTERN, "8813015800085").is_empty());
    }

    #[test]
    fn test_passport() {
        assert_eq!(
            found(PASSPORT_PATTERN, "passports A12345678, M98765432, X12345678, T1234567"),
            ["A12345678", "M98765432"]
        );
    }

    #[test]
    fn test_cellphone_prefixes() {
        assert_eq!(
            found(CELLPHONE_PATTERN, "call +27 82 123 4567 or 0027721234567 or 0611234567"),
            ["+27 82 123 4567", "0027721234567", "0611234567"]
        );
    }

    #[test]
    fn test_landline() {
        assert_eq!(
            found(
                LANDLINE_PATTERN,
                "office (011) 555-1234, fax 021 123 4567, head office +27 11 555 1234, cell 0821234567"
            ),
            ["(011) 555-1234", "021 123 4567", "+27 11 555 1234"]
        );
    }

    #[test]
    fn test_ip_addresses() {
        assert_eq!(
            found(IP_ADDRESS_PATTERN, "hosts 192.168.0.1, 256.1.1.1, fe80::1 and 2001:db8::8a2e:370:7334"),
            ["192.168.0.1", "fe80::1", "2001:db8::8a2e:370:7334"]
        );
    }

    #[test]
    fn test_gender() {
        assert_eq!(
            found(GENDER_PATTERN, "Sex: Female. Gender: M. Other: not prefer to say"),
            ["Female", "M", "not prefer to say"]
        );
    }

    #[test]
    fn test_country_substring() {
        let set = catalogue()
            .unwrap()
            .find_all("Resident of Indiana; the woman signed. Born in south africa.");
        assert_eq!(set.values_in_order(COUNTRY), ["India", "Oman", "South Africa"]);
    }

    #[test]
    fn test_race_substring() {
        let set = catalogue()
            .unwrap()
            .find_all("Race: Black. Population group: COLOURED");
        assert_eq!(set.values_in_order(RACE), ["black", "coloured"]);
    }
}
