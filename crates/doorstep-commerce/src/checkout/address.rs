//! City and pincode lookup over the bundled address table.

use serde::Serialize;

/// One row of the address table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    pub city: &'static str,
    pub state: &'static str,
    pub pincode: &'static str,
}

const fn row(city: &'static str, state: &'static str, pincode: &'static str) -> AddressRecord {
    AddressRecord {
        city,
        state,
        pincode,
    }
}

/// Bundled service-area table.
pub const ADDRESS_TABLE: &[AddressRecord] = &[
    row("Nanded", "Maharashtra", "431601"),
    row("Nanded", "Maharashtra", "431602"),
    row("Nanded", "Maharashtra", "431603"),
    row("Nanded", "Maharashtra", "431605"),
    row("Ardhapur", "Maharashtra", "431704"),
    row("Mudkhed", "Maharashtra", "431806"),
    row("Bhokar", "Maharashtra", "431801"),
    row("Hadgaon", "Maharashtra", "431712"),
    row("Kinwat", "Maharashtra", "431804"),
    row("Deglur", "Maharashtra", "431717"),
    row("Mukhed", "Maharashtra", "431715"),
    row("Loha", "Maharashtra", "431708"),
    row("Kandhar", "Maharashtra", "431714"),
    row("Biloli", "Maharashtra", "431710"),
    row("Dharmabad", "Maharashtra", "431809"),
    row("Umri", "Maharashtra", "431807"),
    row("Naigaon", "Maharashtra", "431709"),
    row("Latur", "Maharashtra", "413512"),
    row("Parbhani", "Maharashtra", "431401"),
    row("Hingoli", "Maharashtra", "431513"),
    row("Aurangabad", "Maharashtra", "431001"),
    row("Jalna", "Maharashtra", "431203"),
    row("Beed", "Maharashtra", "431122"),
    row("Osmanabad", "Maharashtra", "413501"),
    row("Solapur", "Maharashtra", "413001"),
    row("Pune", "Maharashtra", "411001"),
    row("Mumbai", "Maharashtra", "400001"),
    row("Navi Mumbai", "Maharashtra", "400703"),
    row("Thane", "Maharashtra", "400601"),
    row("Nagpur", "Maharashtra", "440001"),
    row("Nashik", "Maharashtra", "422001"),
    row("Akola", "Maharashtra", "444001"),
    row("Amravati", "Maharashtra", "444601"),
    row("Yavatmal", "Maharashtra", "445001"),
    row("Kolhapur", "Maharashtra", "416001"),
    row("Hyderabad", "Telangana", "500001"),
    row("Secunderabad", "Telangana", "500003"),
    row("Nizamabad", "Telangana", "503001"),
    row("Adilabad", "Telangana", "504001"),
    row("Nirmal", "Telangana", "504106"),
    row("Karimnagar", "Telangana", "505001"),
    row("Warangal", "Telangana", "506002"),
    row("Bidar", "Karnataka", "585401"),
    row("Bengaluru", "Karnataka", "560001"),
    row("Chennai", "Tamil Nadu", "600001"),
    row("New Delhi", "Delhi", "110001"),
    row("Kolkata", "West Bengal", "700001"),
    row("Ahmedabad", "Gujarat", "380001"),
    row("Indore", "Madhya Pradesh", "452001"),
];

/// Default cap on city suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

/// Case-insensitive city search and exact pincode lookup.
#[derive(Debug, Clone, Copy)]
pub struct AddressResolver {
    table: &'static [AddressRecord],
    suggestion_limit: usize,
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new(ADDRESS_TABLE)
    }
}

impl AddressResolver {
    /// Resolver over `table` with the default suggestion limit.
    pub fn new(table: &'static [AddressRecord]) -> Self {
        Self {
            table,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }

    /// Override the suggestion cap.
    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    /// All rows whose city contains `fragment`, ignoring case, in table
    /// order. A blank fragment matches nothing.
    pub fn by_city(&self, fragment: &str) -> Vec<AddressRecord> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.table
            .iter()
            .filter(|record| record.city.to_lowercase().contains(&needle))
            .copied()
            .collect()
    }

    /// [`by_city`](Self::by_city), capped to the suggestion limit.
    pub fn suggest_city(&self, fragment: &str) -> Vec<AddressRecord> {
        let mut matches = self.by_city(fragment);
        matches.truncate(self.suggestion_limit);
        matches
    }

    /// Exact lookup by a six-digit pincode.
    pub fn by_pincode(&self, pincode: &str) -> Option<AddressRecord> {
        let pincode = pincode.trim();
        if !is_pincode(pincode) {
            return None;
        }
        self.table.iter().find(|record| record.pincode == pincode).copied()
    }

    /// Pincode lookup for six-digit input, capped city search otherwise.
    pub fn resolve(&self, input: &str) -> Vec<AddressRecord> {
        if is_pincode(input.trim()) {
            self.by_pincode(input).into_iter().collect()
        } else {
            self.suggest_city(input)
        }
    }
}

/// Whether `text` is exactly six ASCII digits.
pub fn is_pincode(text: &str) -> bool {
    text.len() == 6 && text.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pincode_exact_match() {
        let resolver = AddressResolver::default();
        let record = resolver.by_pincode("431602").unwrap();
        assert_eq!(record.city, "Nanded");
        assert_eq!(record.state, "Maharashtra");

        assert_eq!(resolver.by_pincode("43160"), None);
        assert_eq!(resolver.by_pincode("4316021"), None);
        assert_eq!(resolver.by_pincode("43160a"), None);
        assert_eq!(resolver.by_pincode("999999"), None);
    }

    #[test]
    fn test_city_substring_case_insensitive() {
        let resolver = AddressResolver::default();
        let matches = resolver.by_city("  naNDed ");
        assert_eq!(matches.len(), 4);
        assert!(matches.iter().all(|r| r.city == "Nanded"));
        assert_eq!(matches[0].pincode, "431601");

        assert!(resolver.by_city("").is_empty());
        assert!(resolver.by_city("   ").is_empty());
        assert!(resolver.by_city("atlantis").is_empty());
    }

    #[test]
    fn test_suggestions_are_capped() {
        let resolver = AddressResolver::default();
        assert!(resolver.by_city("a").len() > DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(resolver.suggest_city("a").len(), DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(
            resolver.with_suggestion_limit(2).suggest_city("a").len(),
            2
        );
    }

    #[test]
    fn test_resolve_dispatches() {
        let resolver = AddressResolver::default();
        assert_eq!(resolver.resolve("500001")[0].city, "Hyderabad");
        assert_eq!(resolver.resolve("hyder")[0].pincode, "500001");
        assert!(resolver.resolve("123456").is_empty());
    }

    #[test]
    fn test_is_pincode() {
        assert!(is_pincode("431601"));
        assert!(!is_pincode("\u{0664}31601"));
        assert!(!is_pincode("43 601"));
    }
}
