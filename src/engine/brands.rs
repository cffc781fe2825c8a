//! Known-brand detection in free text.

/// Brand assigned when nothing in the text names a known brand.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Built-in brand list, in detection order.
pub const DEFAULT_BRANDS: &[&str] = &["Samsung", "LG", "Hisense", "SONY", "TCL", "Philips"];

/// Ordered list of known brands, matched case-insensitively by substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandCatalog {
    brands: Vec<String>,
}

impl BrandCatalog {
    /// Creates a catalog; earlier brands win when several appear in one text.
    pub fn new<I, S>(brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let brands = brands.into_iter().map(Into::into).filter(|b: &String| !b.trim().is_empty());
        Self { brands: brands.collect() }
    }

    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    /// Returns the first known brand contained in `text`, spelled as listed.
    pub fn detect(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.brands
            .iter()
            .find(|brand| haystack.contains(&brand.to_lowercase()))
            .map(String::as_str)
    }

    /// Coarse brand guess for a query, or [`UNKNOWN_BRAND`].
    pub fn guess_query_brand(&self, query: &str) -> String {
        self.detect(query).unwrap_or(UNKNOWN_BRAND).to_string()
    }
}

impl Default for BrandCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_BRANDS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_case_insensitive() {
        let brands = BrandCatalog::default();
        assert_eq!(brands.detect("samsung 65\" QLED"), Some("Samsung"));
        assert_eq!(brands.detect("Sony Bravia XR"), Some("SONY"));
        assert_eq!(brands.detect("tcl 55 QM7"), Some("TCL"));
        assert_eq!(brands.detect("Generic 4K Monitor"), None);
    }

    #[test]
    fn test_first_listed_brand_wins() {
        let brands = BrandCatalog::default();
        assert_eq!(brands.detect("LG remote for Samsung TVs"), Some("Samsung"));

        let reversed = BrandCatalog::new(["LG", "Samsung"]);
        assert_eq!(reversed.detect("LG remote for Samsung TVs"), Some("LG"));
    }

    #[test]
    fn test_guess_query_brand() {
        let brands = BrandCatalog::default();
        assert_eq!(brands.guess_query_brand("Hisense 50\" A68N - 50A68N"), "Hisense");
        assert_eq!(brands.guess_query_brand("65 inch 4K TV"), UNKNOWN_BRAND);
    }

    #[test]
    fn test_blank_entries_ignored() {
        let brands = BrandCatalog::new(["", "  ", "Philips"]);
        assert_eq!(brands.brands(), &["Philips".to_string()]);
        assert_eq!(brands.detect("anything"), None);
    }
}
