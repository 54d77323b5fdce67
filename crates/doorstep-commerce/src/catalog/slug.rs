//! Route segment to category resolution.
//!
//! Deep links can outlive the category they point at, so resolution is a
//! chain of total resolvers tried in order: the live catalog, then a fixed
//! table of legacy category names, then a title-cased rendering of the
//! segment itself. The last tier always answers.

use crate::catalog::category::{slugify, Category};
use crate::ids::CategoryId;
use serde::Serialize;

/// Names used by category links before administrative records existed.
///
/// The table only supplies display names. It is consulted after the live
/// catalog, so it never renames a category the catalog lists, and a legacy
/// name that matches no services falls back to the segment's own name.
pub const LEGACY_CATEGORY_NAMES: &[(&str, &str)] = &[
    ("ac-repair", "AC Repair"),
    ("ac-service", "AC Service"),
    ("washing-machine", "Washing Machine"),
    ("refrigerator", "Refrigerator"),
    ("ro-water-purifier", "RO Water Purifier"),
    ("water-purifier", "RO Water Purifier"),
    ("microwave", "Microwave Oven"),
    ("microwave-oven", "Microwave Oven"),
    ("geyser", "Geyser"),
    ("chimney", "Kitchen Chimney"),
    ("kitchen-chimney", "Kitchen Chimney"),
    ("led-tv", "LED TV"),
    ("television", "LED TV"),
    ("air-cooler", "Air Cooler"),
    ("deep-freezer", "Deep Freezer"),
    ("inverter", "Inverter & Battery"),
];

/// Which resolver answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugTier {
    /// Matched a category in the current catalog.
    Catalog,
    /// Matched the legacy name table.
    Legacy,
    /// Derived from the segment text.
    Derived,
}

/// A route segment resolved to a category identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSlug {
    /// Canonical category id.
    pub id: CategoryId,
    /// Category name, used for display and for per-category service lookups.
    pub name: String,
    pub tier: SlugTier,
}

/// One tier of the resolution chain.
pub trait SlugResolver {
    /// Resolve `segment`, or `None` to defer to the next tier.
    fn resolve(&self, segment: &str) -> Option<ResolvedSlug>;
}

/// Matches categories of the live catalog by id or slug.
#[derive(Debug, Clone, Copy)]
pub struct CatalogTier<'a> {
    categories: &'a [Category],
}

impl<'a> CatalogTier<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        Self { categories }
    }
}

impl SlugResolver for CatalogTier<'_> {
    fn resolve(&self, segment: &str) -> Option<ResolvedSlug> {
        self.categories
            .iter()
            .find(|c| c.matches(segment))
            .map(|c| ResolvedSlug {
                id: c.id.clone(),
                name: c.title.clone(),
                tier: SlugTier::Catalog,
            })
    }
}

/// Looks the segment up in [`LEGACY_CATEGORY_NAMES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyTier;

impl SlugResolver for LegacyTier {
    fn resolve(&self, segment: &str) -> Option<ResolvedSlug> {
        let wanted = slugify(segment.trim_matches('/'));
        LEGACY_CATEGORY_NAMES
            .iter()
            .find(|(slug, _)| *slug == wanted)
            .map(|(slug, name)| ResolvedSlug {
                id: CategoryId::new(*slug),
                name: (*name).to_string(),
                tier: SlugTier::Legacy,
            })
    }
}

/// Title-cases the hyphen-delimited segment. Never declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedTier;

impl DerivedTier {
    /// Display name used when the segment has no usable words.
    pub const FALLBACK_NAME: &'static str = "Services";
}

impl SlugResolver for DerivedTier {
    fn resolve(&self, segment: &str) -> Option<ResolvedSlug> {
        let slug = slugify(segment.trim_matches('/'));
        let name = title_case(&slug);
        let name = if name.is_empty() {
            Self::FALLBACK_NAME.to_string()
        } else {
            name
        };
        Some(ResolvedSlug {
            id: CategoryId::new(slug),
            name,
            tier: SlugTier::Derived,
        })
    }
}

/// Ordered resolvers with first-match-wins semantics.
pub struct SlugChain<'a> {
    tiers: Vec<Box<dyn SlugResolver + 'a>>,
}

impl<'a> SlugChain<'a> {
    /// The standard chain: catalog, legacy table, derived name.
    pub fn standard(categories: &'a [Category]) -> Self {
        Self {
            tiers: vec![
                Box::new(CatalogTier::new(categories)),
                Box::new(LegacyTier),
            ],
        }
    }

    /// Append a tier before the derived fallback.
    pub fn with_tier(mut self, tier: impl SlugResolver + 'a) -> Self {
        self.tiers.push(Box::new(tier));
        self
    }

    /// Resolve a segment. The derived tier backs every chain, so this is total.
    pub fn resolve(&self, segment: &str) -> ResolvedSlug {
        self.tiers
            .iter()
            .find_map(|tier| tier.resolve(segment))
            .or_else(|| DerivedTier.resolve(segment))
            .unwrap_or_else(|| ResolvedSlug {
                id: CategoryId::new(""),
                name: DerivedTier::FALLBACK_NAME.to_string(),
                tier: SlugTier::Derived,
            })
    }
}

/// Resolve a route segment against `categories` with the standard chain.
pub fn resolve_slug(categories: &[Category], segment: &str) -> ResolvedSlug {
    SlugChain::standard(categories).resolve(segment)
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategorySource;

    fn categories() -> Vec<Category> {
        vec![Category {
            id: CategoryId::new("65f0aa01"),
            title: "Washing Machine".to_string(),
            description: String::new(),
            image_url: String::new(),
            items: Vec::new(),
            source: CategorySource::Admin,
        }]
    }

    #[test]
    fn test_catalog_tier_by_id_and_slug() {
        let cats = categories();
        let by_id = resolve_slug(&cats, "65f0aa01");
        assert_eq!(by_id.tier, SlugTier::Catalog);
        assert_eq!(by_id.name, "Washing Machine");

        let by_slug = resolve_slug(&cats, "washing-machine");
        assert_eq!(by_slug.tier, SlugTier::Catalog);
        assert_eq!(by_slug.id.as_str(), "65f0aa01");
    }

    #[test]
    fn test_legacy_tier() {
        let resolved = resolve_slug(&categories(), "ro-water-purifier");
        assert_eq!(resolved.tier, SlugTier::Legacy);
        assert_eq!(resolved.name, "RO Water Purifier");
        assert_eq!(resolved.id.as_str(), "ro-water-purifier");
    }

    #[test]
    fn test_derived_tier_title_cases() {
        let resolved = resolve_slug(&[], "dish-washer-repair");
        assert_eq!(resolved.tier, SlugTier::Derived);
        assert_eq!(resolved.name, "Dish Washer Repair");
        assert_eq!(resolved.id.as_str(), "dish-washer-repair");
    }

    #[test]
    fn test_catalog_tier_wins_over_legacy() {
        let mut cats = categories();
        cats[0].title = "Geyser".to_string();
        let resolved = resolve_slug(&cats, "geyser");
        assert_eq!(resolved.tier, SlugTier::Catalog);
    }

    #[test]
    fn test_listed_category_keeps_its_own_name() {
        let mut cats = categories();
        cats[0].id = CategoryId::new("chimney");
        cats[0].title = "Chimney".to_string();
        cats[0].source = CategorySource::Derived;
        let resolved = resolve_slug(&cats, "chimney");
        assert_eq!(resolved.tier, SlugTier::Catalog);
        assert_eq!(resolved.name, "Chimney");

        assert_eq!(resolve_slug(&[], "chimney").name, "Kitchen Chimney");
    }

    #[test]
    fn test_resolution_is_total() {
        for segment in ["", "/", "---", "  ", "\u{0928}\u{093e}\u{0902}\u{0926}\u{0947}\u{0921}"] {
            let resolved = resolve_slug(&[], segment);
            assert!(!resolved.name.is_empty(), "segment {:?}", segment);
        }
        assert_eq!(resolve_slug(&[], "").name, DerivedTier::FALLBACK_NAME);
    }

    #[test]
    fn test_custom_tier_runs_before_derived() {
        struct Fixed;
        impl SlugResolver for Fixed {
            fn resolve(&self, segment: &str) -> Option<ResolvedSlug> {
                (segment == "special").then(|| ResolvedSlug {
                    id: CategoryId::new("special"),
                    name: "Special Offers".to_string(),
                    tier: SlugTier::Legacy,
                })
            }
        }

        let cats = categories();
        let chain = SlugChain::standard(&cats).with_tier(Fixed);
        assert_eq!(chain.resolve("special").name, "Special Offers");
        assert_eq!(chain.resolve("other").tier, SlugTier::Derived);
    }
}
