use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::Bucket;

/// Operating system a checklist bucket targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Os {
    /// Windows packages.
    Windows,
    /// Linux packages.
    Linux,
}

impl Os {
    /// The fixed display and export order.
    pub const ALL: [Self; 2] = [Self::Windows, Self::Linux];

    /// The canonical name, as it appears in storage and exports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string is not a recognised operating system name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operating system '{0}' (expected 'Windows' or 'Linux')")]
pub struct ParseOsError(pub String);

impl FromStr for Os {
    type Err = ParseOsError;

    /// Parses an OS name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            _ => Err(ParseOsError(s.to_string())),
        }
    }
}

/// The per-product pair of OS buckets.
///
/// Both buckets always exist in memory, even when empty. This is the typed
/// counterpart of the self-healing the store performs on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChecklist {
    /// The Windows checklist bucket.
    #[serde(rename = "Windows", default)]
    pub windows: Bucket,
    /// The Linux checklist bucket.
    #[serde(rename = "Linux", default)]
    pub linux: Bucket,
}

impl ProductChecklist {
    /// Returns the bucket for the given OS.
    #[must_use]
    pub const fn bucket(&self, os: Os) -> &Bucket {
        match os {
            Os::Windows => &self.windows,
            Os::Linux => &self.linux,
        }
    }

    /// Returns a mutable reference to the bucket for the given OS.
    #[must_use]
    pub const fn bucket_mut(&mut self, os: Os) -> &mut Bucket {
        match os {
            Os::Windows => &mut self.windows,
            Os::Linux => &mut self.linux,
        }
    }
}

/// The whole checklist document: product name → per-OS buckets.
///
/// This is the unit of persistence. It is loaded once, threaded through the
/// CRUD operations as an owned value, and written back after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistDocument {
    products: BTreeMap<String, ProductChecklist>,
}

impl ChecklistDocument {
    /// An empty document containing a single product with both OS buckets
    /// present and empty.
    #[must_use]
    pub fn skeleton(default_product: &str) -> Self {
        let mut document = Self::default();
        document.ensure_product(default_product);
        document
    }

    /// Iterates products in stored (sorted) order.
    pub fn products(&self) -> impl Iterator<Item = (&str, &ProductChecklist)> {
        self.products
            .iter()
            .map(|(name, product)| (name.as_str(), product))
    }

    /// The number of products in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the document contains no products at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks up a product by name.
    #[must_use]
    pub fn product(&self, name: &str) -> Option<&ProductChecklist> {
        self.products.get(name)
    }

    /// Returns the named product, creating it (with both OS buckets empty) if
    /// it does not exist yet.
    pub fn ensure_product(&mut self, name: &str) -> &mut ProductChecklist {
        self.products.entry(name.to_string()).or_default()
    }

    /// Convenience lookup of a single bucket.
    #[must_use]
    pub fn bucket(&self, product: &str, os: Os) -> Option<&Bucket> {
        self.product(product).map(|p| p.bucket(os))
    }

    /// Repairs the document invariants after a load.
    ///
    /// Ensures the default product exists and delegates per-bucket repair
    /// (duplicate removal, metadata back-fill) to each bucket.
    pub(crate) fn repair(&mut self, default_product: &str) {
        self.ensure_product(default_product);
        for product in self.products.values_mut() {
            for os in Os::ALL {
                product.bucket_mut(os).repair();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_parses_case_insensitively() {
        assert_eq!("windows".parse::<Os>().unwrap(), Os::Windows);
        assert_eq!("LINUX".parse::<Os>().unwrap(), Os::Linux);
        assert_eq!(" Windows ".parse::<Os>().unwrap(), Os::Windows);
    }

    #[test]
    fn os_rejects_unknown_names() {
        let error = "macos".parse::<Os>().unwrap_err();
        assert_eq!(error, ParseOsError("macos".to_string()));
    }

    #[test]
    fn skeleton_contains_default_product_with_empty_buckets() {
        let document = ChecklistDocument::skeleton("CI");

        let product = document.product("CI").unwrap();
        assert!(product.bucket(Os::Windows).is_empty());
        assert!(product.bucket(Os::Linux).is_empty());
    }

    #[test]
    fn ensure_product_is_idempotent() {
        let mut document = ChecklistDocument::default();
        document
            .ensure_product("CI")
            .bucket_mut(Os::Windows)
            .add_item("Build", "", "", false)
            .unwrap();
        document.ensure_product("CI");

        assert_eq!(document.bucket("CI", Os::Windows).unwrap().len(), 1);
    }
}
