//! The slice of a catalog product the try-on code reads.

use serde::{Deserialize, Deserializer, Serialize};

use crate::dimensions::FrameDimensions;

/// Bucket prefix for production frame overlay assets.
pub const DEFAULT_FRAME_ASSET_BASE: &str =
    "https://storage.googleapis.com/myapp-image-bucket-001/vto/vto_ready";

/// Catalog record, reduced to the fields frame placement needs. Every other
/// catalog field is ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub skuid: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub name: String,
    pub dimensions: Option<String>,
}

impl Product {
    /// Key used to resolve the overlay asset: `skuid`, else `id`.
    pub fn frame_key(&self) -> Option<&str> {
        non_empty(&self.skuid).or_else(|| non_empty(&self.id))
    }

    /// Parsed dimensions, or `None` when the product has no usable string.
    pub fn frame_dimensions(&self) -> Option<FrameDimensions> {
        self.dimensions.as_deref()?.parse().ok()
    }
}

fn non_empty(key: &Option<String>) -> Option<&str> {
    key.as_deref().filter(|k| !k.is_empty())
}

/// Catalog APIs disagree on whether ids are strings or integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Builds frame overlay asset URLs from product keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAssetResolver {
    base: String,
}

impl Default for FrameAssetResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_ASSET_BASE)
    }
}

impl FrameAssetResolver {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    pub fn frame_url(&self, key: &str) -> String {
        format!("{}/{}_VTO.png", self.base, key)
    }

    pub fn product_url(&self, product: &Product) -> Option<String> {
        product.frame_key().map(|key| self.frame_url(key))
    }
}

/// Products whose frame width is within `tolerance_mm` of the face width,
/// closest first, at most `limit` of them.
///
/// Products without a parseable dimension string are skipped rather than
/// matched against the fallback width.
pub fn frames_for_face_width(
    products: &[Product],
    face_width_mm: f32,
    tolerance_mm: f32,
    limit: usize,
) -> Vec<&Product> {
    let mut matches: Vec<(&Product, f32)> = products
        .iter()
        .filter_map(|p| {
            let diff = (p.frame_dimensions()?.width - face_width_mm).abs();
            (diff <= tolerance_mm).then_some((p, diff))
        })
        .collect();

    matches.sort_by(|a, b| a.1.total_cmp(&b.1));
    matches.into_iter().take(limit).map(|(p, _)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str, dims: Option<&str>) -> Product {
        Product {
            skuid: Some(sku.to_string()),
            name: format!("Frame {sku}"),
            dimensions: dims.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn frame_url_uses_skuid_then_id() {
        let resolver = FrameAssetResolver::new("https://cdn.example/vto/");
        let p = product("E45A8M", None);
        assert_eq!(
            resolver.product_url(&p).as_deref(),
            Some("https://cdn.example/vto/E45A8M_VTO.png")
        );

        let by_id = Product {
            id: Some("42".to_string()),
            ..Default::default()
        };
        assert_eq!(by_id.frame_key(), Some("42"));
        assert_eq!(resolver.product_url(&Product::default()), None);
    }

    #[test]
    fn default_resolver_points_at_bucket() {
        let url = FrameAssetResolver::default().frame_url("ABC");
        assert!(url.starts_with(DEFAULT_FRAME_ASSET_BASE));
        assert!(url.ends_with("/ABC_VTO.png"));
    }

    #[test]
    fn matches_sorted_by_closeness_and_limited() {
        let products = vec![
            product("A", Some("150-18-145")),
            product("B", Some("136-18-145")),
            product("C", Some("51-18-141-140")),
            product("D", None),
            product("E", Some("garbage")),
            product("F", Some("133-18-140")),
        ];

        let found = frames_for_face_width(&products, 135.0, 8.0, 6);
        let skus: Vec<_> = found.iter().filter_map(|p| p.frame_key()).collect();
        assert_eq!(skus, vec!["B", "F", "C"]);

        let limited = frames_for_face_width(&products, 135.0, 8.0, 2);
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn deserializes_catalog_records() {
        let json = r#"[{
            "skuid": "X1",
            "name": "Round",
            "dimensions": "50-20-145",
            "price": "₹1999",
            "colors": []
        }]"#;
        let products: Vec<Product> = serde_json::from_str(json).unwrap();
        assert_eq!(products[0].frame_dimensions().unwrap().width, 50.0);

        let numeric: Product = serde_json::from_str(r#"{"id": 1017, "name": "Aviator"}"#).unwrap();
        assert_eq!(numeric.frame_key(), Some("1017"));
        assert!(numeric.frame_dimensions().is_none());
    }
}
