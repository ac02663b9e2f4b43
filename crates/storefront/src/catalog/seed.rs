//! The built-in demo catalog.

use mavi_core::{Category, Product, ProductDraft, ProductId};
use rust_decimal::Decimal;

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    cents: i64,
    original_cents: Option<i64>,
    category: &'static str,
    subcategory: &'static str,
    tags: &'static [&'static str],
    rating_tenths: i64,
    reviews: u32,
    is_new: bool,
    is_featured: bool,
}

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("daily-discovery", "Daily Discovery", "Discover something new every day"),
    ("home-gadgets", "Home Gadgets", "Smart solutions for your home"),
    ("home-stuff", "Home Stuff", "Everything you need for your home"),
    ("kitchen-gadgets", "Kitchen Gadgets", "Innovative kitchen solutions"),
    ("bed-bath", "Bed & Bath", "Comfort for your bedroom and bathroom"),
    ("bathroom-organizers", "Bathroom Organizers", "Organize your bathroom space"),
];

const PRODUCTS: &[Seed] = &[
    Seed {
        id: "1",
        name: "Nordic Unique Wooden Outdoor Wall Vase Lamp",
        description: "Wooden wall lamp with a built-in vase for outdoor spaces.",
        cents: 5795,
        original_cents: None,
        category: "home-gadgets",
        subcategory: "lamps",
        tags: &["lamp", "wooden", "outdoor", "vase", "nordic"],
        rating_tenths: 48,
        reviews: 124,
        is_new: false,
        is_featured: true,
    },
    Seed {
        id: "2",
        name: "Astronaut On The Moon Wall Light",
        description: "Whimsical astronaut wall light for a dreamy room.",
        cents: 9095,
        original_cents: None,
        category: "home-gadgets",
        subcategory: "lamps",
        tags: &["astronaut", "wall light", "moon", "space", "decorative"],
        rating_tenths: 49,
        reviews: 89,
        is_new: false,
        is_featured: true,
    },
    Seed {
        id: "3",
        name: "Unique Retro Creative Animals Table Lamps",
        description: "Animal-shaped table lamps with retro styling.",
        cents: 9395,
        original_cents: None,
        category: "home-gadgets",
        subcategory: "lamps",
        tags: &["animals", "table lamp", "retro", "creative", "decorative"],
        rating_tenths: 47,
        reviews: 156,
        is_new: false,
        is_featured: true,
    },
    Seed {
        id: "4",
        name: "Aromatherapy Car RGB Rhythm Light",
        description: "Car diffuser light that changes color with the music.",
        cents: 8995,
        original_cents: None,
        category: "daily-discovery",
        subcategory: "car-accessories",
        tags: &["aromatherapy", "car", "rgb", "rhythm", "light"],
        rating_tenths: 46,
        reviews: 203,
        is_new: false,
        is_featured: true,
    },
    Seed {
        id: "5",
        name: "Nordic Rain LED Thermostatic Waterfall Shower Set",
        description: "Thermostatic waterfall shower set with LED lighting.",
        cents: 160_095,
        original_cents: None,
        category: "bed-bath",
        subcategory: "shower",
        tags: &["shower", "led", "thermostatic", "waterfall", "luxury"],
        rating_tenths: 49,
        reviews: 67,
        is_new: false,
        is_featured: true,
    },
    Seed {
        id: "6",
        name: "Simple Harmony Ceramic Tea Pot Set",
        description: "Ceramic tea pot with matching cups.",
        cents: 6995,
        original_cents: None,
        category: "kitchen-gadgets",
        subcategory: "tea-coffee",
        tags: &["tea pot", "ceramic", "harmony", "set", "traditional"],
        rating_tenths: 48,
        reviews: 92,
        is_new: false,
        is_featured: false,
    },
    Seed {
        id: "7",
        name: "Ultimate Camping Style Stainless Steel Foldable Grill",
        description: "Foldable stainless steel grill that packs flat.",
        cents: 9495,
        original_cents: Some(11595),
        category: "daily-discovery",
        subcategory: "outdoor",
        tags: &["grill", "camping", "stainless steel", "foldable", "portable"],
        rating_tenths: 47,
        reviews: 78,
        is_new: false,
        is_featured: false,
    },
    Seed {
        id: "8",
        name: "Minimalist LED Circle Background Wall Lamp",
        description: "Circular LED wall lamp for soft background light.",
        cents: 4195,
        original_cents: None,
        category: "home-gadgets",
        subcategory: "lamps",
        tags: &["minimalist", "led", "circle", "wall lamp", "modern"],
        rating_tenths: 45,
        reviews: 134,
        is_new: false,
        is_featured: false,
    },
    Seed {
        id: "9",
        name: "3D LED Painting Sand Art Decor",
        description: "Moving sand art picture with LED backlight.",
        cents: 6495,
        original_cents: None,
        category: "home-stuff",
        subcategory: "decorative",
        tags: &["3d", "led", "sand art", "painting", "decorative"],
        rating_tenths: 46,
        reviews: 187,
        is_new: false,
        is_featured: false,
    },
    Seed {
        id: "10",
        name: "Corner Embedded Chic Bridal Scene Night Lamp",
        description: "Corner night lamp with an embedded bridal scene.",
        cents: 26000,
        original_cents: None,
        category: "home-gadgets",
        subcategory: "lamps",
        tags: &["corner", "bridal", "night lamp", "romantic", "embedded"],
        rating_tenths: 44,
        reviews: 45,
        is_new: false,
        is_featured: false,
    },
    Seed {
        id: "11",
        name: "Cuddly Capybara Cozy Wrap Sleeve Plush Band",
        description: "Soft plush band that wraps around a wrist or sleeve.",
        cents: 1095,
        original_cents: None,
        category: "daily-discovery",
        subcategory: "comfort",
        tags: &["capybara", "plush", "cozy", "wrap", "comfort"],
        rating_tenths: 49,
        reviews: 312,
        is_new: true,
        is_featured: false,
    },
    Seed {
        id: "12",
        name: "Gun Shape Bullet Glass Decanter Set",
        description: "Glass decanter set with bullet-shaped glasses.",
        cents: 4995,
        original_cents: Some(7795),
        category: "home-stuff",
        subcategory: "barware",
        tags: &["gun", "decanter", "whiskey", "glass", "unique"],
        rating_tenths: 43,
        reviews: 89,
        is_new: false,
        is_featured: false,
    },
];

/// Built-in categories, in display order.
pub fn categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|(slug, name, description)| Category {
            id: (*slug).to_string(),
            name: (*name).to_string(),
            image: format!("/static/categories/{slug}.png"),
            description: (*description).to_string(),
            slug: (*slug).to_string(),
        })
        .collect()
}

/// Built-in products, in catalog order.
///
/// Seeds go through the same validation as admin input; an invalid seed is
/// logged and skipped.
pub fn products() -> Vec<Product> {
    PRODUCTS
        .iter()
        .filter_map(|seed| {
            let id = ProductId::parse(seed.id).ok()?;
            let draft = ProductDraft {
                name: seed.name.to_string(),
                description: seed.description.to_string(),
                price: Decimal::new(seed.cents, 2),
                original_price: seed.original_cents.map(|c| Decimal::new(c, 2)),
                images: vec![
                    format!("/static/products/{}-1.jpeg", seed.id),
                    format!("/static/products/{}-2.jpeg", seed.id),
                ],
                category: seed.category.to_string(),
                subcategory: Some(seed.subcategory.to_string()),
                tags: seed.tags.iter().map(|t| (*t).to_string()).collect(),
                in_stock: true,
                rating: Some(Decimal::new(seed.rating_tenths, 1)),
                reviews: Some(seed.reviews),
                is_new: seed.is_new,
                is_featured: seed.is_featured,
            };
            draft
                .validate(id)
                .inspect_err(|e| tracing::error!(id = seed.id, error = %e, "Invalid seed product"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_seeds_are_valid() {
        assert_eq!(products().len(), PRODUCTS.len());
    }

    #[test]
    fn test_seed_categories_exist() {
        let slugs: Vec<String> = categories().into_iter().map(|c| c.slug).collect();
        for product in products() {
            assert!(slugs.contains(&product.category), "{}", product.category);
        }
    }

    #[test]
    fn test_sale_items_get_discounts() {
        let products = products();
        let grill = products.iter().find(|p| p.id.as_str() == "7");
        assert_eq!(grill.and_then(|p| p.discount_percent), Some(18));
        let decanter = products.iter().find(|p| p.id.as_str() == "12");
        assert_eq!(decanter.and_then(|p| p.discount_percent), Some(36));
    }
}
