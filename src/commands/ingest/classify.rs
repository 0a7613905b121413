use crate::model::{Category, SourceKind};

/// Ordered keyword sets, first match wins. Matching is substring-based on the
/// lower-cased name, so order resolves overlaps such as "green beans"
/// (Legumes via "bean") or "peanut" (Legumes via "pea").
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Seafood,
        &[
            "fish", "salmon", "tuna", "shrimp", "crab", "lobster", "oyster", "clam", "mussel",
            "squid", "octopus", "scallop", "mackerel", "sardine", "anchovy", "herring", "cod",
            "halibut", "flounder", "eel", "carp", "trout", "roe", "milt", "seabass", "snail",
            "krill", "whitebait", "bonito", "yellowtail",
        ],
    ),
    (
        Category::Meat,
        &[
            "beef", "pork", "chicken", "lamb", "mutton", "veal", "duck", "goose", "turkey",
            "liver", "kidney", "heart", "tongue", "ham", "bacon", "sausage", "frankfurter",
            "salami", "prosciutto", "corned", "whale", "foie gras", "gizzard", "pate",
        ],
    ),
    (
        Category::Dairy,
        &["milk", "cheese", "yogurt", "cream", "butter", "egg"],
    ),
    (
        Category::Legumes,
        &[
            "bean", "soy", "tofu", "lentil", "pea", "chickpea", "miso", "natto", "okara",
        ],
    ),
    (
        Category::Grains,
        &[
            "rice", "bread", "flour", "noodle", "pasta", "spaghetti", "barley", "wheat", "oat",
            "cereal", "bran", "ramen", "udon", "soba",
        ],
    ),
    (
        Category::Nuts,
        &[
            "nut", "almond", "walnut", "peanut", "cashew", "pistachio", "seed", "sesame", "chia",
        ],
    ),
    (
        Category::Fruits,
        &[
            "apple", "banana", "orange", "strawberry", "grape", "mango", "avocado", "goji",
            "fruit",
        ],
    ),
    (
        Category::Vegetables,
        &[
            "spinach", "broccoli", "carrot", "potato", "tomato", "onion", "cabbage", "lettuce",
            "mushroom", "asparagus", "pepper", "corn", "cucumber", "eggplant", "garlic",
            "ginger", "pumpkin", "squash", "seaweed", "radish", "leek", "sprout", "parsley",
            "okra", "bamboo", "turnip", "taro", "cauliflower", "burdock", "green beans",
        ],
    ),
    (
        Category::Beverages,
        &["tea", "coffee", "juice", "beverage", "amazake"],
    ),
];

pub fn classify_category(name: &str, kind: SourceKind) -> Category {
    if kind == SourceKind::Alcohol {
        return Category::Beverages;
    }

    let lower = name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}
