use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopItemKind {
    Theme,
    Badge,
    PowerUp,
}

#[derive(Debug, Serialize)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u32,
    pub kind: ShopItemKind,
}

pub const SHOP_ITEMS: &[ShopItem] = &[
    ShopItem {
        id: "theme-midnight",
        name: "Midnight Theme",
        description: "Deep blue dashboard palette.",
        cost: 50,
        kind: ShopItemKind::Theme,
    },
    ShopItem {
        id: "theme-forest",
        name: "Forest Theme",
        description: "Calm greens for long study sessions.",
        cost: 50,
        kind: ShopItemKind::Theme,
    },
    ShopItem {
        id: "badge-early-bird",
        name: "Early Bird Badge",
        description: "Shown next to your name on the dashboard.",
        cost: 30,
        kind: ShopItemKind::Badge,
    },
    ShopItem {
        id: "badge-grinder",
        name: "Grinder Badge",
        description: "For finishing a whole roadmap year.",
        cost: 120,
        kind: ShopItemKind::Badge,
    },
    ShopItem {
        id: "powerup-streak-freeze",
        name: "Streak Freeze",
        description: "Skip a day of daily tasks without losing your streak.",
        cost: 40,
        kind: ShopItemKind::PowerUp,
    },
    ShopItem {
        id: "powerup-extra-hint",
        name: "Extra Hint",
        description: "One extra hint in the Socratic validator.",
        cost: 25,
        kind: ShopItemKind::PowerUp,
    },
];

pub fn find_shop_item(id: &str) -> Option<&'static ShopItem> {
    SHOP_ITEMS.iter().find(|item| item.id == id)
}
