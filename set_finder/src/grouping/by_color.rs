use crate::models::{Color, ResolvedCard};

/// Why a card landed in the colorless bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorlessKind {
    Land,
    Artifact,
    Plain,
}

/// Color bucket of a card in the by-color view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorCategory {
    White,
    Blue,
    Black,
    Red,
    Green,
    Multicolored,
    Colorless(ColorlessKind),
}

impl ColorCategory {
    /// Buckets in display order; the colorless kinds share one bucket
    pub const DISPLAY_ORDER: [ColorCategory; 7] = [
        ColorCategory::White,
        ColorCategory::Blue,
        ColorCategory::Black,
        ColorCategory::Red,
        ColorCategory::Green,
        ColorCategory::Multicolored,
        ColorCategory::Colorless(ColorlessKind::Plain),
    ];

    /// Land and artifact type lines win over the card's colors
    pub fn of(card: &ResolvedCard) -> Self {
        if card.type_line.contains("Land") {
            ColorCategory::Colorless(ColorlessKind::Land)
        } else if card.type_line.contains("Artifact") {
            ColorCategory::Colorless(ColorlessKind::Artifact)
        } else {
            Self::from_colors(&card.colors)
        }
    }

    /// Classification by colors alone
    pub fn from_colors(colors: &[Color]) -> Self {
        match colors {
            [] => ColorCategory::Colorless(ColorlessKind::Plain),
            [single] => match single {
                Color::White => ColorCategory::White,
                Color::Blue => ColorCategory::Blue,
                Color::Black => ColorCategory::Black,
                Color::Red => ColorCategory::Red,
                Color::Green => ColorCategory::Green,
            },
            _ => ColorCategory::Multicolored,
        }
    }

    /// Position in the display order
    pub fn order(&self) -> u8 {
        match self {
            ColorCategory::White => 0,
            ColorCategory::Blue => 1,
            ColorCategory::Black => 2,
            ColorCategory::Red => 3,
            ColorCategory::Green => 4,
            ColorCategory::Multicolored => 5,
            ColorCategory::Colorless(_) => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorCategory::White => "White",
            ColorCategory::Blue => "Blue",
            ColorCategory::Black => "Black",
            ColorCategory::Red => "Red",
            ColorCategory::Green => "Green",
            ColorCategory::Multicolored => "Multicolored",
            ColorCategory::Colorless(_) => "Colorless",
        }
    }
}

/// One non-empty bucket of the by-color view
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBucket {
    pub category: ColorCategory,
    pub cards: Vec<ResolvedCard>,
}

/// Splits cards into color buckets in display order, input order kept
/// inside each bucket. Empty buckets are left out.
pub fn group_by_color(cards: &[ResolvedCard]) -> Vec<ColorBucket> {
    let mut buckets: Vec<Vec<ResolvedCard>> = vec![Vec::new(); ColorCategory::DISPLAY_ORDER.len()];
    for card in cards {
        let idx = ColorCategory::of(card).order() as usize;
        buckets[idx].push(card.clone());
    }

    ColorCategory::DISPLAY_ORDER
        .into_iter()
        .zip(buckets)
        .filter(|(_, cards)| !cards.is_empty())
        .map(|(category, cards)| ColorBucket { category, cards })
        .collect()
}
