//! Slideshow image selection for the landing page.
//!
//! Prefers a dedicated hero directory, then the first few portfolio photos,
//! then signals the caller to use its own static default.

use crate::core::inventory::ImageInventory;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How many portfolio photos to borrow when there are no hero images.
pub const HERO_PORTFOLIO_LIMIT: usize = 6;

/// A slideshow needs at least this many images to be worth showing.
const MIN_SLIDES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "files", rename_all = "snake_case")]
pub enum HeroSelection {
    /// Filenames from the hero directory.
    Hero(Vec<String>),
    /// Leading filenames from the portfolio directory.
    Portfolio(Vec<String>),
    /// Neither directory had enough images.
    Fallback,
}

impl HeroSelection {
    pub fn files(&self) -> &[String] {
        match self {
            HeroSelection::Hero(files) | HeroSelection::Portfolio(files) => files,
            HeroSelection::Fallback => &[],
        }
    }
}

pub fn select_hero_images(
    hero_dir: &Path,
    portfolio_dir: &Path,
    inventory: &ImageInventory,
) -> HeroSelection {
    let hero: Vec<String> = inventory
        .list(hero_dir)
        .into_iter()
        .map(|e| e.filename)
        .collect();
    if hero.len() >= MIN_SLIDES {
        return HeroSelection::Hero(hero);
    }

    let portfolio: Vec<String> = inventory
        .list(portfolio_dir)
        .into_iter()
        .take(HERO_PORTFOLIO_LIMIT)
        .map(|e| e.filename)
        .collect();
    if portfolio.len() >= MIN_SLIDES {
        return HeroSelection::Portfolio(portfolio);
    }

    log::debug!(
        "Not enough images in {} or {}; using fallback hero",
        hero_dir.display(),
        portfolio_dir.display()
    );
    HeroSelection::Fallback
}
