// core/src/model/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ProductId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Electronics,
  Clothing,
  Books,
  Home,
  Sports,
  Toys,
  Grocery,
  Other,
}

impl Category {
  pub const ALL: [Category; 8] = [
    Category::Electronics,
    Category::Clothing,
    Category::Books,
    Category::Home,
    Category::Sports,
    Category::Toys,
    Category::Grocery,
    Category::Other,
  ];

  /// Storage and wire spelling.
  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Electronics => "electronics",
      Category::Clothing => "clothing",
      Category::Books => "books",
      Category::Home => "home",
      Category::Sports => "sports",
      Category::Toys => "toys",
      Category::Grocery => "grocery",
      Category::Other => "other",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Category::ALL
      .iter()
      .copied()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| format!("unknown product category '{}'", s))
  }
}

/// A sellable item. `stock` is the authoritative inventory count and is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: ProductId,
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub stock: i32,
  pub category: Category,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub stock: i32,
  pub category: Category,
}

impl NewProduct {
  pub fn new(name: impl Into<String>, price: Decimal, stock: i32, category: Category) -> Self {
    Self {
      name: name.into(),
      description: None,
      price,
      stock,
      category,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }
}
