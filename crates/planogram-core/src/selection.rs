use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::types::Product;

/// Products kept per group when grouping is requested
pub const GROUP_TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    Supplier,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAttribute {
    Id,
    Category,
    Supplier,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperation {
    #[default]
    Include,
    Exclude,
}

/// Keeps or drops products whose attribute is one of `values`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub attribute: FilterAttribute,
    pub values: Vec<String>,
    #[serde(default)]
    pub operation: FilterOperation,
}

impl ProductFilter {
    fn keeps(&self, product: &Product) -> bool {
        let value = match self.attribute {
            FilterAttribute::Id => &product.id,
            FilterAttribute::Category => &product.category,
            FilterAttribute::Supplier => &product.supplier,
        };
        let listed = self.values.iter().any(|v| v == value);
        match self.operation {
            FilterOperation::Include => listed,
            FilterOperation::Exclude => !listed,
        }
    }
}

/// Narrows the product batch before scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSelection {
    /// Case-insensitive category match
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub filters: Vec<ProductFilter>,
    /// Keeps the best sellers of each group
    #[serde(default)]
    pub grouping: Option<Grouping>,
}

impl ProductSelection {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.filters.is_empty() && self.grouping.is_none()
    }

    /// Applies the category match, the filters, then grouping. Kept products
    /// retain their input order.
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut selected: Vec<Product> = products
            .into_iter()
            .filter(|p| match &self.category {
                Some(category) => p.category.eq_ignore_ascii_case(category),
                None => true,
            })
            .filter(|p| self.filters.iter().all(|f| f.keeps(p)))
            .collect();

        if let Some(grouping) = self.grouping {
            let kept = top_sellers_per_group(&selected, grouping);
            selected = selected
                .into_iter()
                .enumerate()
                .filter(|(i, _)| kept.contains(i))
                .map(|(_, p)| p)
                .collect();
        }

        selected
    }
}

/// Indices of the `GROUP_TOP_N` best sellers of each group.
fn top_sellers_per_group(products: &[Product], grouping: Grouping) -> HashSet<usize> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, product) in products.iter().enumerate() {
        let key = match grouping {
            Grouping::Supplier => product.supplier.as_str(),
            Grouping::Category => product.category.as_str(),
        };
        groups.entry(key).or_default().push(i);
    }

    let sales = |i: usize| products[i].average_sales.unwrap_or(0.0);
    groups
        .into_values()
        .flat_map(|mut members| {
            members.sort_by(|&a, &b| sales(b).partial_cmp(&sales(a)).unwrap_or(Ordering::Equal));
            members.truncate(GROUP_TOP_N);
            members
        })
        .collect()
}
