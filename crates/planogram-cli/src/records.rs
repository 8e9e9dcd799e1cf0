use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use planogram_core::Product;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Loads a product table. Header names are the `Product` field names.
pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_products(file).with_context(|| format!("Invalid product table {}", path.display()))
}

pub fn read_products<R: Read>(reader: R) -> Result<Vec<Product>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut products = Vec::new();
    for (i, record) in reader.deserialize::<Product>().enumerate() {
        // Line 1 holds the header
        let product = record
            .with_context(|| format!("Row {} does not match the product schema", i + 2))?;
        products.push(product);
    }
    Ok(products)
}
