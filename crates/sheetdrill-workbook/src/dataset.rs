//! The reference workbook candidates download at the start of a session.
//!
//! The practical questions' correct answers are derived from these tables,
//! so the generated content must be identical every session. Dates are
//! written as ISO-8601 strings to keep the output deterministic.

use anyhow::Result;
use rust_xlsxwriter::Workbook;

/// One row of the `SalesData` fact table.
pub struct SalesRow {
    pub date: &'static str,
    pub region: &'static str,
    pub category: &'static str,
    pub product_id: &'static str,
    pub sales: f64,
}

/// One row of the `Products` lookup table.
pub struct ProductRow {
    pub product_id: &'static str,
    pub product_name: &'static str,
    pub unit_cost: f64,
}

pub const SALES_HEADERS: [&str; 5] = ["Date", "Region", "Category", "Product_ID", "Sales"];
pub const PRODUCT_HEADERS: [&str; 3] = ["Product_ID", "Product_Name", "Unit_Cost"];

pub const SALES_ROWS: [SalesRow; 9] = [
    SalesRow { date: "2023-01-05", region: "North", category: "Electronics", product_id: "P101", sales: 1200.0 },
    SalesRow { date: "2023-01-06", region: "West", category: "Apparel", product_id: "P201", sales: 300.0 },
    SalesRow { date: "2023-01-07", region: "North", category: "Electronics", product_id: "P102", sales: 800.0 },
    SalesRow { date: "2023-01-08", region: "South", category: "Books", product_id: "P301", sales: 50.0 },
    SalesRow { date: "2023-02-10", region: "West", category: "Apparel", product_id: "P202", sales: 200.0 },
    SalesRow { date: "2023-02-11", region: "East", category: "Books", product_id: "P302", sales: 75.0 },
    SalesRow { date: "2023-03-15", region: "South", category: "Books", product_id: "P303", sales: 60.0 },
    SalesRow { date: "2023-03-16", region: "West", category: "Electronics", product_id: "P103", sales: 450.0 },
    SalesRow { date: "2023-03-17", region: "East", category: "Apparel", product_id: "P201", sales: 150.0 },
];

pub const PRODUCT_ROWS: [ProductRow; 8] = [
    ProductRow { product_id: "P101", product_name: "Laptop", unit_cost: 800.0 },
    ProductRow { product_id: "P102", product_name: "Monitor", unit_cost: 250.0 },
    ProductRow { product_id: "P103", product_name: "Keyboard", unit_cost: 50.0 },
    ProductRow { product_id: "P201", product_name: "T-Shirt", unit_cost: 10.0 },
    ProductRow { product_id: "P202", product_name: "Jeans", unit_cost: 25.0 },
    ProductRow { product_id: "P301", product_name: "Novel", unit_cost: 8.0 },
    ProductRow { product_id: "P302", product_name: "Cookbook", unit_cost: 12.0 },
    ProductRow { product_id: "P303", product_name: "History", unit_cost: 10.0 },
];

/// Build the reference workbook (`SalesData` + `Products`) in memory.
pub fn build_reference_workbook() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let sales = workbook.add_worksheet().set_name("SalesData")?;
    for (col, header) in SALES_HEADERS.iter().enumerate() {
        sales.write_string(0, col as u16, *header)?;
    }
    for (i, row) in SALES_ROWS.iter().enumerate() {
        let r = (i + 1) as u32;
        sales.write_string(r, 0, row.date)?;
        sales.write_string(r, 1, row.region)?;
        sales.write_string(r, 2, row.category)?;
        sales.write_string(r, 3, row.product_id)?;
        sales.write_number(r, 4, row.sales)?;
    }

    let products = workbook.add_worksheet().set_name("Products")?;
    for (col, header) in PRODUCT_HEADERS.iter().enumerate() {
        products.write_string(0, col as u16, *header)?;
    }
    for (i, row) in PRODUCT_ROWS.iter().enumerate() {
        let r = (i + 1) as u32;
        products.write_string(r, 0, row.product_id)?;
        products.write_string(r, 1, row.product_name)?;
        products.write_number(r, 2, row.unit_cost)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Total `Sales` for a region. The "North total" question keys off this.
pub fn total_sales_by_region(region: &str) -> f64 {
    SALES_ROWS
        .iter()
        .filter(|r| r.region == region)
        .map(|r| r.sales)
        .sum()
}

/// Mean `Sales` for a region, or `None` when the region has no rows. The
/// pivot-table validator's sanity check keys off this.
pub fn average_sales_by_region(region: &str) -> Option<f64> {
    let rows: Vec<f64> = SALES_ROWS
        .iter()
        .filter(|r| r.region == region)
        .map(|r| r.sales)
        .collect();
    if rows.is_empty() {
        return None;
    }
    Some(rows.iter().sum::<f64>() / rows.len() as f64)
}

/// Total profit (`Sales` - `Unit_Cost`, per the Products lookup) for a
/// category. The "Electronics profit" question keys off this.
pub fn total_profit_by_category(category: &str) -> f64 {
    SALES_ROWS
        .iter()
        .filter(|r| r.category == category)
        .map(|r| {
            let unit_cost = PRODUCT_ROWS
                .iter()
                .find(|p| p.product_id == r.product_id)
                .map(|p| p.unit_cost)
                .unwrap_or(0.0);
            r.sales - unit_cost
        })
        .sum()
}
