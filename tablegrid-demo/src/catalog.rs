//! Sample product catalog and an in-process server for it.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tablegrid_lib::columns::ColumnRegistry;
use tablegrid_lib::error::FetchError;
use tablegrid_lib::eval::evaluate;
use tablegrid_lib::model::ColumnDefinition;
use tablegrid_lib::model::ColumnType;
use tablegrid_lib::model::Row;
use tablegrid_lib::query::QueryDescriptor;
use tablegrid_lib::remote::RemotePage;
use tablegrid_lib::remote::RemoteSource;

const NAMES: &[&str] = &[
    "Gaming Laptop",
    "Office Chair",
    "Phone",
    "Workstation",
    "Desk Lamp",
    "Monitor Arm",
    "Standing Desk",
    "Webcam",
    "Headset",
    "Bookshelf",
    "Keyboard",
    "Filing Cabinet",
];

const CATEGORIES: &[&str] = &["Electronics", "Furniture"];
const OWNERS: &[&str] = &["Ada", "Grace", "Linus", "Barbara"];

pub fn columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("sku", ColumnType::Text).header("SKU"),
        ColumnDefinition::new("name", ColumnType::Text)
            .header("Product")
            .sortable()
            .editable()
            .width(12, 32),
        ColumnDefinition::new("category", ColumnType::Tag).header("Category"),
        ColumnDefinition::new("price", ColumnType::Number)
            .header("Price")
            .sortable()
            .editable()
            .validate_with(|v| match v.as_f64() {
                Some(p) if p < 0.0 => Err("Price cannot be negative".into()),
                _ => Ok(()),
            }),
        ColumnDefinition::new("released", ColumnType::Date).header("Released").sortable(),
        ColumnDefinition::new("owner", ColumnType::Avatar).header("Owner"),
    ]
}

pub fn products() -> Vec<Row> {
    NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let lower = name.to_lowercase();
            let category = if ["desk", "chair", "shelf", "cabinet"].iter().any(|w| lower.contains(w)) {
                CATEGORIES[1]
            } else {
                CATEGORIES[0]
            };
            let owner = OWNERS[i % OWNERS.len()];
            Row::new()
                .set("sku", format!("SKU-{:03}", i + 1))
                .set("name", *name)
                .set("category", json!({ "status": category, "color": "blue" }))
                .set("price", 99.99 + (i as f64 * 373.0) % 3900.0)
                .set("released", format!("2024-{:02}-15", i % 12 + 1))
                .set("owner", json!({ "label": owner, "src": format!("/avatars/{}.png", owner.to_lowercase()) }))
        })
        .collect()
}

/// Answers descriptors over the catalog with simulated latency.
///
/// `slow_page` takes much longer than every other page, which makes
/// out-of-order completions easy to provoke.
pub struct CatalogServer {
    rows: Vec<Row>,
    columns: ColumnRegistry,
    slow_page: Option<usize>,
}

impl CatalogServer {
    pub fn new(slow_page: Option<usize>) -> Result<Self, tablegrid_lib::error::ColumnError> {
        Ok(Self {
            rows: products(),
            columns: ColumnRegistry::new(columns())?,
            slow_page,
        })
    }

    fn latency(&self, descriptor: &QueryDescriptor) -> Duration {
        if self.slow_page == Some(descriptor.page()) {
            Duration::from_millis(250)
        } else {
            Duration::from_millis(25)
        }
    }
}

#[async_trait]
impl RemoteSource for CatalogServer {
    async fn fetch(&self, descriptor: &QueryDescriptor) -> Result<RemotePage, FetchError> {
        tokio::time::sleep(self.latency(descriptor)).await;
        log::debug!(
            "[server] page {} search {:?} ({} filters)",
            descriptor.page(),
            descriptor.search_text(),
            descriptor.filters().len()
        );
        let view = evaluate(&self.rows, &self.columns, descriptor);
        let total = view.total_matched();
        Ok(RemotePage::new(view.into_rows(), total))
    }
}
