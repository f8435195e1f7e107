mod catalog;

use std::collections::BTreeSet;
use std::fs::File;
use std::sync::Arc;

use simplelog::{Config, LevelFilter, WriteLogger};
use tablegrid_lib::config::TableConfig;
use tablegrid_lib::controller::{Dispatch, EscalationPolicy, FetchStatus};
use tablegrid_lib::error::{FetchError, FieldErrors, TableError};
use tablegrid_lib::model::{Row, RowId};
use tablegrid_lib::query::{FilterRule, QueryDescriptor, Sort};
use tablegrid_lib::selection::SelectAllScope;
use tablegrid_lib::table::{DataTable, TableListener};

use crate::catalog::CatalogServer;

/// Prints table events to stdout.
struct ConsoleListener;

impl TableListener for ConsoleListener {
    fn on_row_updated(&self, row: &Row) {
        match row.get_str("name") {
            Ok(name) => println!("  row updated: {}", name.unwrap_or("<unnamed>")),
            Err(e) => {
                let e = match row.id("sku") {
                    Some(id) => e.in_row(id),
                    None => e,
                };
                log::warn!("[demo] {}", e);
            }
        }
    }

    fn on_selection_change(&self, selected: &BTreeSet<RowId>) {
        println!("  {} selected", selected.len());
    }

    fn on_edit_error(&self, errors: &FieldErrors) {
        println!("  edit rejected: {}", errors);
    }

    fn on_fetch_error(&self, error: &FetchError) {
        println!("  fetch failed: {}", error);
    }
}

fn print_view(title: &str, table: &DataTable) {
    let view = table.view();
    println!(
        "{} (page {}/{}, {} matched{})",
        title,
        table.descriptor().page(),
        table.page_count().max(1),
        view.total_matched(),
        if view.is_loading() { ", loading" } else { "" }
    );
    for row in view.rows() {
        let text: Vec<String> = table
            .columns()
            .visible_columns()
            .map(|c| table.columns().cell_text(row, c.field()))
            .collect();
        println!("  {}", text.join(" | "));
    }
}

/// Runs a dispatch to completion.
async fn settle(table: &mut DataTable, dispatch: Dispatch) -> Result<(), TableError> {
    if let Dispatch::Remote(pending) = dispatch {
        let completion = pending.run().await;
        table.complete_fetch(completion)?;
    }
    Ok(())
}

async fn run() -> Result<(), TableError> {
    let server = Arc::new(CatalogServer::new(Some(2))?);
    let config = TableConfig::new("sku")
        .with_page_size(4)
        .with_escalation(EscalationPolicy::Automatic)
        .with_controls(true, false);

    let mut table = DataTable::new(config, catalog::columns(), catalog::products())?
        .with_source(server)
        .with_listener(ConsoleListener);
    table.set_freeze_count(2);
    table.toggle_column("released")?;

    // Local mode
    let _ = table.mount();
    print_view("Catalog", &table);

    let _ = table.set_sort(Sort::asc("price"));
    print_view("By price", &table);

    let _ = table.add_filter(FilterRule::equals("category", "furniture"))?;
    print_view("Furniture", &table);

    table.select_all(SelectAllScope::AllMatched);
    let _ = table.clear_filters();

    let target = RowId::from("SKU-002");
    table.start_edit(&target)?;
    table.set_field("price", -10.0)?;
    if table.commit_edit().is_err() {
        table.set_field("price", 149.0)?;
        table.commit_edit()?;
    }
    print_view("After edit", &table);

    // Escalation to the server
    let descriptor = table.descriptor().with_search("desk");
    let dispatch = table.submit_to_server(descriptor);
    print_view("Searching server", &table);
    settle(&mut table, dispatch).await?;
    print_view("Server results", &table);

    // Two page requests in flight; the slow one must not win
    let _ = table.set_search("");
    let slow = table.set_page(2).into_pending();
    let fast = table.set_page(3).into_pending();
    if let (Some(slow), Some(fast)) = (slow, fast) {
        let (slow, fast) = tokio::join!(slow.run(), fast.run());
        table.complete_fetch(fast)?;
        if table.complete_fetch(slow)? == FetchStatus::Discarded {
            println!("Discarded stale page 2");
        }
    }
    print_view("Latest page", &table);

    let first_page = QueryDescriptor::new(table.descriptor().page_size());
    let dispatch = table.submit(first_page);
    settle(&mut table, dispatch).await?;
    print_view("Back to page 1", &table);

    Ok(())
}

#[tokio::main]
async fn main() {
    let log_file = File::create("tablegrid-demo.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
    }
}
