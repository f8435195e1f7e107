//! Local evaluator: search, filter, sort and paginate in-process.
//!
//! The pipeline order is fixed. Search and filters narrow the candidates
//! before the sort, and pagination runs last so `total_matched` counts every
//! match rather than one page.

use crate::columns::ColumnRegistry;
use crate::model::Row;
use crate::model::RowId;
use crate::query::Direction;
use crate::query::QueryDescriptor;
use crate::query::ViewResult;
use crate::query::matches_all;

/// Evaluates `descriptor` over `rows`.
///
/// Pure and deterministic: the same inputs always produce the same view, and
/// `is_loading` is always `false`. A page past the end yields no rows but the
/// correct `total_matched`.
///
/// # Panics
///
/// Panics if the descriptor's page or page size is 0.
///
/// # Example
///
/// ```
/// use tablegrid_lib::columns::ColumnRegistry;
/// use tablegrid_lib::eval::evaluate;
/// use tablegrid_lib::model::{ColumnDefinition, ColumnType, Row};
/// use tablegrid_lib::query::{QueryDescriptor, Sort};
///
/// let columns = ColumnRegistry::new(vec![ColumnDefinition::new("price", ColumnType::Number)])?;
/// let rows: Vec<Row> = [2499.99, 1199.99, 799.99, 3999.99, 599.99]
///     .iter()
///     .enumerate()
///     .map(|(i, p)| Row::new().set("id", i as i64).set("price", *p))
///     .collect();
///
/// let q = QueryDescriptor::new(2).with_sort(Sort::asc("price"));
/// let view = evaluate(&rows, &columns, &q);
///
/// let prices: Vec<_> = view.rows().iter().map(|r| r.get_f64("price").unwrap()).collect();
/// assert_eq!(prices, [Some(599.99), Some(799.99)]);
/// assert_eq!(view.total_matched(), 5);
/// # Ok::<(), tablegrid_lib::error::ColumnError>(())
/// ```
pub fn evaluate(rows: &[Row], columns: &ColumnRegistry, descriptor: &QueryDescriptor) -> ViewResult {
    descriptor.assert_valid();

    let matched = matching_rows(rows, columns, descriptor);
    let total_matched = matched.len();
    let page = matched
        .into_iter()
        .skip(descriptor.offset())
        .take(descriptor.page_size())
        .cloned()
        .collect();

    ViewResult::new(page, total_matched)
}

/// Ids of every row matching search and filters, in sorted order, ignoring
/// pagination.
pub fn matching_ids(
    rows: &[Row],
    id_field: &str,
    columns: &ColumnRegistry,
    descriptor: &QueryDescriptor,
) -> Vec<RowId> {
    matching_rows(rows, columns, descriptor)
        .into_iter()
        .filter_map(|row| row.id(id_field))
        .collect()
}

/// Steps 1-3 of the pipeline: search, filter, sort.
fn matching_rows<'a>(
    rows: &'a [Row],
    columns: &ColumnRegistry,
    descriptor: &QueryDescriptor,
) -> Vec<&'a Row> {
    // Whitespace is significant; only an empty search text is skipped.
    let needle = descriptor.search_text().to_lowercase();

    let mut matched: Vec<&Row> = rows
        .iter()
        .filter(|row| needle.is_empty() || search_matches(row, columns, &needle))
        .filter(|row| matches_all(descriptor.filters(), row, columns))
        .collect();

    let sort = descriptor.sort();
    if sort.is_active() {
        let mut keyed: Vec<_> = matched
            .into_iter()
            .map(|row| (columns.cell_sort_key(row, &sort.field), row))
            .collect();
        // `sort_by` is stable: equal keys keep dataset order in both directions.
        keyed.sort_by(|(a, _), (b, _)| {
            let ordering = a.compare(b);
            match sort.direction {
                Direction::Desc => ordering.reverse(),
                _ => ordering,
            }
        });
        matched = keyed.into_iter().map(|(_, row)| row).collect();
    }

    matched
}

/// `true` if any field's canonical text contains `needle` (already lowercased).
fn search_matches(row: &Row, columns: &ColumnRegistry, needle: &str) -> bool {
    row.iter()
        .any(|(field, _)| columns.cell_text(row, field).to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::ColumnDefinition;
    use crate::model::ColumnType;
    use crate::model::Value;
    use crate::query::FilterRule;
    use crate::query::Sort;

    fn columns() -> ColumnRegistry {
        ColumnRegistry::new(vec![
            ColumnDefinition::new("id", ColumnType::Text),
            ColumnDefinition::new("name", ColumnType::Text).sortable(),
            ColumnDefinition::new("category", ColumnType::Tag),
            ColumnDefinition::new("price", ColumnType::Number).sortable(),
            ColumnDefinition::new("owner", ColumnType::Avatar),
        ])
        .unwrap()
    }

    fn product(id: &str, name: &str, category: &str, price: f64, owner: &str) -> Row {
        Row::new()
            .set("id", id)
            .set("name", name)
            .set("category", json!({ "status": category, "color": "blue" }))
            .set("price", price)
            .set("owner", json!({ "label": owner, "src": format!("/{}.png", owner) }))
    }

    fn catalog() -> Vec<Row> {
        vec![
            product("p1", "Gaming Laptop", "Electronics", 2499.99, "Ada"),
            product("p2", "Office Chair", "Furniture", 1199.99, "Grace"),
            product("p3", "Phone", "Electronics", 799.99, "Ada"),
            product("p4", "Workstation", "Electronics", 3999.99, "Linus"),
            product("p5", "Desk Lamp", "Furniture", 599.99, "Grace"),
        ]
    }

    fn ids(view: &ViewResult) -> Vec<String> {
        view.ids("id").iter().map(|id| id.to_string()).collect()
    }

    fn prices(view: &ViewResult) -> Vec<f64> {
        view.rows()
            .iter()
            .map(|r| r.get_f64("price").unwrap().unwrap())
            .collect()
    }

    #[test]
    fn test_price_scenario() {
        let q = QueryDescriptor::new(2).with_sort(Sort::asc("price"));
        let view = evaluate(&catalog(), &columns(), &q);
        assert_eq!(prices(&view), [599.99, 799.99]);
        assert_eq!(view.total_matched(), 5);
        assert!(!view.is_loading());
    }

    #[test]
    fn test_no_search_or_filters_counts_everything() {
        for page_size in 1..=7 {
            let view = evaluate(&catalog(), &columns(), &QueryDescriptor::new(page_size));
            assert_eq!(view.total_matched(), 5);
            assert!(view.len() <= page_size);
        }
        let view = evaluate(&[], &columns(), &QueryDescriptor::default());
        assert_eq!(view.total_matched(), 0);
        assert!(view.is_empty());
    }

    #[test]
    fn test_search_uses_canonical_text() {
        let q = QueryDescriptor::new(10).with_search("ada");
        assert_eq!(ids(&evaluate(&catalog(), &columns(), &q)), ["p1", "p3"]);

        // Image paths are not part of the avatar's canonical text
        let q = QueryDescriptor::new(10).with_search(".png");
        assert_eq!(evaluate(&catalog(), &columns(), &q).total_matched(), 0);

        let q = QueryDescriptor::new(10).with_search("FURNI");
        assert_eq!(ids(&evaluate(&catalog(), &columns(), &q)), ["p2", "p5"]);
    }

    #[test]
    fn test_search_keeps_surrounding_whitespace() {
        let rows = vec![
            product("p5", "Desk Lamp", "Furniture", 599.99, "Grace"),
            product("p6", "Standing Desk", "Furniture", 899.99, "Linus"),
        ];
        let view = evaluate(&rows, &columns(), &QueryDescriptor::new(10).with_search("Desk "));
        assert_eq!(ids(&view), ["p5"]);

        let view = evaluate(&rows, &columns(), &QueryDescriptor::new(10).with_search(" desk"));
        assert_eq!(ids(&view), ["p6"]);
    }

    #[test]
    fn test_timestamp_text_matches_after_wire_round_trip() {
        let columns = ColumnRegistry::new(vec![
            ColumnDefinition::new("id", ColumnType::Text),
            ColumnDefinition::new("note", ColumnType::Text),
        ])
        .unwrap();
        let row = Row::new().set("id", "n1").set("note", "2024-03-05T10:00:00Z");
        let back: Row = serde_json::from_str(&serde_json::to_string(&row).unwrap()).unwrap();
        assert_eq!(back, row);

        let q = QueryDescriptor::new(10).with_filter(FilterRule::equals("note", "2024-03-05T10:00:00Z"));
        assert_eq!(evaluate(&[row], &columns, &q).total_matched(), 1);
        assert_eq!(evaluate(&[back], &columns, &q).total_matched(), 1);
    }

    #[test]
    fn test_search_and_filter_agree_on_structured_fields() {
        let by_search = evaluate(&catalog(), &columns(), &QueryDescriptor::new(10).with_search("grace"));
        let by_filter = evaluate(
            &catalog(),
            &columns(),
            &QueryDescriptor::new(10).with_filter(FilterRule::contains("owner", "grace")),
        );
        assert_eq!(ids(&by_search), ids(&by_filter));
    }

    #[test]
    fn test_filters_and_combine_in_any_order() {
        let a = FilterRule::equals("category", "electronics");
        let b = FilterRule::starts_with("owner", "a");
        let c = FilterRule::contains("name", "o");

        let forward = QueryDescriptor::new(10).with_filters(vec![a.clone(), b.clone(), c.clone()]);
        let backward = QueryDescriptor::new(10).with_filters(vec![c, b, a]);

        let left = evaluate(&catalog(), &columns(), &forward);
        let right = evaluate(&catalog(), &columns(), &backward);
        assert_eq!(left, right);
        assert_eq!(ids(&left), ["p1", "p3"]);
    }

    #[test]
    fn test_inert_equals_filter_does_not_change_count() {
        let q = QueryDescriptor::new(10).with_filter(FilterRule::equals("name", ""));
        assert_eq!(evaluate(&catalog(), &columns(), &q).total_matched(), 5);
    }

    #[test]
    fn test_sort_descending_and_stability() {
        let rows = vec![
            product("a", "x", "Electronics", 10.0, "A"),
            product("b", "x", "Furniture", 5.0, "B"),
            product("c", "x", "Electronics", 10.0, "C"),
            product("d", "x", "Furniture", 5.0, "D"),
        ];
        let asc = evaluate(&rows, &columns(), &QueryDescriptor::new(10).with_sort(Sort::asc("price")));
        assert_eq!(ids(&asc), ["b", "d", "a", "c"]);

        let desc = evaluate(&rows, &columns(), &QueryDescriptor::new(10).with_sort(Sort::desc("price")));
        assert_eq!(ids(&desc), ["a", "c", "b", "d"]);

        // Equal keys everywhere: original order survives
        let by_name = evaluate(&rows, &columns(), &QueryDescriptor::new(10).with_sort(Sort::asc("name")));
        assert_eq!(ids(&by_name), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_text_sort_is_case_insensitive() {
        let rows = vec![
            product("1", "banana", "x", 0.0, "A"),
            product("2", "Apple", "x", 0.0, "A"),
            product("3", "cherry", "x", 0.0, "A"),
        ];
        let view = evaluate(&rows, &columns(), &QueryDescriptor::new(10).with_sort(Sort::asc("name")));
        assert_eq!(ids(&view), ["2", "1", "3"]);
    }

    #[test]
    fn test_nulls_sort_first_ascending() {
        let mut rows = catalog();
        rows[3].insert("price", Value::Null);
        let view = evaluate(&rows, &columns(), &QueryDescriptor::new(10).with_sort(Sort::asc("price")));
        assert_eq!(ids(&view)[0], "p4");
        let view = evaluate(&rows, &columns(), &QueryDescriptor::new(10).with_sort(Sort::desc("price")));
        assert_eq!(ids(&view)[4], "p4");
    }

    #[test]
    fn test_page_past_end_is_empty_with_count() {
        let q = QueryDescriptor::new(2).with_page(4);
        let view = evaluate(&catalog(), &columns(), &q);
        assert!(view.is_empty());
        assert_eq!(view.total_matched(), 5);

        let last = evaluate(&catalog(), &columns(), &QueryDescriptor::new(2).with_page(3));
        assert_eq!(ids(&last), ["p5"]);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let q = QueryDescriptor::new(3)
            .with_search("e")
            .with_sort(Sort::desc("name"))
            .with_page(2);
        let rows = catalog();
        assert_eq!(evaluate(&rows, &columns(), &q), evaluate(&rows, &columns(), &q));
    }

    #[test]
    fn test_matching_ids_ignores_pagination() {
        let q = QueryDescriptor::new(1).with_filter(FilterRule::equals("category", "furniture"));
        assert_eq!(
            matching_ids(&catalog(), "id", &columns(), &q),
            [RowId::from("p2"), RowId::from("p5")]
        );
    }

    #[test]
    #[should_panic(expected = "page size must be at least 1")]
    fn test_malformed_descriptor_panics() {
        let q: QueryDescriptor = serde_json::from_value(json!({
            "searchText": "",
            "filters": [],
            "sort": { "field": "", "direction": "none" },
            "page": 1,
            "pageSize": 0
        }))
        .unwrap();
        evaluate(&catalog(), &columns(), &q);
    }
}
