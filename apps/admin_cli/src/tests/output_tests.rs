use super::*;
use client_core::{
    rows::ProductRow,
    view::{derive, ViewQuery},
};
use shared::{
    domain::EntityId,
    protocol::{ImportDetails, ImportIssue, ImportSummary},
};

fn product(id: &str, name: &str, price: &str) -> ProductRow {
    ProductRow {
        id: EntityId::from(id),
        name: name.to_string(),
        sku: "SKU-1".to_string(),
        category: "Home".to_string(),
        status: "active".to_string(),
        price: price.to_string(),
        stock: 3,
    }
}

#[test]
fn table_pads_columns_to_widest_cell() {
    let rows = [
        product("p1", "Lamp", "€12.50"),
        product("p22", "Walnut desk", "€120.00"),
    ];
    let refs: Vec<&ProductRow> = rows.iter().collect();
    let table = render_table(&refs);
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("ID   Name         SKU"));
    assert!(lines[1].starts_with("---  -----------  -----"));
    assert!(lines[2].starts_with("p1   Lamp         SKU-1"));
    assert!(lines[3].contains("€120.00"));
}

#[test]
fn long_cells_are_clipped() {
    let long = "x".repeat(50);
    let rows = [product("p1", &long, "€1.00")];
    let refs: Vec<&ProductRow> = rows.iter().collect();
    let table = render_table(&refs);
    assert!(table.contains(&format!("{}…", "x".repeat(31))));
    assert!(!table.contains(&long));
}

#[test]
fn footer_reports_page_and_empty_results() {
    let rows: Vec<ProductRow> = (0..12)
        .map(|i| product(&format!("p{i}"), "Lamp", "€1.00"))
        .collect();
    let query = ViewQuery {
        page: 2,
        ..ViewQuery::default()
    };
    let view = derive(&rows, &query, 10);
    assert_eq!(render_footer(&view, "products"), "Page 2 of 2 (12 products)");

    let empty = derive(&rows[..0], &ViewQuery::default(), 10);
    assert_eq!(render_footer(&empty, "products"), "No products found.");
}

#[test]
fn import_summary_lists_issues() {
    let response = ImportResponse {
        success: true,
        message: None,
        summary: ImportSummary {
            total: 3,
            successful: 1,
            failed: 1,
            duplicates: 1,
        },
        details: ImportDetails {
            failed: vec![ImportIssue {
                row: Some(2),
                key: None,
                reason: Some("Missing SKU".into()),
            }],
            duplicates: vec![ImportIssue {
                row: Some(3),
                key: Some("LAMP-1".into()),
                reason: None,
            }],
        },
    };
    assert_eq!(
        render_import(&response),
        "Imported 1 of 3 rows (1 failed, 1 duplicates)\n  failed: row 2: Missing SKU\n  duplicate: row 3 (LAMP-1)"
    );
}

#[test]
fn notification_line_has_level_prefix() {
    let notification = Notification {
        id: 1,
        level: NotificationLevel::Warning,
        title: "Nothing selected".into(),
        message: "Select at least one product to delete.".into(),
    };
    assert_eq!(
        render_notification(&notification),
        "[warning] Nothing selected: Select at least one product to delete."
    );
}
