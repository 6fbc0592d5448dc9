//! HTML table extraction from rendered page source.
//!
//! The site renders holdings as ordinary `<table>` markup once the
//! client-side transition finishes, so extraction works on the full page
//! source string. Two capabilities: pull every rendered table, or the first
//! table whose text matches a filter.

use scraper::{ElementRef, Html, Selector};

use crate::error::FetchError;
use crate::models::{COLUMNS, Holding, PageSnapshot};

/// A table lifted out of the markup as plain text cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn selector(s: &str) -> Selector {
    // All selectors here are string literals; a parse failure is a typo.
    Selector::parse(s).unwrap_or_else(|e| panic!("selector {s:?}: {e:?}"))
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn lift_table(table: ElementRef<'_>) -> RawTable {
    let th_sel = selector("thead th");
    let tr_sel = selector("tbody tr");
    let any_tr_sel = selector("tr");
    let td_sel = selector("td");

    let headers: Vec<String> = table.select(&th_sel).map(cell_text).collect();

    let mut rows = Vec::new();
    let body_rows: Vec<ElementRef<'_>> = table.select(&tr_sel).collect();
    let candidates = if body_rows.is_empty() {
        // No tbody; take every tr and let the td selector skip header rows.
        table.select(&any_tr_sel).collect()
    } else {
        body_rows
    };

    for tr in candidates {
        let cells: Vec<String> = tr.select(&td_sel).map(cell_text).collect();
        if cells.is_empty() || cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        rows.push(cells);
    }

    RawTable { headers, rows }
}

/// Extract every rendered table, in document order.
pub fn extract_tables(html: &str) -> Vec<RawTable> {
    let doc = Html::parse_document(html);
    let table_sel = selector("table");
    doc.select(&table_sel).map(lift_table).collect()
}

/// Extract the first table whose header or cell text contains `filter`.
pub fn extract_first_matching(html: &str, filter: &str) -> Option<RawTable> {
    extract_tables(html).into_iter().find(|t| {
        t.headers.iter().any(|h| h.contains(filter))
            || t.rows.iter().flatten().any(|c| c.contains(filter))
    })
}

/// Type a raw table into holdings rows.
///
/// Exactly five cells per row; anything else means the site changed its
/// layout and silently mis-assigning columns would be worse than failing.
pub fn parse_holdings(table: &RawTable) -> Result<PageSnapshot, FetchError> {
    let mut rows = Vec::with_capacity(table.rows.len());
    for cells in &table.rows {
        if cells.len() != COLUMNS.len() {
            return Err(FetchError::SchemaDrift {
                expected: COLUMNS.len(),
                found: cells.len(),
            });
        }
        rows.push(Holding {
            symbol: cells[0].clone(),
            description: cells[1].clone(),
            portfolio_weight: cells[2].clone(),
            shares_held: cells[3].clone(),
            market_value: cells[4].clone(),
        });
    }
    Ok(rows)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table id="summary">
          <thead><tr><th>Fund</th><th>Assets</th></tr></thead>
          <tbody><tr><td>SCHB</td><td>$25B</td></tr></tbody>
        </table>
        <table id="holdings">
          <thead><tr>
            <th>Symbol</th><th>Description</th><th>Portfolio Weight</th>
            <th>Shares Held</th><th>Market Value</th>
          </tr></thead>
          <tbody>
            <tr><td>AAPL</td><td>Apple Inc</td><td>6.5%</td><td>1.2M</td><td>$240M</td></tr>
            <tr><td>MSFT</td><td>Microsoft</td><td>5.9%</td><td>900K</td><td>$210M</td></tr>
          </tbody>
        </table>
        </body></html>"#;

    #[test]
    fn extracts_all_tables_in_order() {
        let tables = extract_tables(PAGE);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].headers[0], "Fund");
        assert_eq!(tables[1].headers[0], "Symbol");
    }

    #[test]
    fn filter_finds_the_holdings_table() {
        let table = extract_first_matching(PAGE, "Symbol").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "AAPL");
    }

    #[test]
    fn filter_misses_return_none() {
        assert!(extract_first_matching(PAGE, "Coupon").is_none());
    }

    #[test]
    fn typed_parse_yields_holdings() {
        let table = extract_first_matching(PAGE, "Symbol").unwrap();
        let rows = parse_holdings(&table).unwrap();
        assert_eq!(rows[0].symbol, "AAPL");
        assert_eq!(rows[0].portfolio_weight, "6.5%");
        assert_eq!(rows[1].market_value, "$210M");
    }

    #[test]
    fn unexpected_column_count_is_schema_drift() {
        let table = RawTable {
            headers: vec![],
            rows: vec![vec!["a".into(), "b".into(), "c".into()]],
        };
        match parse_holdings(&table) {
            Err(FetchError::SchemaDrift { expected: 5, found: 3 }) => {}
            other => panic!("expected schema drift, got {other:?}"),
        }
    }

    #[test]
    fn tableless_page_extracts_nothing() {
        assert!(extract_tables("<html><body><p>loading</p></body></html>").is_empty());
    }
}
