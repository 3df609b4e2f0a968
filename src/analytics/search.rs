use crate::types::ResultRow;

/// True if `query` (already lowercased) occurs in the row's id, name, or category.
/// Absent fields never match.
fn matches_lowered(row: &ResultRow, query: &str) -> bool {
    let id_hit = row
        .product_id
        .as_ref()
        .is_some_and(|id| id.to_string().to_lowercase().contains(query));
    let name_hit = row
        .product_name
        .as_deref()
        .is_some_and(|n| n.to_lowercase().contains(query));
    let category_hit = row
        .category
        .as_deref()
        .is_some_and(|c| c.to_lowercase().contains(query));

    id_hit || name_hit || category_hit
}

/// Case-insensitive substring match against id, name and category.
/// An empty query matches every row.
pub fn row_matches(row: &ResultRow, query: &str) -> bool {
    query.is_empty() || matches_lowered(row, &query.to_lowercase())
}

/// Rows matching `query`, in their original order.
pub fn filter_rows<'a, I>(rows: I, query: &str) -> Vec<&'a ResultRow>
where
    I: IntoIterator<Item = &'a ResultRow>,
{
    if query.is_empty() {
        return rows.into_iter().collect();
    }
    let q = query.to_lowercase();
    rows.into_iter().filter(|row| matches_lowered(row, &q)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn row(id: Option<ProductId>, name: Option<&str>, category: Option<&str>, days_left: i64) -> ResultRow {
        ResultRow {
            product_id: id,
            product_name: name.map(str::to_string),
            category: category.map(str::to_string),
            days_left,
            stockout_date: None,
        }
    }

    fn sample() -> Vec<ResultRow> {
        vec![
            row(Some(101.into()), Some("Basmati Rice"), Some("Grocery"), 4),
            row(Some(202.into()), Some("LED Bulb"), Some("Electronics"), 30),
            row(Some("SKU-RICE-9".into()), None, None, 12),
            row(None, Some("Rice Bran Oil"), Some("Grocery"), -1),
            row(None, None, None, 8),
        ]
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let rows = sample();
        let out = filter_rows(&rows, "");
        assert_eq!(out.len(), rows.len());
        for (a, b) in out.iter().zip(rows.iter()) {
            assert!(std::ptr::eq(*a, b));
        }
    }

    #[test]
    fn matches_are_case_insensitive_across_fields() {
        let rows = sample();
        let out: Vec<i64> = filter_rows(&rows, "RiCe").iter().map(|r| r.days_left).collect();
        assert_eq!(out, vec![4, 12, -1]);

        let out: Vec<i64> = filter_rows(&rows, "electro").iter().map(|r| r.days_left).collect();
        assert_eq!(out, vec![30]);
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let rows = sample();
        let out: Vec<i64> = filter_rows(&rows, "20").iter().map(|r| r.days_left).collect();
        assert_eq!(out, vec![30]);
    }

    #[test]
    fn missing_fields_never_match() {
        let rows = sample();
        assert!(!row_matches(&rows[4], "a"));
        assert!(row_matches(&rows[4], ""));
        assert!(filter_rows(&rows, "zzz").is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let rows = sample();
        let once = filter_rows(&rows, "gro");
        let twice = filter_rows(once.iter().copied(), "gro");
        assert_eq!(once, twice);
    }
}
