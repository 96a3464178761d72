//! Column/row tables and their templates.

use super::{id_field, is_blank, parse_raw, text_of, Parsed};
use crate::artifact::RawContent;
use crate::content::{Column, Row, TableContent};
use serde_json::{Map, Value};

#[derive(Debug, PartialEq, Eq)]
pub struct ColumnTemplate {
    pub field: &'static str,
    pub header: &'static str,
    pub width: Option<u32>,
    pub flex: Option<u32>,
    pub column_type: Option<&'static str>,
}

impl ColumnTemplate {
    fn to_column(&self) -> Column {
        let mut extra = Map::new();
        if let Some(width) = self.width {
            extra.insert("width".into(), Value::from(width));
        }
        if let Some(flex) = self.flex {
            extra.insert("flex".into(), Value::from(flex));
        }
        Column {
            field: self.field.to_owned(),
            header_name: self.header.to_owned(),
            column_type: self.column_type.map(str::to_owned),
            extra,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TableTemplate {
    pub columns: &'static [ColumnTemplate],
    /// Key of the bare item list older content stored instead of `rows`.
    pub legacy_key: &'static str,
    pub id_prefix: &'static str,
    /// Values filled into legacy items that lack them.
    pub row_defaults: &'static [(&'static str, &'static str)],
    /// Column free text lands in.
    pub text_field: &'static str,
}

impl TableTemplate {
    fn columns(&self) -> Vec<Column> {
        self.columns.iter().map(ColumnTemplate::to_column).collect()
    }

    fn row_id(&self, index: usize) -> String {
        format!("{}{}", self.id_prefix, index + 1)
    }
}

const fn fixed(field: &'static str, header: &'static str, width: u32) -> ColumnTemplate {
    ColumnTemplate {
        field,
        header,
        width: Some(width),
        flex: None,
        column_type: None,
    }
}

const fn flex(field: &'static str, header: &'static str) -> ColumnTemplate {
    ColumnTemplate {
        field,
        header,
        width: None,
        flex: Some(1),
        column_type: None,
    }
}

const fn date(field: &'static str, header: &'static str) -> ColumnTemplate {
    ColumnTemplate {
        field,
        header,
        width: Some(130),
        flex: None,
        column_type: Some("date"),
    }
}

pub static TEST_CASES: TableTemplate = TableTemplate {
    columns: &[
        fixed("id", "ID", 100),
        flex("title", "Test Case"),
        flex("description", "Description"),
        fixed("status", "Status", 120),
        fixed("priority", "Priority", 100),
        flex("steps", "Steps"),
        flex("expectedResult", "Expected Result"),
    ],
    legacy_key: "testCases",
    id_prefix: "TC-",
    row_defaults: &[("status", "Not Started"), ("priority", "Medium")],
    text_field: "title",
};

pub static RISK_REGISTER: TableTemplate = TableTemplate {
    columns: &[
        fixed("id", "ID", 90),
        flex("description", "Risk Description"),
        fixed("probability", "Probability", 110),
        fixed("impact", "Impact", 100),
        fixed("severity", "Severity", 100),
        flex("mitigation", "Mitigation Strategy"),
        fixed("owner", "Owner", 130),
        fixed("status", "Status", 110),
    ],
    legacy_key: "risks",
    id_prefix: "R-",
    row_defaults: &[
        ("probability", "Medium"),
        ("impact", "Medium"),
        ("severity", "Medium"),
        ("status", "Open"),
    ],
    text_field: "description",
};

pub static DEFECTS: TableTemplate = TableTemplate {
    columns: &[
        fixed("id", "ID", 100),
        flex("title", "Defect Title"),
        flex("description", "Description"),
        fixed("severity", "Severity", 100),
        fixed("priority", "Priority", 100),
        fixed("status", "Status", 110),
        fixed("assignee", "Assignee", 130),
        fixed("reportedBy", "Reported By", 130),
        date("reportedDate", "Reported Date"),
    ],
    legacy_key: "defects",
    id_prefix: "DEF-",
    row_defaults: &[
        ("severity", "Medium"),
        ("priority", "Medium"),
        ("status", "New"),
        ("reportedDate", ""),
    ],
    text_field: "title",
};

pub static TRACE_MATRIX: TableTemplate = TableTemplate {
    columns: &[
        fixed("id", "Requirement ID", 130),
        flex("requirement", "Requirement"),
        fixed("source", "Source", 130),
        fixed("designRef", "Design Reference", 150),
        fixed("testCase", "Test Case", 130),
        fixed("status", "Status", 120),
    ],
    legacy_key: "requirements",
    id_prefix: "REQ-",
    row_defaults: &[("status", "Open")],
    text_field: "requirement",
};

pub static TEST_RESULTS: TableTemplate = TableTemplate {
    columns: &[
        fixed("id", "ID", 100),
        fixed("testCase", "Test Case", 130),
        fixed("result", "Result", 100),
        fixed("executedBy", "Executed By", 130),
        date("executedDate", "Executed Date"),
        flex("notes", "Notes"),
    ],
    legacy_key: "results",
    id_prefix: "TR-",
    row_defaults: &[("result", "Not Run")],
    text_field: "notes",
};

/// Generic three-column table for types without their own layout.
pub static FREEFORM_TABLE: TableTemplate = TableTemplate {
    columns: &[
        fixed("id", "ID", 100),
        flex("name", "Name"),
        flex("description", "Description"),
    ],
    legacy_key: "items",
    id_prefix: "ROW-",
    row_defaults: &[],
    text_field: "description",
};

/// Normalizes table content.
///
/// Content with both `columns` and `rows` is kept as it is, and content with only `rows` gets
/// the template's columns. A bare item list, either top level or under the template's legacy
/// key, becomes rows with ids and defaults filled in. Free text, or a single value where a list
/// was expected, becomes a single row.
pub fn normalize_table(template: &TableTemplate, raw: &RawContent) -> TableContent {
    match parse_raw(raw) {
        Parsed::Text(text) => {
            let rows = if text.trim().is_empty() {
                Vec::new()
            } else {
                let mut fields = Map::new();
                fields.insert(template.text_field.into(), Value::String(text));
                vec![Row {
                    id: template.row_id(0),
                    fields,
                }]
            };
            TableContent {
                columns: template.columns(),
                rows,
                extra: Map::new(),
            }
        }
        Parsed::Array(items) => TableContent {
            columns: template.columns(),
            rows: legacy_rows(template, &items),
            extra: Map::new(),
        },
        Parsed::Object(mut map) => {
            let rows = match map.remove("rows") {
                Some(Value::Array(rows)) => Some(
                    rows.iter()
                        .enumerate()
                        .map(|(i, v)| row_from_value(template, i, v))
                        .collect(),
                ),
                Some(Value::Null) | None => None,
                Some(other) => {
                    tracing::debug!("table rows are not a list, keeping the value as one row");
                    Some(legacy_rows(template, std::slice::from_ref(&other)))
                }
            };
            if let Some(rows) = rows {
                let columns = match map.remove("columns") {
                    Some(Value::Array(cols)) => {
                        cols.iter().enumerate().map(column_from_value).collect()
                    }
                    _ => template.columns(),
                };
                return TableContent {
                    columns,
                    rows,
                    extra: map,
                };
            }
            let rows = match map.remove(template.legacy_key) {
                Some(Value::Array(items)) => legacy_rows(template, &items),
                Some(Value::Null) | None => Vec::new(),
                Some(other) => legacy_rows(template, std::slice::from_ref(&other)),
            };
            map.remove("columns");
            TableContent {
                columns: template.columns(),
                rows,
                extra: map,
            }
        }
    }
}

fn legacy_rows(template: &TableTemplate, items: &[Value]) -> Vec<Row> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut row = row_from_value(template, i, item);
            for (field, default) in template.row_defaults {
                if is_blank(row.fields.get(*field)) {
                    row.fields
                        .insert((*field).to_owned(), Value::String((*default).to_owned()));
                }
            }
            row
        })
        .collect()
}

fn row_from_value(template: &TableTemplate, index: usize, value: &Value) -> Row {
    match value {
        Value::Object(obj) => {
            let mut fields = obj.clone();
            let id = id_field(obj, "id").unwrap_or_else(|| template.row_id(index));
            fields.remove("id");
            Row { id, fields }
        }
        other => {
            let mut fields = Map::new();
            fields.insert(template.text_field.into(), Value::String(text_of(other)));
            Row {
                id: template.row_id(index),
                fields,
            }
        }
    }
}

fn column_from_value((index, value): (usize, &Value)) -> Column {
    match value {
        Value::Object(obj) => {
            let mut extra = obj.clone();
            let field = match id_field(obj, "field") {
                Some(field) => field,
                None => {
                    extra.remove("id");
                    id_field(obj, "id").unwrap_or_else(|| format!("column{}", index + 1))
                }
            };
            let header_name = match id_field(obj, "headerName") {
                Some(header) => header,
                None => {
                    extra.remove("name");
                    id_field(obj, "name").unwrap_or_else(|| field.clone())
                }
            };
            let column_type = id_field(obj, "type");
            for key in ["field", "headerName", "type"] {
                extra.remove(key);
            }
            Column {
                field,
                header_name,
                column_type,
                extra,
            }
        }
        other => {
            let field = text_of(other);
            Column {
                header_name: field.clone(),
                field,
                column_type: None,
                extra: Map::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_list_gets_ids_and_defaults() {
        let raw = RawContent::Structured(json!({"testCases": [{"title": "Login"}]}));
        let table = normalize_table(&TEST_CASES, &raw);
        assert_eq!(table.columns.len(), 7);
        assert_eq!(table.columns[0].field, "id");
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.id, "TC-1");
        assert_eq!(row.get("title"), Some(&json!("Login")));
        assert_eq!(row.get("status"), Some(&json!("Not Started")));
        assert_eq!(row.get("priority"), Some(&json!("Medium")));
    }

    #[test]
    fn test_existing_ids_and_values_are_kept() {
        let raw = RawContent::Structured(json!({
            "risks": [{"id": "R-9", "description": "Vendor lock-in", "impact": "High"}]
        }));
        let table = normalize_table(&RISK_REGISTER, &raw);
        let row = &table.rows[0];
        assert_eq!(row.id, "R-9");
        assert_eq!(row.get("impact"), Some(&json!("High")));
        assert_eq!(row.get("probability"), Some(&json!("Medium")));
        assert_eq!(row.get("status"), Some(&json!("Open")));
    }

    #[test]
    fn test_top_level_array_is_treated_as_item_list() {
        let raw = RawContent::Structured(json!([{"title": "Crash on save"}, "Typo"]));
        let table = normalize_table(&DEFECTS, &raw);
        assert_eq!(table.rows[0].id, "DEF-1");
        assert_eq!(table.rows[0].get("status"), Some(&json!("New")));
        assert_eq!(table.rows[0].get("reportedDate"), Some(&json!("")));
        assert_eq!(table.rows[1].get("title"), Some(&json!("Typo")));
    }

    #[test]
    fn test_canonical_table_is_kept() {
        let raw = RawContent::Structured(json!({
            "columns": [{"field": "a", "headerName": "A", "width": 50}],
            "rows": [{"id": "x", "a": 1}]
        }));
        let table = normalize_table(&TEST_CASES, &raw);
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].extra.get("width"), Some(&json!(50)));
        assert_eq!(table.rows[0].id, "x");
        assert!(table.rows[0].get("status").is_none());
    }

    #[test]
    fn test_rows_without_columns_use_template() {
        let raw = RawContent::Structured(json!({"rows": [{"name": "a"}]}));
        let table = normalize_table(&FREEFORM_TABLE, &raw);
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.rows[0].id, "ROW-1");
    }

    #[test]
    fn test_text_becomes_single_row() {
        let table = normalize_table(&TEST_CASES, &RawContent::Text("check login".into()));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("title"), Some(&json!("check login")));

        let empty = normalize_table(&TEST_CASES, &RawContent::Text("  ".into()));
        assert!(empty.rows.is_empty());
        assert_eq!(empty.columns.len(), 7);
    }

    #[test]
    fn test_scalar_rows_value_is_kept_as_a_row() {
        let raw = RawContent::Structured(json!({"rows": "login times out"}));
        let table = normalize_table(&TEST_CASES, &raw);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].id, "TC-1");
        assert_eq!(table.rows[0].get("title"), Some(&json!("login times out")));

        let again = normalize_table(
            &TEST_CASES,
            &crate::content::CanonicalContent::Table(table.clone()).to_raw(),
        );
        assert_eq!(again, table);
    }

    #[test]
    fn test_single_object_under_rows_or_legacy_key_is_kept() {
        let rows = normalize_table(&RISK_REGISTER, &RawContent::Structured(json!({
            "rows": {"id": "R-3", "description": "Key person leaves"}
        })));
        assert_eq!(rows.rows[0].id, "R-3");
        assert_eq!(rows.rows[0].get("description"), Some(&json!("Key person leaves")));

        let legacy = normalize_table(&RISK_REGISTER, &RawContent::Structured(json!({
            "risks": {"description": "Budget cut"}
        })));
        assert_eq!(legacy.rows.len(), 1);
        assert_eq!(legacy.rows[0].get("description"), Some(&json!("Budget cut")));
        assert_eq!(legacy.rows[0].get("status"), Some(&json!("Open")));
    }

    #[test]
    fn test_column_aliases_are_read() {
        let raw = RawContent::Structured(json!({
            "columns": [{"id": "owner", "name": "Owner"}],
            "rows": []
        }));
        let table = normalize_table(&FREEFORM_TABLE, &raw);
        assert_eq!(table.columns[0].field, "owner");
        assert_eq!(table.columns[0].header_name, "Owner");
        assert!(table.columns[0].extra.is_empty());
    }
}
