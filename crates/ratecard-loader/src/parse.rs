//! Parsers for the spreadsheet payload formats.
//!
//! All three formats carry the same four columns in order: role name,
//! onshore cost, offshore cost, nearshore cost. The first row is a header.
//! Rows with an empty role are skipped and cost cells that do not parse
//! as a number are read as zero.

use std::str::FromStr;

use ratecard_core::RoleCost;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::LoadError;

const API_FORMAT: &str = "sheets api";
const GVIZ_FORMAT: &str = "gviz";
const CSV_FORMAT: &str = "csv";

/// Parse a Sheets v4 `values` response (`{"values": [[...], ...]}`).
pub fn parse_api_values(json: &str) -> Result<Vec<RoleCost>, LoadError> {
    #[derive(Deserialize)]
    struct ValuesResponse {
        #[serde(default)]
        values: Vec<Vec<Value>>,
    }

    let response: ValuesResponse =
        serde_json::from_str(json).map_err(|e| parse_error(API_FORMAT, e))?;

    if response.values.is_empty() {
        return Err(parse_error(API_FORMAT, "no data found in sheet"));
    }

    let roles = response
        .values
        .iter()
        .skip(1)
        .filter_map(|row| role_from_cells(row.first(), row.get(1), row.get(2), row.get(3)))
        .collect::<Vec<_>>();

    debug!(rows = response.values.len() - 1, roles = roles.len(), "parsed sheets api values");
    Ok(roles)
}

/// Parse a public `gviz` response.
///
/// The body is JSON wrapped in a JavaScript callback,
/// `google.visualization.Query.setResponse({...});`. A bare JSON object is
/// accepted too.
///
/// When Sheets detects a header row (`parsedNumHeaders > 0`) it moves the
/// labels into `table.cols` and every row is data. Otherwise the first row
/// is dropped only if none of its cost cells holds a number.
pub fn parse_gviz(body: &str) -> Result<Vec<RoleCost>, LoadError> {
    #[derive(Deserialize)]
    struct GvizResponse {
        table: GvizTable,
    }

    #[derive(Deserialize)]
    struct GvizTable {
        #[serde(default)]
        rows: Vec<GvizRow>,
        #[serde(default, rename = "parsedNumHeaders")]
        parsed_num_headers: usize,
    }

    #[derive(Deserialize)]
    struct GvizRow {
        #[serde(default)]
        c: Vec<Option<GvizCell>>,
    }

    #[derive(Deserialize)]
    struct GvizCell {
        #[serde(default)]
        v: Value,
    }

    let json = strip_gviz_wrapper(body)?;
    let response: GvizResponse =
        serde_json::from_str(json).map_err(|e| parse_error(GVIZ_FORMAT, e))?;

    fn cell(row: &GvizRow, i: usize) -> Option<&Value> {
        row.c.get(i).and_then(Option::as_ref).map(|c| &c.v)
    }

    let table = &response.table;
    let header_rows = match table.rows.first() {
        Some(first)
            if table.parsed_num_headers == 0
                && (1..=3).all(|i| !is_numeric_cell(cell(first, i))) =>
        {
            1
        }
        _ => 0,
    };

    let roles = table
        .rows
        .iter()
        .skip(header_rows)
        .filter_map(|row| role_from_cells(cell(row, 0), cell(row, 1), cell(row, 2), cell(row, 3)))
        .collect::<Vec<_>>();

    debug!(
        rows = table.rows.len(),
        header_rows,
        roles = roles.len(),
        "parsed gviz table"
    );
    Ok(roles)
}

/// Parse CSV text with a header row.
pub fn parse_csv(text: &str) -> Result<Vec<RoleCost>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut roles = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| parse_error(CSV_FORMAT, e))?;
        let role = record.get(0).unwrap_or_default();
        if role.is_empty() {
            continue;
        }
        roles.push(RoleCost::new(
            role,
            parse_cost(record.get(1).unwrap_or_default()),
            parse_cost(record.get(2).unwrap_or_default()),
            parse_cost(record.get(3).unwrap_or_default()),
        ));
    }

    debug!(roles = roles.len(), "parsed csv");
    Ok(roles)
}

/// Parse a cost cell, reading anything malformed as zero.
///
/// Dollar signs, thousands separators and whitespace are ignored, and an
/// amount in parentheses is negative.
#[must_use]
pub fn parse_cost(text: &str) -> Decimal {
    parse_money_string(text).unwrap_or(Decimal::ZERO)
}

fn parse_money_string(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == '+')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    Some(if is_negative { -value } else { value })
}

fn strip_gviz_wrapper(body: &str) -> Result<&str, LoadError> {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    let start = trimmed
        .find("setResponse(")
        .map(|i| i + "setResponse(".len())
        .ok_or_else(|| parse_error(GVIZ_FORMAT, "response is not a gviz callback"))?;
    let end = trimmed
        .rfind(')')
        .filter(|end| *end >= start)
        .ok_or_else(|| parse_error(GVIZ_FORMAT, "unterminated gviz callback"))?;

    Ok(&trimmed[start..end])
}

fn role_from_cells(
    role: Option<&Value>,
    onshore: Option<&Value>,
    offshore: Option<&Value>,
    nearshore: Option<&Value>,
) -> Option<RoleCost> {
    let name = match role? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if name.is_empty() {
        return None;
    }

    Some(RoleCost::new(
        name,
        value_cost(onshore),
        value_cost(offshore),
        value_cost(nearshore),
    ))
}

fn is_numeric_cell(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => parse_money_string(s).is_some(),
        _ => false,
    }
}

fn value_cost(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::String(s)) => parse_cost(s),
        Some(Value::Number(n)) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}

fn parse_error(format: &'static str, message: impl std::fmt::Display) -> LoadError {
    LoadError::Parse {
        format,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_cost() {
        assert_eq!(parse_cost("85"), dec!(85));
        assert_eq!(parse_cost(" $1,250.50 "), dec!(1250.50));
        assert_eq!(parse_cost("(12)"), dec!(-12));
        assert_eq!(parse_cost("-3.5"), dec!(-3.5));
        assert_eq!(parse_cost(""), Decimal::ZERO);
        assert_eq!(parse_cost("N/A"), Decimal::ZERO);
        assert_eq!(parse_cost("1.2.3"), Decimal::ZERO);
    }

    #[test]
    fn test_api_values() {
        let json = r#"{
            "range": "'Rate Card Data'!A1:D4",
            "majorDimension": "ROWS",
            "values": [
                ["Role", "Onshore", "Offshore", "Nearshore"],
                ["Senior Developer", "85", "28", "40"],
                ["", "1", "2", "3"],
                ["QA Tester", "$55", "abc"]
            ]
        }"#;
        let roles = parse_api_values(json).unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0], RoleCost::new("Senior Developer", dec!(85), dec!(28), dec!(40)));
        assert_eq!(roles[1], RoleCost::new("QA Tester", dec!(55), dec!(0), dec!(0)));
    }

    #[test]
    fn test_api_values_empty_sheet() {
        assert!(matches!(
            parse_api_values(r#"{"range": "A1:D1"}"#),
            Err(LoadError::Parse { .. })
        ));
        assert!(parse_api_values("not json").is_err());
    }

    #[test]
    fn test_api_values_header_only() {
        let roles = parse_api_values(r#"{"values": [["Role"]]}"#).unwrap();
        assert!(roles.is_empty());
    }

    #[test]
    fn test_gviz() {
        let body = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","status":"ok","table":{"cols":[],"rows":[
{"c":[{"v":"Role"},{"v":"Onshore"},{"v":"Offshore"},{"v":"Nearshore"}]},
{"c":[{"v":"Project Manager"},{"v":90.0,"f":"90"},{"v":30},{"v":"50"}]},
{"c":[null,{"v":1},{"v":2},{"v":3}]},
{"c":[{"v":"QA Tester"},{"v":55.5},null]}
]}});"#;
        let roles = parse_gviz(body).unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0], RoleCost::new("Project Manager", dec!(90), dec!(30), dec!(50)));
        assert_eq!(roles[1], RoleCost::new("QA Tester", dec!(55.5), dec!(0), dec!(0)));
    }

    #[test]
    fn test_gviz_bare_json() {
        let body = r#"{"table":{"rows":[{"c":[{"v":"Role"}]},{"c":[{"v":"PM"},{"v":1},{"v":2},{"v":3}]}]}}"#;
        let roles = parse_gviz(body).unwrap();
        assert_eq!(roles, vec![RoleCost::new("PM", dec!(1), dec!(2), dec!(3))]);
    }

    #[test]
    fn test_gviz_detected_header_keeps_first_row() {
        let body = r#"google.visualization.Query.setResponse({"status":"ok","table":{
"cols":[{"id":"A","label":"Role","type":"string"},{"id":"B","label":"Onshore","type":"number"},
{"id":"C","label":"Offshore","type":"number"},{"id":"D","label":"Nearshore","type":"number"}],
"rows":[
{"c":[{"v":"Salesforce Solution Architect"},{"v":100},{"v":34},{"v":47}]},
{"c":[{"v":"QA Tester"},{"v":55},{"v":15},{"v":30}]}
],"parsedNumHeaders":1}});"#;
        let roles = parse_gviz(body).unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].role, "Salesforce Solution Architect");
        assert_eq!(roles[1].role, "QA Tester");
    }

    #[test]
    fn test_gviz_data_first_row_without_header() {
        let body = r#"{"table":{"rows":[{"c":[{"v":"PM"},{"v":"$90"},{"v":30},{"v":50}]}],"parsedNumHeaders":0}}"#;
        let roles = parse_gviz(body).unwrap();
        assert_eq!(roles, vec![RoleCost::new("PM", dec!(90), dec!(30), dec!(50))]);
    }

    #[test]
    fn test_gviz_errors() {
        assert!(parse_gviz("<html>Sign in</html>").is_err());
        assert!(parse_gviz("google.visualization.Query.setResponse({").is_err());
        // An error status has no table
        let body = r#"google.visualization.Query.setResponse({"status":"error","errors":[]});"#;
        assert!(matches!(parse_gviz(body), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_csv() {
        let text = "Role,Onshore,Offshore,Nearshore\n\
                    Junior Developer, 69 , 11, 25\n\
                    ,1,2,3\n\
                    \"Architect, Lead\",\"$1,000\",x\n";
        let roles = parse_csv(text).unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0], RoleCost::new("Junior Developer", dec!(69), dec!(11), dec!(25)));
        assert_eq!(roles[1], RoleCost::new("Architect, Lead", dec!(1000), dec!(0), dec!(0)));
    }

    #[test]
    fn test_csv_header_only() {
        assert!(parse_csv("Role,Onshore,Offshore,Nearshore\n").unwrap().is_empty());
        assert!(parse_csv("").unwrap().is_empty());
    }
}
