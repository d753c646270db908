//! Schema.org JSON-LD strategy
//!
//! Every `<script type="application/ld+json">` block is parsed on its own. A
//! block that fails to parse is skipped; it never aborts the extraction.

use crate::dom::{clean_text, Document};
use crate::extract::types::{Address, BusinessHours, PriceEntry, RatingEntry, Source};
use serde_json::{Map, Value};

/// A JSON-LD object and the property it was reached through
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    pub key: Option<&'a str>,
    pub fields: &'a Map<String, Value>,
}

impl<'a> SchemaNode<'a> {
    /// Whether `@type` names `type_name` (either bare or as a schema.org URL)
    pub fn is_type(&self, type_name: &str) -> bool {
        let matches = |t: &str| {
            t.rsplit('/')
                .next()
                .is_some_and(|short| short.eq_ignore_ascii_case(type_name))
        };
        match self.fields.get("@type") {
            Some(Value::String(t)) => matches(t),
            Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches),
            _ => false,
        }
    }

    pub fn is_typed(&self) -> bool {
        self.fields.contains_key("@type")
    }

    /// Typed as one of `types`, or reached untyped through property `key`
    pub fn is_kind(&self, types: &[&str], key: &str) -> bool {
        types.iter().any(|t| self.is_type(t)) || (!self.is_typed() && self.key == Some(key))
    }

    /// Scalar field as cleaned text
    pub fn text(&self, field: &str) -> Option<String> {
        self.fields.get(field).and_then(value_text)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.text(field).and_then(|t| t.parse::<f64>().ok())
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field)
    }
}

/// Cleaned text of a string or number value
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(clean_text(s)).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses every JSON-LD block in the document
pub fn parse_json_ld(document: &Document) -> Vec<Value> {
    document
        .select_all(r#"script[type="application/ld+json"]"#)
        .into_iter()
        .filter_map(|script| parse_block(&script.text().collect::<String>()))
        .collect()
}

fn parse_block(raw: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Skipping malformed JSON-LD block: {}", e);
            None
        }
    }
}

/// All objects in the blocks, depth first, parents before children
pub fn schema_nodes(blocks: &[Value]) -> Vec<SchemaNode<'_>> {
    let mut nodes = Vec::new();
    for block in blocks {
        collect_nodes(block, None, &mut nodes);
    }
    nodes
}

fn collect_nodes<'a>(value: &'a Value, key: Option<&'a str>, out: &mut Vec<SchemaNode<'a>>) {
    match value {
        Value::Object(fields) => {
            out.push(SchemaNode { key, fields });
            for (child_key, child) in fields {
                collect_nodes(child, Some(child_key.as_str()), out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_nodes(item, key, out);
            }
        }
        _ => {}
    }
}

/// Offer prices
pub fn prices(nodes: &[SchemaNode]) -> Vec<PriceEntry> {
    nodes
        .iter()
        .filter(|node| node.is_kind(&["Offer", "AggregateOffer"], "offers"))
        .filter_map(|node| {
            Some(PriceEntry {
                value: node.text("price").or_else(|| node.text("lowPrice"))?,
                currency: node.text("priceCurrency"),
                source: Source::Schema,
            })
        })
        .collect()
}

/// Aggregate ratings
pub fn ratings(nodes: &[SchemaNode]) -> Vec<RatingEntry> {
    nodes
        .iter()
        .filter(|node| node.is_kind(&["AggregateRating"], "aggregateRating"))
        .filter_map(|node| {
            Some(RatingEntry {
                value: node.number("ratingValue")?,
                max: node.number("bestRating").unwrap_or(5.0),
                count: node
                    .number("ratingCount")
                    .or_else(|| node.number("reviewCount"))
                    .map(|count| count as u64),
                source: Source::Schema,
            })
        })
        .collect()
}

/// Postal addresses, plus plain-text `address` values
pub fn addresses(nodes: &[SchemaNode]) -> Vec<Address> {
    let mut found = Vec::new();
    for node in nodes {
        if node.is_kind(&["PostalAddress"], "address") {
            found.extend(postal_address(node));
        }
        if let Some(Value::String(text)) = node.get("address") {
            let formatted = clean_text(text);
            if !formatted.is_empty() {
                found.push(Address::from_text(formatted, Source::Schema));
            }
        }
    }
    found
}

fn postal_address(node: &SchemaNode) -> Option<Address> {
    let country = match node.get("addressCountry") {
        Some(Value::Object(country)) => country.get("name").and_then(value_text),
        Some(other) => value_text(other),
        None => None,
    };

    let street = node.text("streetAddress");
    let locality = node.text("addressLocality");
    let region = node.text("addressRegion");
    let postal_code = node.text("postalCode");

    let formatted = [&street, &locality, &region, &postal_code, &country]
        .into_iter()
        .flatten()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if formatted.is_empty() {
        return None;
    }

    Some(Address {
        formatted,
        street,
        locality,
        region,
        postal_code,
        country,
        source: Source::Schema,
    })
}

/// `openingHours` and `openingHoursSpecification`, merged in document order
pub fn business_hours(nodes: &[SchemaNode]) -> Option<BusinessHours> {
    let mut hours: Vec<String> = Vec::new();

    for node in nodes {
        match node.get("openingHours") {
            Some(Value::Array(entries)) => hours.extend(entries.iter().filter_map(value_text)),
            Some(entry) => hours.extend(value_text(entry)),
            None => {}
        }

        match node.get("openingHoursSpecification") {
            Some(Value::Array(specs)) => hours.extend(specs.iter().filter_map(format_hours_spec)),
            Some(spec) => hours.extend(format_hours_spec(spec)),
            None => {}
        }
    }

    let hours = crate::dom::contacts::dedupe(hours);
    if hours.is_empty() {
        None
    } else {
        Some(BusinessHours {
            hours,
            source: Source::Schema,
        })
    }
}

/// `"Monday, Tuesday 09:00-17:00"` from an OpeningHoursSpecification
fn format_hours_spec(spec: &Value) -> Option<String> {
    let fields = spec.as_object()?;
    let day_name = |v: &Value| value_text(v).map(|d| d.rsplit('/').next().unwrap_or_default().to_string());
    let days = match fields.get("dayOfWeek") {
        Some(Value::Array(days)) => days.iter().filter_map(day_name).collect::<Vec<_>>(),
        Some(day) => day_name(day).into_iter().collect(),
        None => Vec::new(),
    };

    let opens = fields.get("opens").and_then(value_text);
    let closes = fields.get("closes").and_then(value_text);
    let time = match (opens, closes) {
        (Some(opens), Some(closes)) => format!("{}-{}", opens, closes),
        (Some(opens), None) => opens,
        (None, Some(closes)) => format!("until {}", closes),
        (None, None) => String::new(),
    };

    let formatted = clean_text(&format!("{} {}", days.join(", "), time));
    (!formatted.is_empty()).then_some(formatted)
}
