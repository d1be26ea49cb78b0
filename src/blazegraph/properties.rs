use serde_json::{Map, Value};

/// Property key Blazegraph reads the new namespace name from.
pub const NAMESPACE_KEY: &str = "com.bigdata.rdf.sail.namespace";

/// Properties sent when a database is created through `POST /database`.
pub const DATABASE_PROPERTIES: [(&str, &str); 7] = [
    (
        "com.bigdata.rdf.store.DataLoader",
        "com.bigdata.rdf.data.RDFDataLoader",
    ),
    (
        "com.bigdata.rdf.store.DataLoader.context",
        "com.bigdata.rdf.data.RDFDataLoaderContext",
    ),
    ("com.bigdata.rdf.sail.isolates", "true"),
    ("com.bigdata.rdf.sail.quads", "true"),
    ("com.bigdata.rdf.sail.axioms", "true"),
    ("com.bigdata.rdf.sail.includeInferred", "true"),
    ("com.bigdata.rdf.sail.incremental", "false"),
];

/// JSON body for the database creation call: `{"properties": {...}}`.
pub fn database_properties_json() -> Value {
    let properties: Map<String, Value> = DATABASE_PROPERTIES
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    serde_json::json!({ "properties": properties })
}

/// Render properties in Blazegraph's `key=value` text format.
///
/// Pairs keep their iteration order and the namespace line always comes
/// last. Nothing is escaped: a value holding `=` or a newline is written
/// as is, which is what Blazegraph's property loader expects.
pub fn to_property_text<'a, I>(properties: I, namespace: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut lines: Vec<String> = properties
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    lines.push(format!("{NAMESPACE_KEY}={namespace}"));
    lines.join("\n")
}

/// Text form of a client-supplied property value.
///
/// Strings are taken verbatim, numbers and booleans by their JSON text.
/// Anything else has no property-file representation.
pub fn property_value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
