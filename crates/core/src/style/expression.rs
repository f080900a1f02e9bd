//! Builders for the MapLibre style expressions the route layer understands.

use serde_json::{Value, json};
use sitp_transit::RouteIdentifier;

/// Feature property holding the route a shape belongs to
pub const ROUTE_ID_PROPERTY: &str = "route_id";
/// Feature property holding the `#`-prefixed native route color
pub const ROUTE_COLOR_PROPERTY: &str = "route_color";
/// Boolean feature state driven by the hover index
pub const HOVER_STATE: &str = "hover";

pub fn get(property: &str) -> Value {
    json!(["get", property])
}

/// True while the feature's hover state is set
pub fn is_hovered() -> Value {
    json!(["boolean", ["feature-state", HOVER_STATE], false])
}

pub fn route_is(route: &RouteIdentifier) -> Value {
    json!(["==", get(ROUTE_ID_PROPERTY), route.as_str()])
}

pub fn route_in(routes: &[RouteIdentifier]) -> Value {
    let ids: Vec<&str> = routes.iter().map(RouteIdentifier::as_str).collect();
    json!(["in", get(ROUTE_ID_PROPERTY), ["literal", ids]])
}

/// `["case", cond, out, ..., fallback]`; collapses to the fallback with no arms
pub fn case(arms: Vec<(Value, Value)>, fallback: Value) -> Value {
    if arms.is_empty() {
        return fallback;
    }

    let mut expr = vec![json!("case")];
    for (condition, output) in arms {
        expr.push(condition);
        expr.push(output);
    }
    expr.push(fallback);
    Value::Array(expr)
}

/// `["match", ["get", "route_id"], id, out, ..., fallback]`; collapses to the fallback with no arms
pub fn match_route<'a>(arms: impl IntoIterator<Item = (&'a RouteIdentifier, &'a str)>, fallback: Value) -> Value {
    let mut expr = vec![json!("match"), get(ROUTE_ID_PROPERTY)];
    for (route, output) in arms {
        expr.push(json!(route.as_str()));
        expr.push(json!(output));
    }

    if expr.len() == 2 {
        return fallback;
    }
    expr.push(fallback);
    Value::Array(expr)
}
