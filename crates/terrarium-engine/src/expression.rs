//! Lazily-evaluated expression graphs for the imagery platform
//!
//! An [`Expr`] is a tree of platform function invocations over constants.
//! Nothing is evaluated locally: [`Expr::encode`] flattens the tree into the
//! platform's `{"result", "values"}` wire form, sharing identical sub-trees
//! so a node referenced many times is sent once.

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Map, Value};

/// Argument name bound by mapped functions
pub const MAPPING_VARIABLE: &str = "_MAPPING_VAR_0_0";

/// A node of an expression graph
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal JSON value
    Constant(Value),
    /// A call of a named platform algorithm
    Invocation { function: String, arguments: BTreeMap<String, Expr> },
    Array(Vec<Expr>),
    Dictionary(BTreeMap<String, Expr>),
    /// An anonymous function, used as the body of collection maps
    Function { arguments: Vec<String>, body: Box<Expr> },
    /// A reference to an argument of the enclosing function
    Argument(String),
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn string(value: &str) -> Self {
        Expr::Constant(Value::String(value.to_string()))
    }

    /// Invoke a platform algorithm with named arguments
    pub fn call<I, K>(function: &str, arguments: I) -> Self
    where
        I: IntoIterator<Item = (K, Expr)>,
        K: Into<String>,
    {
        Expr::Invocation {
            function: function.to_string(),
            arguments: arguments.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Function of a single mapped argument, see [`MAPPING_VARIABLE`]
    pub fn lambda(body: impl FnOnce(Expr) -> Expr) -> Self {
        let body = body(Expr::Argument(MAPPING_VARIABLE.to_string()));
        Expr::Function { arguments: vec![MAPPING_VARIABLE.to_string()], body: Box::new(body) }
    }

    pub fn strings<S: AsRef<str>>(values: &[S]) -> Self {
        Expr::Array(values.iter().map(|v| Expr::string(v.as_ref())).collect())
    }

    /// Name of the invoked algorithm, if this node is an invocation
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Expr::Invocation { function, .. } => Some(function),
            _ => None,
        }
    }

    /// Named argument of an invocation
    pub fn argument(&self, name: &str) -> Option<&Expr> {
        match self {
            Expr::Invocation { arguments, .. } => arguments.get(name),
            _ => None,
        }
    }

    /// Whether any node in this tree invokes `function`
    pub fn invokes(&self, function: &str) -> bool {
        match self {
            Expr::Invocation { function: name, arguments } => {
                name == function || arguments.values().any(|a| a.invokes(function))
            }
            Expr::Array(items) => items.iter().any(|i| i.invokes(function)),
            Expr::Dictionary(items) => items.values().any(|i| i.invokes(function)),
            Expr::Function { body, .. } => body.invokes(function),
            Expr::Constant(_) | Expr::Argument(_) => false,
        }
    }

    /// Flatten the graph into the platform's serialized form
    pub fn encode(&self) -> Value {
        let mut encoder = Encoder::default();
        let result = encoder.reference(self);
        json!({ "result": result, "values": Value::Object(encoder.values) })
    }
}

#[derive(Default)]
struct Encoder {
    values: Map<String, Value>,
    seen: HashMap<String, String>,
}

impl Encoder {
    /// Store a node in the value table, returning its id
    fn reference(&mut self, expr: &Expr) -> String {
        let node = self.node(expr);
        let key = node.to_string();
        if let Some(id) = self.seen.get(&key) {
            return id.clone();
        }
        let id = self.values.len().to_string();
        self.values.insert(id.clone(), node);
        self.seen.insert(key, id.clone());
        id
    }

    /// Encode a node, placing invocations in the table and inlining the rest
    fn inline(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Invocation { .. } | Expr::Function { .. } => {
                json!({ "valueReference": self.reference(expr) })
            }
            _ => self.node(expr),
        }
    }

    fn node(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Constant(value) => json!({ "constantValue": value }),
            Expr::Argument(name) => json!({ "argumentReference": name }),
            Expr::Array(items) => {
                let values: Vec<Value> = items.iter().map(|i| self.inline(i)).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Expr::Dictionary(items) => {
                let values: Map<String, Value> =
                    items.iter().map(|(k, v)| (k.clone(), self.inline(v))).collect();
                json!({ "dictionaryValue": { "values": values } })
            }
            Expr::Invocation { function, arguments } => {
                let arguments: Map<String, Value> =
                    arguments.iter().map(|(k, v)| (k.clone(), self.inline(v))).collect();
                json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": arguments,
                    }
                })
            }
            Expr::Function { arguments, body } => {
                let body = self.reference(body);
                json!({
                    "functionDefinitionValue": {
                        "argumentNames": arguments,
                        "body": body,
                    }
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(id: &str) -> Expr {
        Expr::call("Image.load", [("id", Expr::string(id))])
    }

    #[test]
    fn test_encode_single_invocation() {
        let encoded = load("COPERNICUS/S2_SR/abc").encode();
        assert_eq!(encoded["result"], "0");
        assert_eq!(
            encoded["values"]["0"]["functionInvocationValue"]["functionName"],
            "Image.load"
        );
        assert_eq!(
            encoded["values"]["0"]["functionInvocationValue"]["arguments"]["id"]["constantValue"],
            "COPERNICUS/S2_SR/abc"
        );
    }

    #[test]
    fn test_shared_subtrees_are_encoded_once() {
        let image = load("a");
        let sum = Expr::call("Image.add", [("image1", image.clone()), ("image2", image)]);
        let encoded = sum.encode();

        let values = encoded["values"].as_object().unwrap();
        assert_eq!(values.len(), 2);
        let args = &values[encoded["result"].as_str().unwrap()]["functionInvocationValue"]["arguments"];
        assert_eq!(args["image1"], args["image2"]);
    }

    #[test]
    fn test_encode_lambda() {
        let mapped = Expr::call(
            "Collection.map",
            [
                ("collection", Expr::call("ImageCollection.load", [("id", Expr::string("C"))])),
                ("baseAlgorithm", Expr::lambda(|image| Expr::call("Image.toFloat", [("value", image)]))),
            ],
        );
        let encoded = mapped.encode();
        let values = encoded["values"].as_object().unwrap();

        let definition = values
            .values()
            .find_map(|v| v.get("functionDefinitionValue"))
            .unwrap();
        assert_eq!(definition["argumentNames"], json!([MAPPING_VARIABLE]));

        let body = &values[definition["body"].as_str().unwrap()];
        assert_eq!(
            body["functionInvocationValue"]["arguments"]["value"]["argumentReference"],
            MAPPING_VARIABLE
        );
    }

    #[test]
    fn test_invokes_searches_tree() {
        let expr = Expr::call("Image.clip", [("input", load("a")), ("geometry", Expr::constant(1))]);
        assert!(expr.invokes("Image.load"));
        assert!(!expr.invokes("Image.mosaic"));
        assert_eq!(expr.argument("input").and_then(Expr::function_name), Some("Image.load"));
    }
}
