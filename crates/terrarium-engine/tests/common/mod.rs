//! In-process imagery platform that records what it is asked to do

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use terrarium_core::error::{Result, TerrariumError};
use terrarium_engine::{Expr, ExportRequest, ImageryPlatform, Session, SessionSettings};

type Responder = Box<dyn Fn(&Expr) -> Result<Value> + Send + Sync>;

pub struct FakePlatform {
    responder: Responder,
    pub computed: Mutex<Vec<Expr>>,
    pub exports: Mutex<Vec<ExportRequest>>,
    pub operations: Mutex<Vec<String>>,
}

impl FakePlatform {
    pub fn new(responder: impl Fn(&Expr) -> Result<Value> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            computed: Mutex::new(Vec::new()),
            exports: Mutex::new(Vec::new()),
            operations: Mutex::new(Vec::new()),
        })
    }

    /// A platform answering every computation with the same value
    pub fn returning(value: Value) -> Arc<Self> {
        Self::new(move |_| Ok(value.clone()))
    }

    pub fn failing(reason: &'static str) -> Arc<Self> {
        Self::new(move |_| Err(TerrariumError::remote("compute value", reason)))
    }

    pub fn last_computed(&self) -> Expr {
        self.computed.lock().unwrap().last().cloned().expect("nothing was computed")
    }
}

impl ImageryPlatform for FakePlatform {
    fn compute_value(&self, expression: &Expr) -> Result<Value> {
        self.computed.lock().unwrap().push(expression.clone());
        (self.responder)(expression)
    }

    fn start_export(&self, request: &ExportRequest) -> Result<Value> {
        self.exports.lock().unwrap().push(request.clone());
        Ok(json!({
            "name": "projects/terrarium-test/operations/TASK123",
            "metadata": { "state": "PENDING" },
        }))
    }

    fn get_operation(&self, name: &str) -> Result<Value> {
        self.operations.lock().unwrap().push(name.to_string());
        Ok(json!({ "name": name, "metadata": { "state": "SUCCEEDED" }, "done": true }))
    }
}

pub fn session(platform: &Arc<FakePlatform>) -> Session {
    Session::new(platform.clone(), SessionSettings::new("terrarium-test"))
}

/// The first invocation of `function` anywhere in `expr`
pub fn find<'a>(expr: &'a Expr, function: &str) -> Option<&'a Expr> {
    match expr {
        Expr::Invocation { function: name, arguments } => {
            if name == function {
                return Some(expr);
            }
            arguments.values().find_map(|a| find(a, function))
        }
        Expr::Array(items) => items.iter().find_map(|i| find(i, function)),
        Expr::Dictionary(items) => items.values().find_map(|i| find(i, function)),
        Expr::Function { body, .. } => find(body, function),
        Expr::Constant(_) | Expr::Argument(_) => None,
    }
}
